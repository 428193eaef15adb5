//! # sp-core
//!
//! Core configuration, error handling and security event logging for the
//! SAML service provider.
//!
//! This crate provides the foundational types shared by the cache and
//! protocol crates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::SpConfig;
pub use error::{Error, Result};
pub use event::{Event, EventOutcome, EventType};
