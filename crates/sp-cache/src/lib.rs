//! # sp-cache
//!
//! Cache abstractions for the SAML service provider.
//!
//! ## Cache Providers
//!
//! - [`ReplayCacheProvider`] - One-time-use tracking of consumed assertion IDs
//!
//! ## Implementations
//!
//! - [`InMemoryReplayCache`] - Process-wide concurrent map with atomic
//!   check-and-insert
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use sp_cache::{InMemoryReplayCache, ReplayCacheProvider};
//!
//! let cache = InMemoryReplayCache::new(1024);
//! let now = Utc::now();
//! let expires = now + Duration::minutes(5);
//!
//! assert!(cache.check_and_insert("_assertion1", expires, now).unwrap());
//! assert!(!cache.check_and_insert("_assertion1", expires, now).unwrap());
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod memory;
pub mod replay;

pub use error::{CacheError, CacheResult};
pub use memory::InMemoryReplayCache;
pub use replay::ReplayCacheProvider;
