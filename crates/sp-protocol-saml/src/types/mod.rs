//! SAML 2.0 types and data structures.
//!
//! This module contains the core SAML types consumed by the SP: responses,
//! assertions, the AuthnRequest it sends, and the metadata it consults.

mod assertion;
mod authn_request;
mod constants;
mod encrypted;
mod metadata;
mod name_id;
mod response;
mod status;

pub use assertion::*;
pub use authn_request::*;
pub use constants::*;
pub use encrypted::*;
pub use metadata::*;
pub use name_id::*;
pub use response::*;
pub use status::*;
