//! SAML 2.0 service provider response validation.
//!
//! This crate decides whether a SAML Response from an identity provider is
//! trustworthy enough to establish a session:
//!
//! - **Signature policy** - when assertions must carry their own signature
//! - **Decryption** - encrypted assertions, identifiers and attributes
//! - **Conditions and subject** - validity windows, audience, bearer confirmation
//! - **Replay protection** - one-time use of assertion IDs
//! - **Client lifecycle** - AuthnRequest over HTTP-POST and Response consumption
//!
//! XML parsing, canonicalization and cryptography are delegated to the
//! capabilities in [`signature::SignatureTrustEngine`],
//! [`decryption::Decrypter`] and [`client::SamlMessageCodec`].
//!
//! # Architecture
//!
//! - [`types`] - Core SAML types and data structures
//! - [`context`] - Per-request message context
//! - [`signature`] - Signature model, trust engine and assertion policy
//! - [`decryption`] - Decrypter capability
//! - [`validation`] - Time, audience, subject and authn checks
//! - [`validator`] - The response validation pipeline
//! - [`principal`] - The accepted identity
//! - [`bindings`] - HTTP-POST binding
//! - [`client`] - Web context and SAML2 client
//! - [`error`] - Error types for SAML operations
//!
//! # Example
//!
//! ```rust,ignore
//! use sp_core::SpConfig;
//! use sp_protocol_saml::validator::ResponseValidator;
//!
//! let validator = ResponseValidator::builder(SpConfig::from_env()?)
//!     .trust_engine(engine)
//!     .decrypter(decrypter)
//!     .build()?;
//! let principal = validator.validate(&mut message_context)?;
//! ```
//!
//! # SAML Specifications
//!
//! - [SAML 2.0 Core](https://docs.oasis-open.org/security/saml/v2.0/saml-core-2.0-os.pdf)
//! - [SAML 2.0 Bindings](https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf)
//! - [SAML 2.0 Profiles](https://docs.oasis-open.org/security/saml/v2.0/saml-profiles-2.0-os.pdf)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bindings;
pub mod client;
pub mod context;
pub mod decryption;
pub mod error;
pub mod principal;
pub mod signature;
pub mod types;
pub mod validation;
pub mod validator;

pub use context::{SamlMessageContext, SamlMetadataContext, SamlPeerEntityContext};
pub use error::{FailureKind, SamlError, SamlResult};
pub use principal::AuthenticatedPrincipal;
pub use types::*;
pub use validator::{ResponseValidator, ResponseValidatorBuilder};
