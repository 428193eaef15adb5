//! XML Signature support for SAML.
//!
//! Signature verification itself belongs to an external engine behind
//! [`SignatureTrustEngine`]. This module models the signature element the
//! engine evaluates and decides when a signature is required.
//!
//! # Signing Algorithms
//!
//! The following signature algorithms are recognised:
//! - RSA-SHA256 (recommended)
//! - RSA-SHA384
//! - RSA-SHA512
//! - ECDSA-SHA256
//! - ECDSA-SHA384
//!
//! Legacy RSA-SHA1 is refused unless explicitly allowed.

mod policy;
mod trust;

pub use policy::*;
pub use trust::*;

use crate::types::signature_algorithms;

/// Signature algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// RSA with SHA-256 (recommended).
    #[default]
    RsaSha256,
    /// RSA with SHA-384.
    RsaSha384,
    /// RSA with SHA-512.
    RsaSha512,
    /// ECDSA with SHA-256.
    EcdsaSha256,
    /// ECDSA with SHA-384.
    EcdsaSha384,
    /// Legacy RSA with SHA-1 (not recommended).
    RsaSha1,
}

impl SignatureAlgorithm {
    /// Returns the URI for this signature algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => signature_algorithms::RSA_SHA256,
            Self::RsaSha384 => signature_algorithms::RSA_SHA384,
            Self::RsaSha512 => signature_algorithms::RSA_SHA512,
            Self::EcdsaSha256 => signature_algorithms::ECDSA_SHA256,
            Self::EcdsaSha384 => signature_algorithms::ECDSA_SHA384,
            Self::RsaSha1 => signature_algorithms::RSA_SHA1,
        }
    }

    /// Parses a signature algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            signature_algorithms::RSA_SHA256 => Some(Self::RsaSha256),
            signature_algorithms::RSA_SHA384 => Some(Self::RsaSha384),
            signature_algorithms::RSA_SHA512 => Some(Self::RsaSha512),
            signature_algorithms::ECDSA_SHA256 => Some(Self::EcdsaSha256),
            signature_algorithms::ECDSA_SHA384 => Some(Self::EcdsaSha384),
            signature_algorithms::RSA_SHA1 => Some(Self::RsaSha1),
            _ => None,
        }
    }

    /// Returns true if this algorithm uses a deprecated hash (SHA-1).
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        matches!(self, Self::RsaSha1)
    }
}

/// XML Signature structure.
///
/// Represents the `<ds:Signature>` element on a signed Response or
/// Assertion, as extracted by the XML layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSignature {
    /// The signature algorithm used.
    pub algorithm: SignatureAlgorithm,
    /// The reference URI (empty or `#` followed by the signed element ID).
    pub reference_uri: String,
    /// The signature value (base64 encoded).
    pub signature_value: String,
    /// Optional X.509 certificate (base64 encoded, DER format).
    pub x509_certificate: Option<String>,
}

impl XmlSignature {
    /// Creates a signature referencing the element with `element_id`.
    #[must_use]
    pub fn new(
        algorithm: SignatureAlgorithm,
        element_id: &str,
        signature_value: impl Into<String>,
    ) -> Self {
        Self {
            algorithm,
            reference_uri: format!("#{element_id}"),
            signature_value: signature_value.into(),
            x509_certificate: None,
        }
    }

    /// Attaches the signer certificate.
    #[must_use]
    pub fn with_certificate(mut self, cert: impl Into<String>) -> Self {
        self.x509_certificate = Some(cert.into());
        self
    }

    /// Returns true if the reference covers `element`.
    ///
    /// An empty reference URI covers only the document element, never an
    /// element nested inside it.
    #[must_use]
    pub fn references(&self, element: SignedElement<'_>) -> bool {
        match self.reference_uri.strip_prefix('#') {
            Some(id) => id == element.id(),
            None => self.reference_uri.is_empty() && element.is_document(),
        }
    }
}

/// The element a signature is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedElement<'a> {
    /// The document element of the message, such as the Response.
    Document(&'a str),
    /// An element nested in the message, such as an Assertion.
    Nested(&'a str),
}

impl<'a> SignedElement<'a> {
    /// Returns the element's ID attribute.
    #[must_use]
    pub const fn id(&self) -> &'a str {
        match self {
            Self::Document(id) | Self::Nested(id) => *id,
        }
    }

    /// Returns true for the document element.
    #[must_use]
    pub const fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }
}
