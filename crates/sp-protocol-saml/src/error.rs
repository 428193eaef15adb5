//! SAML error types.
//!
//! Every failure a Response can produce is a [`SamlError`]. Each variant
//! classifies into a [`FailureKind`], which the validator uses to pick the
//! most informative failure when no assertion is accepted.

use sp_cache::CacheError;
use thiserror::Error;

use crate::types::status_codes;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML validation and protocol errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// An encrypted element could not be decrypted.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// A signature was present but did not validate against trusted keys.
    #[error("untrusted signature: {0}")]
    UntrustedSignature(String),

    /// A signature is required by policy but none was present.
    #[error("missing required signature: {0}")]
    MissingRequiredSignature(String),

    /// The assertion is unsigned and the peer was not authenticated by
    /// the transport.
    #[error("peer not authenticated: {0}")]
    PeerNotAuthenticated(String),

    /// A validity window does not include the current time.
    #[error("expired or not yet valid: {0}")]
    ExpiredOrNotYetValid(String),

    /// The SP is not among the audiences.
    #[error("audience mismatch: expected {expected}, got [{audiences}]")]
    AudienceMismatch {
        /// The SP entity ID.
        expected: String,
        /// The audiences on the assertion, comma separated.
        audiences: String,
    },

    /// No subject confirmation matched this SP and request.
    #[error("subject confirmation mismatch: {0}")]
    SubjectConfirmationMismatch(String),

    /// The assertion ID has already been consumed.
    #[error("replayed assertion: {0}")]
    ReplayedAssertion(String),

    /// Issuer is not the expected IdP.
    #[error("untrusted issuer: expected {expected}, got {actual}")]
    UntrustedIssuer {
        /// The expected issuer.
        expected: String,
        /// The actual issuer.
        actual: String,
    },

    /// Response destination is not this SP's ACS.
    #[error("destination mismatch: expected {expected}, got {actual}")]
    DestinationMismatch {
        /// The ACS URL.
        expected: String,
        /// The destination on the Response.
        actual: String,
    },

    /// The IdP returned a non-success status.
    #[error("response status {code}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    ResponseStatus {
        /// The most specific status code.
        code: String,
        /// The status message, if any.
        message: Option<String>,
    },

    /// The Response or an assertion is structurally unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The authentication happened too long ago.
    #[error("authentication too old: {0}")]
    AuthenticationTooOld(String),

    /// The Response carried no assertion at all.
    #[error("no valid assertion: {0}")]
    NoValidAssertion(String),

    /// The replay cache refused the operation.
    #[error("replay cache error: {0}")]
    Cache(#[from] CacheError),

    /// The SP is misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64Decode(String),

    /// The client lifecycle needs the caller to perform an HTTP action.
    #[error("requires HTTP action ({status}): {reason}")]
    RequiresHttpAction {
        /// HTTP status to answer with.
        status: u16,
        /// Why the action is needed.
        reason: String,
    },
}

/// Classification of a [`SamlError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Decryption failed.
    DecryptionFailure,
    /// Signature did not validate.
    UntrustedSignature,
    /// Signature missing where one was needed.
    MissingRequiredSignature,
    /// Issuer mismatch.
    UntrustedIssuer,
    /// Time window violated.
    ExpiredOrNotYetValid,
    /// Audience mismatch.
    AudienceMismatch,
    /// Subject confirmation mismatch.
    SubjectConfirmationMismatch,
    /// Replayed assertion.
    ReplayedAssertion,
    /// Authentication instant too old.
    AuthenticationTooOld,
    /// Destination mismatch.
    DestinationMismatch,
    /// Non-success status.
    ResponseStatus,
    /// Structurally unusable.
    InvalidResponse,
    /// Nothing to validate.
    NoValidAssertion,
    /// Replay cache failure.
    Cache,
    /// Configuration problem.
    Configuration,
    /// Bad base64.
    Base64Decode,
    /// Caller must perform an HTTP action.
    RequiresHttpAction,
}

impl FailureKind {
    /// Rank used to choose the most informative failure. Higher wins.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::UntrustedSignature
            | Self::MissingRequiredSignature
            | Self::UntrustedIssuer
            | Self::DecryptionFailure => 50,
            Self::ReplayedAssertion | Self::Cache => 40,
            Self::SubjectConfirmationMismatch | Self::AuthenticationTooOld => 30,
            Self::ExpiredOrNotYetValid | Self::AudienceMismatch => 20,
            Self::DestinationMismatch
            | Self::ResponseStatus
            | Self::InvalidResponse
            | Self::Configuration
            | Self::Base64Decode => 10,
            Self::NoValidAssertion | Self::RequiresHttpAction => 0,
        }
    }

    /// Returns true when this kind is ranked above `other`.
    #[must_use]
    pub const fn outranks(self, other: Self) -> bool {
        self.priority() > other.priority()
    }

    /// Returns true for trust and signature failures.
    #[must_use]
    pub const fn is_trust_failure(self) -> bool {
        self.priority() >= 50
    }
}

impl SamlError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Decryption(_) => FailureKind::DecryptionFailure,
            Self::UntrustedSignature(_) => FailureKind::UntrustedSignature,
            Self::MissingRequiredSignature(_) | Self::PeerNotAuthenticated(_) => {
                FailureKind::MissingRequiredSignature
            }
            Self::ExpiredOrNotYetValid(_) => FailureKind::ExpiredOrNotYetValid,
            Self::AudienceMismatch { .. } => FailureKind::AudienceMismatch,
            Self::SubjectConfirmationMismatch(_) => FailureKind::SubjectConfirmationMismatch,
            Self::ReplayedAssertion(_) => FailureKind::ReplayedAssertion,
            Self::UntrustedIssuer { .. } => FailureKind::UntrustedIssuer,
            Self::DestinationMismatch { .. } => FailureKind::DestinationMismatch,
            Self::ResponseStatus { .. } => FailureKind::ResponseStatus,
            Self::InvalidResponse(_) => FailureKind::InvalidResponse,
            Self::AuthenticationTooOld(_) => FailureKind::AuthenticationTooOld,
            Self::NoValidAssertion(_) => FailureKind::NoValidAssertion,
            Self::Cache(_) => FailureKind::Cache,
            Self::Configuration(_) => FailureKind::Configuration,
            Self::Base64Decode(_) => FailureKind::Base64Decode,
            Self::RequiresHttpAction { .. } => FailureKind::RequiresHttpAction,
        }
    }

    /// Returns the SAML status code to report for this error.
    #[must_use]
    pub const fn saml_status_code(&self) -> &'static str {
        match self {
            Self::Cache(_) | Self::Configuration(_) => status_codes::RESPONDER,
            Self::ResponseStatus { .. } | Self::AuthenticationTooOld(_) => {
                status_codes::AUTHN_FAILED
            }
            Self::ReplayedAssertion(_) => status_codes::REQUEST_DENIED,
            _ => status_codes::REQUESTER,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::RequiresHttpAction { status, .. } => *status,
            Self::InvalidResponse(_) | Self::Base64Decode(_) | Self::NoValidAssertion(_) => 400,
            Self::ReplayedAssertion(_) => 403,
            Self::Cache(_) | Self::Configuration(_) => 500,
            _ => 401,
        }
    }
}

impl From<base64::DecodeError> for SamlError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64Decode(err.to_string())
    }
}

impl From<sp_core::Error> for SamlError {
    fn from(err: sp_core::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
