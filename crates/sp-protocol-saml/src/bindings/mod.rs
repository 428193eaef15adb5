//! SAML HTTP-POST binding.
//!
//! The SP sends its AuthnRequest through an auto-submitting HTML form and
//! receives the Response as a base64 `SAMLResponse` form field.

mod post;

pub use post::*;

/// SAML message type for binding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamlMessageType {
    /// AuthnRequest message.
    Request,
    /// Response message.
    Response,
}

impl SamlMessageType {
    /// Returns the form parameter name for this message type.
    #[must_use]
    pub const fn form_param(&self) -> &'static str {
        match self {
            Self::Request => "SAMLRequest",
            Self::Response => "SAMLResponse",
        }
    }
}

/// Form parameter carrying the RelayState.
pub const RELAY_STATE_PARAM: &str = "RelayState";

/// A message received through the POST binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    /// The decoded XML document.
    pub xml: String,
    /// The message type.
    pub message_type: SamlMessageType,
    /// The RelayState if present.
    pub relay_state: Option<String>,
}
