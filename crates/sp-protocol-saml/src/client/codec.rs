//! XML message codec capability.

use crate::error::SamlResult;
use crate::types::{AuthnRequest, Response};

/// A Response decoded from XML.
#[derive(Debug, Clone)]
pub struct DecodedResponse {
    /// The Response model with signatures extracted.
    pub response: Response,
    /// Whether the transport that delivered it authenticated the IdP.
    pub peer_authenticated: bool,
}

/// Serializes outbound and parses inbound SAML XML.
///
/// XML parsing, canonicalization and signature extraction belong to the
/// implementation.
pub trait SamlMessageCodec: Send + Sync {
    /// Serializes an AuthnRequest to XML.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be serialized.
    fn encode_authn_request(&self, request: &AuthnRequest) -> SamlResult<String>;

    /// Parses Response XML.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::InvalidResponse`](crate::SamlError::InvalidResponse)
    /// if the document is not a usable Response.
    fn decode_response(&self, xml: &str) -> SamlResult<DecodedResponse>;
}
