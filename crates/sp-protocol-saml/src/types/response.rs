//! SAML Response types.
//!
//! Response messages sent by an identity provider to a service provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Assertion, EncryptedAssertion, Status, SAML_VERSION};
use crate::signature::XmlSignature;

/// SAML Response.
///
/// A response message sent from an identity provider to a service provider
/// containing authentication results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Unique identifier for this response.
    pub id: String,

    /// Version of the SAML protocol (always "2.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Timestamp when this response was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the identity provider that issued this response.
    ///
    /// Optional on the Response element itself; assertions always carry one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// The ID of the request this response is for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    /// The URL where this response was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// The status of the response.
    pub status: Status,

    /// Plaintext assertions in this response.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<Assertion>,

    /// Encrypted assertions in this response.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub encrypted_assertions: Vec<EncryptedAssertion>,

    /// Enveloped signature over the whole response, if any.
    #[serde(skip)]
    pub signature: Option<XmlSignature>,
}

fn default_version() -> String {
    SAML_VERSION.to_string()
}

impl Response {
    /// Creates a new success response.
    #[must_use]
    pub fn success(issuer: impl Into<String>) -> Self {
        Self {
            id: format!("_id{}", uuid::Uuid::new_v4()),
            version: SAML_VERSION.to_string(),
            issue_instant: Utc::now(),
            issuer: Some(issuer.into()),
            in_response_to: None,
            destination: None,
            status: Status::success(),
            assertions: Vec::new(),
            encrypted_assertions: Vec::new(),
            signature: None,
        }
    }

    /// Creates a new error response.
    #[must_use]
    pub fn error(issuer: impl Into<String>, status: Status) -> Self {
        Self {
            status,
            ..Self::success(issuer)
        }
    }

    /// Returns a builder for constructing responses.
    #[must_use]
    pub fn builder(issuer: impl Into<String>) -> ResponseBuilder {
        ResponseBuilder::new(issuer)
    }

    /// Returns true if this is a success response.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true if this response carries a signature.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    /// Total number of assertions, plaintext and encrypted.
    #[must_use]
    pub fn assertion_count(&self) -> usize {
        self.assertions.len() + self.encrypted_assertions.len()
    }
}

/// Builder for SAML responses.
#[derive(Debug)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    fn new(issuer: impl Into<String>) -> Self {
        Self {
            response: Response::success(issuer),
        }
    }

    /// Sets the response ID.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.response.id = id.into();
        self
    }

    /// Sets the issue instant.
    #[must_use]
    pub const fn issue_instant(mut self, instant: DateTime<Utc>) -> Self {
        self.response.issue_instant = instant;
        self
    }

    /// Removes the issuer element.
    #[must_use]
    pub fn without_issuer(mut self) -> Self {
        self.response.issuer = None;
        self
    }

    /// Sets the in-response-to field.
    #[must_use]
    pub fn in_response_to(mut self, request_id: impl Into<String>) -> Self {
        self.response.in_response_to = Some(request_id.into());
        self
    }

    /// Sets the destination.
    #[must_use]
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.response.destination = Some(destination.into());
        self
    }

    /// Sets the status.
    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.response.status = status;
        self
    }

    /// Adds a plaintext assertion.
    #[must_use]
    pub fn assertion(mut self, assertion: Assertion) -> Self {
        self.response.assertions.push(assertion);
        self
    }

    /// Adds an encrypted assertion.
    #[must_use]
    pub fn encrypted_assertion(mut self, encrypted: EncryptedAssertion) -> Self {
        self.response.encrypted_assertions.push(encrypted);
        self
    }

    /// Attaches a response-level signature.
    #[must_use]
    pub fn signature(mut self, signature: XmlSignature) -> Self {
        self.response.signature = Some(signature);
        self
    }

    /// Builds the response.
    #[must_use]
    pub fn build(self) -> Response {
        self.response
    }
}
