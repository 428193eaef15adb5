//! Entity metadata descriptors.
//!
//! Only the parts of SAML metadata the SP consults while validating are
//! modelled: the SP's own signing preferences and the IdP's identity.

use serde::{Deserialize, Serialize};

/// SP SSO descriptor (`<md:SPSSODescriptor>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpSsoDescriptor {
    /// Entity ID of the service provider.
    pub entity_id: String,

    /// The `WantAssertionsSigned` attribute. Absent means false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub want_assertions_signed: Option<bool>,

    /// The `AuthnRequestsSigned` attribute.
    #[serde(default)]
    pub authn_requests_signed: bool,

    /// Assertion consumer service locations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assertion_consumer_services: Vec<String>,
}

impl SpSsoDescriptor {
    /// Creates a descriptor for `entity_id` with no signing preference.
    #[must_use]
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            ..Self::default()
        }
    }

    /// Sets the `WantAssertionsSigned` attribute.
    #[must_use]
    pub const fn with_want_assertions_signed(mut self, want: bool) -> Self {
        self.want_assertions_signed = Some(want);
        self
    }

    /// Adds an assertion consumer service location.
    #[must_use]
    pub fn with_acs(mut self, location: impl Into<String>) -> Self {
        self.assertion_consumer_services.push(location.into());
        self
    }

    /// Effective `WantAssertionsSigned` value.
    #[must_use]
    pub fn wants_assertions_signed(&self) -> bool {
        self.want_assertions_signed.unwrap_or(false)
    }
}

/// IdP SSO descriptor (`<md:IDPSSODescriptor>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdpSsoDescriptor {
    /// Entity ID of the identity provider.
    pub entity_id: String,

    /// SingleSignOnService location for the HTTP-POST binding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_url: Option<String>,

    /// The `WantAuthnRequestsSigned` attribute.
    #[serde(default)]
    pub want_authn_requests_signed: bool,

    /// Base64 DER signing certificates published by the IdP.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signing_certificates: Vec<String>,
}

impl IdpSsoDescriptor {
    /// Creates a descriptor for `entity_id`.
    #[must_use]
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            ..Self::default()
        }
    }

    /// Sets the SSO endpoint.
    #[must_use]
    pub fn with_sso_url(mut self, url: impl Into<String>) -> Self {
        self.sso_url = Some(url.into());
        self
    }

    /// Adds a signing certificate.
    #[must_use]
    pub fn with_signing_certificate(mut self, cert: impl Into<String>) -> Self {
        self.signing_certificates.push(cert.into());
        self
    }
}

/// The role an entity plays in metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleDescriptor {
    /// Service provider role.
    Sp(SpSsoDescriptor),
    /// Identity provider role.
    Idp(IdpSsoDescriptor),
}

impl RoleDescriptor {
    /// Entity ID the descriptor belongs to.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Sp(sp) => &sp.entity_id,
            Self::Idp(idp) => &idp.entity_id,
        }
    }
}
