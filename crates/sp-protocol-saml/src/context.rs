//! Per-request SAML message context.
//!
//! A [`SamlMessageContext`] is built for one inbound Response and dropped
//! when validation finishes. It is never shared between requests.

use crate::types::{IdpSsoDescriptor, Response, RoleDescriptor, SpSsoDescriptor};

/// Metadata about one entity, self or peer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamlMetadataContext {
    /// Entity ID.
    pub entity_id: String,

    /// Role descriptor, when metadata for the entity is known.
    pub role_descriptor: Option<RoleDescriptor>,
}

impl SamlMetadataContext {
    /// Creates a metadata context with no descriptor.
    #[must_use]
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            role_descriptor: None,
        }
    }

    /// Creates a metadata context for an SP descriptor.
    #[must_use]
    pub fn for_sp(descriptor: SpSsoDescriptor) -> Self {
        Self {
            entity_id: descriptor.entity_id.clone(),
            role_descriptor: Some(RoleDescriptor::Sp(descriptor)),
        }
    }

    /// Creates a metadata context for an IdP descriptor.
    #[must_use]
    pub fn for_idp(descriptor: IdpSsoDescriptor) -> Self {
        Self {
            entity_id: descriptor.entity_id.clone(),
            role_descriptor: Some(RoleDescriptor::Idp(descriptor)),
        }
    }

    /// The SP descriptor, if this context holds one.
    #[must_use]
    pub const fn sp_sso_descriptor(&self) -> Option<&SpSsoDescriptor> {
        match &self.role_descriptor {
            Some(RoleDescriptor::Sp(sp)) => Some(sp),
            _ => None,
        }
    }

    /// The IdP descriptor, if this context holds one.
    #[must_use]
    pub const fn idp_sso_descriptor(&self) -> Option<&IdpSsoDescriptor> {
        match &self.role_descriptor {
            Some(RoleDescriptor::Idp(idp)) => Some(idp),
            _ => None,
        }
    }
}

/// Transport-level authentication of the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamlPeerEntityContext {
    /// Entity ID the transport authenticated, if any.
    pub entity_id: Option<String>,

    /// Whether the peer was authenticated by the transport or by a verified
    /// message-level signature.
    pub authenticated: bool,
}

impl SamlPeerEntityContext {
    /// An authenticated peer.
    #[must_use]
    pub fn authenticated(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: Some(entity_id.into()),
            authenticated: true,
        }
    }

    /// A peer the transport did not authenticate.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            entity_id: None,
            authenticated: false,
        }
    }
}

/// Everything known about one inbound Response.
#[derive(Debug, Clone)]
pub struct SamlMessageContext {
    /// The decoded Response.
    pub response: Response,

    /// Metadata of this SP.
    pub self_metadata: SamlMetadataContext,

    /// Metadata of the IdP the Response is expected from.
    pub peer_metadata: SamlMetadataContext,

    /// Peer authentication sub-context. Absent means not authenticated.
    pub peer_entity: Option<SamlPeerEntityContext>,

    /// ID of the AuthnRequest this SP sent, if it tracked one.
    pub request_id: Option<String>,

    /// RelayState echoed by the IdP.
    pub relay_state: Option<String>,
}

impl SamlMessageContext {
    /// Creates a context for `response` with the given metadata.
    #[must_use]
    pub const fn new(
        response: Response,
        self_metadata: SamlMetadataContext,
        peer_metadata: SamlMetadataContext,
    ) -> Self {
        Self {
            response,
            self_metadata,
            peer_metadata,
            peer_entity: None,
            request_id: None,
            relay_state: None,
        }
    }

    /// Sets the peer authentication sub-context.
    #[must_use]
    pub fn with_peer_entity(mut self, peer: SamlPeerEntityContext) -> Self {
        self.peer_entity = Some(peer);
        self
    }

    /// Sets the tracked request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Sets the RelayState.
    #[must_use]
    pub fn with_relay_state(mut self, relay_state: impl Into<String>) -> Self {
        self.relay_state = Some(relay_state.into());
        self
    }

    /// Whether the peer has been authenticated.
    #[must_use]
    pub fn is_peer_authenticated(&self) -> bool {
        self.peer_entity.as_ref().is_some_and(|p| p.authenticated)
    }

    /// Records that the peer is authenticated, e.g. after a verified
    /// response signature.
    pub fn mark_peer_authenticated(&mut self) {
        let entity_id = self.peer_metadata.entity_id.clone();
        match &mut self.peer_entity {
            Some(peer) => {
                peer.authenticated = true;
                peer.entity_id.get_or_insert(entity_id);
            }
            None => self.peer_entity = Some(SamlPeerEntityContext::authenticated(entity_id)),
        }
    }

    /// Entity ID of the expected IdP, `None` when unconfigured.
    #[must_use]
    pub fn peer_entity_id(&self) -> Option<&str> {
        let id = self.peer_metadata.entity_id.as_str();
        (!id.is_empty()).then_some(id)
    }

    /// The SP descriptor from self metadata, if any.
    #[must_use]
    pub const fn sp_sso_descriptor(&self) -> Option<&SpSsoDescriptor> {
        self.self_metadata.sp_sso_descriptor()
    }
}
