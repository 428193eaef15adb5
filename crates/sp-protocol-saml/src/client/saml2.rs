//! SAML 2.0 Web Browser SSO client.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sp_core::{Event, EventType};
use tracing::debug;

use super::{Client, HttpAction, SamlMessageCodec, WebContext};
use crate::bindings::{HttpPostBinding, SamlMessageType, RELAY_STATE_PARAM};
use crate::context::{SamlMetadataContext, SamlMessageContext, SamlPeerEntityContext};
use crate::error::{SamlError, SamlResult};
use crate::principal::AuthenticatedPrincipal;
use crate::types::{AuthnRequest, IdpSsoDescriptor, Response, SamlBinding, SpSsoDescriptor};
use crate::validator::ResponseValidator;

/// Session attribute holding the ID of the outstanding AuthnRequest.
pub const SAML2_REQUEST_ID_ATTRIBUTE: &str = "SAML2_REQUEST_ID";

/// Validated credentials from a SAML Response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saml2Credentials {
    /// The accepted principal.
    pub principal: AuthenticatedPrincipal,
    /// RelayState posted with the Response.
    pub relay_state: Option<String>,
}

/// User profile built from SAML credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Saml2Profile {
    /// Profile ID, the NameID value.
    pub id: String,
    /// Name of the client that authenticated the user.
    pub client_name: String,
    /// IdP entity ID.
    pub issuer: String,
    /// NameID format URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id_format: Option<String>,
    /// IdP session index for logout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_index: Option<String>,
    /// Time of authentication at the IdP.
    pub authn_instant: DateTime<Utc>,
    /// User attributes.
    pub attributes: BTreeMap<String, Vec<String>>,
}

/// SAML 2.0 client for one SP and one IdP.
pub struct Saml2Client {
    name: String,
    sp: SpSsoDescriptor,
    idp: IdpSsoDescriptor,
    validator: Arc<ResponseValidator>,
    codec: Arc<dyn SamlMessageCodec>,
}

impl Saml2Client {
    /// Creates a client.
    ///
    /// The SP descriptor's entity ID should match the validator
    /// configuration.
    #[must_use]
    pub fn new(
        sp: SpSsoDescriptor,
        idp: IdpSsoDescriptor,
        validator: Arc<ResponseValidator>,
        codec: Arc<dyn SamlMessageCodec>,
    ) -> Self {
        Self {
            name: "Saml2Client".to_string(),
            sp,
            idp,
            validator,
            codec,
        }
    }

    /// Renames the client.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn message_context(
        &self,
        ctx: &dyn WebContext,
        response: Response,
        peer_authenticated: bool,
        relay_state: Option<String>,
    ) -> SamlMessageContext {
        let peer = if peer_authenticated {
            SamlPeerEntityContext::authenticated(&self.idp.entity_id)
        } else {
            SamlPeerEntityContext::unauthenticated()
        };
        let mut message = SamlMessageContext::new(
            response,
            SamlMetadataContext::for_sp(self.sp.clone()),
            SamlMetadataContext::for_idp(self.idp.clone()),
        )
        .with_peer_entity(peer);
        message.request_id = ctx.remove_session_attribute(SAML2_REQUEST_ID_ATTRIBUTE);
        message.relay_state = relay_state;
        message
    }
}

impl std::fmt::Debug for Saml2Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Saml2Client")
            .field("name", &self.name)
            .field("sp", &self.sp.entity_id)
            .field("idp", &self.idp.entity_id)
            .finish_non_exhaustive()
    }
}

impl Client for Saml2Client {
    type Credentials = Saml2Credentials;
    type Profile = Saml2Profile;

    fn name(&self) -> &str {
        &self.name
    }

    fn redirect(&self, ctx: &dyn WebContext) -> SamlResult<HttpAction> {
        let destination = self.idp.sso_url.clone().ok_or_else(|| {
            SamlError::Configuration(format!("IdP {} has no SSO URL", self.idp.entity_id))
        })?;

        let request = AuthnRequest::new(&self.sp.entity_id)
            .with_acs_url(&self.validator.config().acs_url)
            .with_destination(&destination)
            .with_binding(SamlBinding::HttpPost);
        request.validate().map_err(SamlError::Configuration)?;

        let xml = self.codec.encode_authn_request(&request)?;
        ctx.set_session_attribute(SAML2_REQUEST_ID_ATTRIBUTE, request.id.clone());

        let relay_state = ctx.full_request_url();
        let html = HttpPostBinding::encode_request(&xml, &destination, Some(&relay_state));

        Event::builder(EventType::AuthnRequestSent)
            .success()
            .issuer(&self.idp.entity_id)
            .message_id(&request.id)
            .build()
            .emit();
        Ok(HttpAction::PostForm { destination, html })
    }

    fn get_credentials(&self, ctx: &dyn WebContext) -> SamlResult<Saml2Credentials> {
        if !ctx.is_post() {
            return Err(SamlError::RequiresHttpAction {
                status: 405,
                reason: "SAML responses must be delivered by POST".to_string(),
            });
        }
        let param = SamlMessageType::Response.form_param();
        let Some(encoded) = ctx.request_parameter(param) else {
            return Err(SamlError::RequiresHttpAction {
                status: 401,
                reason: format!("missing {param} parameter"),
            });
        };

        let relay_state = ctx.request_parameter(RELAY_STATE_PARAM);
        let posted = HttpPostBinding::decode_response(&encoded, relay_state.as_deref())?;
        let decoded = self.codec.decode_response(&posted.xml)?;
        debug!(
            response_id = %decoded.response.id,
            peer_authenticated = decoded.peer_authenticated,
            "SAML response decoded"
        );

        let mut message = self.message_context(
            ctx,
            decoded.response,
            decoded.peer_authenticated,
            posted.relay_state,
        );
        let principal = self.validator.validate(&mut message)?;
        Ok(Saml2Credentials {
            principal,
            relay_state: message.relay_state,
        })
    }

    fn get_user_profile(
        &self,
        credentials: Saml2Credentials,
        _ctx: &dyn WebContext,
    ) -> SamlResult<Saml2Profile> {
        let principal = credentials.principal;
        Ok(Saml2Profile {
            id: principal.name_id.value,
            client_name: self.name.clone(),
            issuer: principal.issuer,
            name_id_format: principal.name_id.format,
            session_index: principal.session_index,
            authn_instant: principal.authn_instant,
            attributes: principal.attributes,
        })
    }
}
