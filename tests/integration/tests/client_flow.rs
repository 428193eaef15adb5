//! End-to-end SP login through [`Saml2Client`].

use std::sync::Arc;

use base64::Engine;
use chrono::Utc;
use sp_protocol_saml::client::{
    Client, HttpAction, InMemoryWebContext, Saml2Client, WebContext, SAML2_REQUEST_ID_ATTRIBUTE,
};
use sp_protocol_saml::{FailureKind, IdpSsoDescriptor, Response, SamlError};

use crate::common::{self, FakeCodec, FakeTrustEngine};

const LOGIN_URL: &str = "https://sp.example.com/app/protected";

fn client(codec: Arc<FakeCodec>) -> anyhow::Result<Saml2Client> {
    let validator = common::validator_with(common::config(), Arc::new(FakeTrustEngine::new()), None)?;
    Ok(Saml2Client::new(
        common::sp_descriptor(),
        common::idp_descriptor(),
        Arc::new(validator),
        codec,
    ))
}

fn encode(xml: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(xml)
}

/// Redirects and returns the login request plus the tracked request ID.
fn start_login(client: &Saml2Client) -> anyhow::Result<(InMemoryWebContext, String)> {
    let login = InMemoryWebContext::get(LOGIN_URL);
    client.redirect(&login)?;
    let request_id = login
        .session_attribute(SAML2_REQUEST_ID_ATTRIBUTE)
        .ok_or_else(|| anyhow::anyhow!("request ID not stored"))?;
    Ok((login, request_id))
}

fn callback(login: &InMemoryWebContext, saml_response: &str) -> InMemoryWebContext {
    InMemoryWebContext::post(common::SP_ACS_URL)
        .with_parameter("SAMLResponse", saml_response)
        .with_parameter("RelayState", LOGIN_URL)
        .with_session(login.session())
}

fn answer(request_id: &str, assertion_id: &str) -> Response {
    let now = Utc::now();
    Response::builder(common::IDP_ENTITY_ID)
        .issue_instant(now)
        .destination(common::SP_ACS_URL)
        .in_response_to(request_id)
        .assertion(
            common::assertion(assertion_id, now, Some(request_id))
                .with_signature(common::trusted_signature(assertion_id)),
        )
        .build()
}

#[test]
fn redirect_posts_authn_request_to_idp() -> anyhow::Result<()> {
    let client = client(Arc::new(FakeCodec::default()))?;
    let login = InMemoryWebContext::get(LOGIN_URL);

    let action = client.redirect(&login)?;

    let HttpAction::PostForm { destination, html } = action else {
        anyhow::bail!("expected a POST form");
    };
    assert_eq!(destination, common::IDP_SSO_URL);
    assert!(html.contains(r#"name="SAMLRequest""#));
    assert!(html.contains(LOGIN_URL));
    assert!(login.session_attribute(SAML2_REQUEST_ID_ATTRIBUTE).is_some());
    Ok(())
}

#[test]
fn redirect_without_sso_url_is_configuration_error() -> anyhow::Result<()> {
    let validator = common::validator_with(common::config(), Arc::new(FakeTrustEngine::new()), None)?;
    let client = Saml2Client::new(
        common::sp_descriptor(),
        IdpSsoDescriptor::new(common::IDP_ENTITY_ID),
        Arc::new(validator),
        Arc::new(FakeCodec::default()),
    );

    let err = client.redirect(&InMemoryWebContext::get(LOGIN_URL)).unwrap_err();
    assert!(matches!(err, SamlError::Configuration(_)));
    Ok(())
}

#[test]
fn callback_must_be_post() -> anyhow::Result<()> {
    let client = client(Arc::new(FakeCodec::default()))?;
    let ctx = InMemoryWebContext::get(common::SP_ACS_URL).with_parameter("SAMLResponse", "abc");

    let err = client.get_credentials(&ctx).unwrap_err();
    assert!(matches!(err, SamlError::RequiresHttpAction { status: 405, .. }));
    assert_eq!(err.http_status(), 405);
    Ok(())
}

#[test]
fn callback_without_saml_response_requires_authentication() -> anyhow::Result<()> {
    let client = client(Arc::new(FakeCodec::default()))?;
    let ctx = InMemoryWebContext::post(common::SP_ACS_URL);

    let err = client.get_credentials(&ctx).unwrap_err();
    assert!(matches!(err, SamlError::RequiresHttpAction { status: 401, .. }));
    assert_eq!(err.kind(), FailureKind::RequiresHttpAction);
    Ok(())
}

#[test]
fn callback_with_invalid_base64_is_rejected() -> anyhow::Result<()> {
    let client = client(Arc::new(FakeCodec::default()))?;
    let ctx = InMemoryWebContext::post(common::SP_ACS_URL).with_parameter("SAMLResponse", "%%%");

    let err = client.get_credentials(&ctx).unwrap_err();
    assert!(matches!(err, SamlError::Base64Decode(_)));
    Ok(())
}

#[test]
fn full_login_produces_profile() -> anyhow::Result<()> {
    let codec = Arc::new(FakeCodec::default());
    let client = client(codec.clone())?.with_name("corporate-idp");
    let (login, request_id) = start_login(&client)?;

    let xml = codec.register(answer(&request_id, "_a1"), false);
    let ctx = callback(&login, &encode(&xml));

    let credentials = client.get_credentials(&ctx)?;
    assert_eq!(credentials.relay_state.as_deref(), Some(LOGIN_URL));
    assert!(ctx.session_attribute(SAML2_REQUEST_ID_ATTRIBUTE).is_none());

    let profile = client.get_user_profile(credentials, &ctx)?;
    assert_eq!(profile.id, "jdoe@example.com");
    assert_eq!(profile.client_name, "corporate-idp");
    assert_eq!(profile.issuer, common::IDP_ENTITY_ID);
    assert_eq!(profile.session_index.as_deref(), Some("_session1"));
    assert_eq!(profile.attributes["groups"], ["staff", "admins"]);
    Ok(())
}

#[test]
fn response_to_another_request_is_rejected() -> anyhow::Result<()> {
    let codec = Arc::new(FakeCodec::default());
    let client = client(codec.clone())?;
    let (login, _request_id) = start_login(&client)?;

    let xml = codec.register(answer("_someone_elses_request", "_a1"), false);
    let err = client
        .get_credentials(&callback(&login, &encode(&xml)))
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::SubjectConfirmationMismatch);
    Ok(())
}

#[test]
fn reposting_a_consumed_response_fails() -> anyhow::Result<()> {
    let codec = Arc::new(FakeCodec::default());
    let client = client(codec.clone())?;
    let (login, request_id) = start_login(&client)?;

    let saml_response = encode(&codec.register(answer(&request_id, "_a1"), false));
    client.get_credentials(&callback(&login, &saml_response))?;

    let err = client
        .get_credentials(&callback(&login, &saml_response))
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::SubjectConfirmationMismatch);
    Ok(())
}

#[test]
fn replayed_unsolicited_response_fails() -> anyhow::Result<()> {
    let codec = Arc::new(FakeCodec::default());
    let client = client(codec.clone())?;
    let now = Utc::now();
    let xml = codec.register(
        common::response(now, vec![common::signed_assertion("_idp_initiated", now)]),
        false,
    );
    let saml_response = encode(&xml);
    let login = InMemoryWebContext::get(LOGIN_URL);

    client.get_credentials(&callback(&login, &saml_response))?;
    let err = client
        .get_credentials(&callback(&login, &saml_response))
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::ReplayedAssertion);
    Ok(())
}

#[test]
fn unsigned_assertion_needs_authenticated_transport() -> anyhow::Result<()> {
    let codec = Arc::new(FakeCodec::default());
    let client = client(codec.clone())?;
    let (login, request_id) = start_login(&client)?;

    let mut response = answer(&request_id, "_a1");
    response.assertions[0].signature = None;

    let xml = codec.register(response, false);
    let err = client.get_credentials(&callback(&login, &encode(&xml))).unwrap_err();
    assert_eq!(err.kind(), FailureKind::MissingRequiredSignature);

    let (login, request_id) = start_login(&client)?;
    let mut response = answer(&request_id, "_a2");
    response.assertions[0].signature = None;
    let xml = codec.register(response, true);
    client.get_credentials(&callback(&login, &encode(&xml)))?;
    Ok(())
}
