//! Assertion signature policy tests.
//!
//! Covers the precedence of the configured flag over SP metadata and the
//! signed, unsigned and transport-authenticated cases.

use std::sync::Arc;

use chrono::Utc;
use sp_protocol_saml::{
    FailureKind, SamlError, SamlMessageContext, SamlMetadataContext, SamlPeerEntityContext,
    SpSsoDescriptor,
};

use crate::common::{self, FakeTrustEngine};

fn validator(want: Option<bool>) -> anyhow::Result<sp_protocol_saml::ResponseValidator> {
    let mut config = common::config();
    config.want_assertions_signed = want;
    common::validator_with(config, Arc::new(FakeTrustEngine::new()), None)
}

fn bare_context() -> SamlMessageContext {
    SamlMessageContext::new(
        common::response(Utc::now(), Vec::new()),
        SamlMetadataContext::default(),
        SamlMetadataContext::default(),
    )
}

fn context_with_descriptor(want: bool) -> SamlMessageContext {
    let mut ctx = bare_context();
    ctx.self_metadata = SamlMetadataContext::for_sp(
        SpSsoDescriptor::new(common::SP_ENTITY_ID).with_want_assertions_signed(want),
    );
    ctx
}

fn unauthenticated_context() -> SamlMessageContext {
    bare_context().with_peer_entity(SamlPeerEntityContext::unauthenticated())
}

#[test]
fn does_not_want_assertions_signed_with_absent_context() -> anyhow::Result<()> {
    assert!(!validator(Some(false))?.wants_assertions_signed(None));
    Ok(())
}

#[test]
fn wants_assertions_signed_with_absent_context() -> anyhow::Result<()> {
    assert!(validator(Some(true))?.wants_assertions_signed(None));
    Ok(())
}

#[test]
fn does_not_want_assertions_signed_without_descriptor() -> anyhow::Result<()> {
    let ctx = bare_context();
    assert!(ctx.sp_sso_descriptor().is_none());
    assert!(!validator(Some(false))?.wants_assertions_signed(Some(&ctx)));
    Ok(())
}

#[test]
fn wants_assertions_signed_without_descriptor() -> anyhow::Result<()> {
    let ctx = bare_context();
    assert!(ctx.sp_sso_descriptor().is_none());
    assert!(validator(Some(true))?.wants_assertions_signed(Some(&ctx)));
    Ok(())
}

#[test]
fn does_not_want_assertions_signed_with_descriptor() -> anyhow::Result<()> {
    let ctx = context_with_descriptor(false);
    assert!(ctx.sp_sso_descriptor().is_some());
    assert!(!validator(Some(false))?.wants_assertions_signed(Some(&ctx)));
    Ok(())
}

#[test]
fn wants_assertions_signed_with_descriptor() -> anyhow::Result<()> {
    let ctx = context_with_descriptor(true);
    assert!(ctx.sp_sso_descriptor().is_some());
    assert!(validator(Some(true))?.wants_assertions_signed(Some(&ctx)));
    Ok(())
}

#[test]
fn configured_flag_overrides_descriptor() -> anyhow::Result<()> {
    assert!(!validator(Some(false))?.wants_assertions_signed(Some(&context_with_descriptor(true))));
    assert!(validator(Some(true))?.wants_assertions_signed(Some(&context_with_descriptor(false))));
    Ok(())
}

#[test]
fn descriptor_value_returned_when_flag_unset() -> anyhow::Result<()> {
    let validator = validator(None)?;
    assert!(validator.wants_assertions_signed(Some(&context_with_descriptor(true))));
    assert!(!validator.wants_assertions_signed(Some(&context_with_descriptor(false))));
    assert!(!validator.wants_assertions_signed(Some(&bare_context())));
    assert!(!validator.wants_assertions_signed(None));
    Ok(())
}

#[test]
fn unsigned_required_unauthenticated_is_missing_signature() -> anyhow::Result<()> {
    let ctx = unauthenticated_context();
    let err = validator(Some(true))?
        .validate_assertion_signature(None, Some(&ctx), None)
        .unwrap_err();
    assert!(matches!(err, SamlError::MissingRequiredSignature(_)));
    assert!(err.to_string().contains("must be signed"));
    Ok(())
}

#[test]
fn unsigned_not_required_unauthenticated_fails_closed() -> anyhow::Result<()> {
    let ctx = unauthenticated_context();
    let err = validator(Some(false))?
        .validate_assertion_signature(None, Some(&ctx), None)
        .unwrap_err();
    assert!(matches!(err, SamlError::PeerNotAuthenticated(_)));
    assert!(err.to_string().contains("not authenticated"));
    Ok(())
}

#[test]
fn absent_peer_context_counts_as_unauthenticated() -> anyhow::Result<()> {
    let validator = validator(Some(false))?;
    assert!(validator
        .validate_assertion_signature(None, Some(&bare_context()), None)
        .is_err());
    assert!(validator.validate_assertion_signature(None, None, None).is_err());
    Ok(())
}

#[test]
fn unsigned_not_required_authenticated_passes() -> anyhow::Result<()> {
    let ctx = bare_context()
        .with_peer_entity(SamlPeerEntityContext::authenticated(common::IDP_ENTITY_ID));
    let assertion = common::assertion("_a1", Utc::now(), None);
    validator(Some(false))?.validate_assertion_signature(Some(&assertion), Some(&ctx), None)?;
    Ok(())
}

#[test]
fn unsigned_required_authenticated_still_fails() -> anyhow::Result<()> {
    let ctx = bare_context()
        .with_peer_entity(SamlPeerEntityContext::authenticated(common::IDP_ENTITY_ID));
    let err = validator(Some(true))?
        .validate_assertion_signature(None, Some(&ctx), None)
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::MissingRequiredSignature);
    Ok(())
}

#[test]
fn valid_signature_passes_regardless_of_requirement() -> anyhow::Result<()> {
    let engine = FakeTrustEngine::new();
    let ctx = common::context(common::response(Utc::now(), Vec::new()), None);
    let assertion = common::signed_assertion("_a1", Utc::now());

    for want in [Some(true), Some(false), None] {
        validator(want)?.validate_assertion_signature(Some(&assertion), Some(&ctx), Some(&engine))?;
    }
    assert_eq!(engine.evaluations(), 3);
    Ok(())
}

#[test]
fn present_signature_evaluated_even_on_authenticated_transport() -> anyhow::Result<()> {
    let engine = FakeTrustEngine::new();
    let ctx = common::context(
        common::response(Utc::now(), Vec::new()),
        Some(SamlPeerEntityContext::authenticated(common::IDP_ENTITY_ID)),
    );
    let assertion = common::assertion("_a1", Utc::now(), None)
        .with_signature(common::forged_signature("_a1"));

    let err = validator(Some(false))?
        .validate_assertion_signature(Some(&assertion), Some(&ctx), Some(&engine))
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::UntrustedSignature);
    assert_eq!(engine.evaluations(), 1);
    Ok(())
}
