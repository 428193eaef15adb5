//! Configuration loading feeding the validator.

use std::sync::Arc;

use sp_core::SpConfig;
use sp_protocol_saml::{ResponseValidator, SamlError};

use crate::common::{self, FakeTrustEngine};

#[test]
fn toml_config_builds_validator() -> anyhow::Result<()> {
    let config = SpConfig::from_toml_str(&format!(
        r#"
        entity_id = "{}"
        acs_url = "{}"
        want_assertions_signed = false
        clock_skew_secs = 30
        "#,
        common::SP_ENTITY_ID,
        common::SP_ACS_URL
    ))?;

    let validator = ResponseValidator::builder(config)
        .trust_engine(Arc::new(FakeTrustEngine::new()))
        .build()?;

    assert_eq!(validator.config().clock_skew_secs, 30);
    assert_eq!(validator.config().maximum_authentication_lifetime_secs, 3600);
    assert!(!validator.wants_assertions_signed(None));
    assert!(validator.replay_cache().is_empty());
    Ok(())
}

#[test]
fn explicit_flag_overrides_metadata() -> anyhow::Result<()> {
    let config = SpConfig::from_toml_str(&format!(
        r#"
        entity_id = "{}"
        acs_url = "{}"
        want_assertions_signed = true
        "#,
        common::SP_ENTITY_ID,
        common::SP_ACS_URL
    ))?;
    let validator = ResponseValidator::builder(config).build()?;

    let ctx = common::context(common::response(chrono::Utc::now(), Vec::new()), None);
    assert!(validator.wants_assertions_signed(Some(&ctx)));
    Ok(())
}

#[test]
fn missing_entity_id_is_rejected() {
    let result = SpConfig::from_toml_str(r#"acs_url = "https://sp.example.com/callback""#);
    assert!(result.is_err());
}

#[test]
fn empty_acs_url_fails_validator_build() {
    let config = SpConfig::new(common::SP_ENTITY_ID, "  ");
    let err = ResponseValidator::builder(config).build().unwrap_err();
    assert!(matches!(err, SamlError::Configuration(_)));
}

#[test]
fn oversized_clock_skew_fails_validator_build() {
    let config = common::config().with_clock_skew_secs(10_000_000_000_000);
    let err = ResponseValidator::builder(config).build().unwrap_err();
    assert!(matches!(err, SamlError::Configuration(_)));

    let config = common::config().with_maximum_authentication_lifetime_secs(u64::MAX);
    let err = ResponseValidator::builder(config).build().unwrap_err();
    assert!(matches!(err, SamlError::Configuration(_)));
}
