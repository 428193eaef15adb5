//! Replay detection across validations sharing one cache.

use std::sync::Arc;
use std::thread;

use chrono::{Duration, Utc};
use sp_cache::{InMemoryReplayCache, ReplayCacheProvider};
use sp_protocol_saml::{Conditions, FailureKind, ResponseValidator, SamlError};

use crate::common::{self, FakeTrustEngine};

fn validator_sharing(cache: Arc<InMemoryReplayCache>) -> anyhow::Result<ResponseValidator> {
    common::init_tracing();
    Ok(ResponseValidator::builder(common::config())
        .trust_engine(Arc::new(FakeTrustEngine::new()))
        .replay_cache(cache)
        .build()?)
}

#[test]
fn second_use_of_assertion_is_replay() -> anyhow::Result<()> {
    let now = Utc::now();
    let validator =
        common::validator_with(common::config(), Arc::new(FakeTrustEngine::new()), None)?;
    let response = common::response(now, vec![common::signed_assertion("_a1", now)]);

    validator.validate_at(&mut common::context(response.clone(), None), now)?;
    let err = validator
        .validate_at(&mut common::context(response, None), now)
        .unwrap_err();

    assert!(matches!(err, SamlError::ReplayedAssertion(_)));
    assert_eq!(err.kind(), FailureKind::ReplayedAssertion);
    Ok(())
}

#[test]
fn replay_detected_across_validators_sharing_cache() -> anyhow::Result<()> {
    let now = Utc::now();
    let cache = Arc::new(InMemoryReplayCache::new(16));
    let first = validator_sharing(cache.clone())?;
    let second = validator_sharing(cache.clone())?;
    let response = common::response(now, vec![common::signed_assertion("_a1", now)]);

    first.validate_at(&mut common::context(response.clone(), None), now)?;
    let err = second
        .validate_at(&mut common::context(response, None), now)
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::ReplayedAssertion);
    assert!(cache.contains("_a1", now)?);
    Ok(())
}

#[test]
fn concurrent_submissions_accept_exactly_one() -> anyhow::Result<()> {
    let now = Utc::now();
    let cache = Arc::new(InMemoryReplayCache::new(16));
    let validator = validator_sharing(cache.clone())?;
    let response = common::response(now, vec![common::signed_assertion("_race", now)]);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let validator = &validator;
                let response = response.clone();
                scope.spawn(move || {
                    validator.validate_at(&mut common::context(response, None), now)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("validation thread panicked"))
            .collect()
    });

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let replays = results
        .iter()
        .filter(|r| matches!(r, Err(SamlError::ReplayedAssertion(_))))
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(replays, 7);
    assert_eq!(cache.len(), 1);
    Ok(())
}

#[test]
fn rejected_assertion_does_not_consume_its_id() -> anyhow::Result<()> {
    let now = Utc::now();
    let validator =
        common::validator_with(common::config(), Arc::new(FakeTrustEngine::new()), None)?;

    let mut wrong_audience = common::signed_assertion("_a1", now);
    wrong_audience.conditions = Some(
        Conditions::between(now, now + Duration::minutes(5))
            .with_audience("https://other-sp.example.com"),
    );
    let rejected = common::response(now, vec![wrong_audience]);
    assert!(validator
        .validate_at(&mut common::context(rejected, None), now)
        .is_err());
    assert!(validator.replay_cache().is_empty());

    let accepted = common::response(now, vec![common::signed_assertion("_a1", now)]);
    validator.validate_at(&mut common::context(accepted, None), now)?;
    Ok(())
}

#[test]
fn expired_entry_can_be_reused() -> anyhow::Result<()> {
    let now = Utc::now();
    let validator =
        common::validator_with(common::config(), Arc::new(FakeTrustEngine::new()), None)?;
    let response = common::response(now, vec![common::signed_assertion("_a1", now)]);
    validator.validate_at(&mut common::context(response, None), now)?;

    let later = now + Duration::hours(1);
    let response = common::response(later, vec![common::signed_assertion("_a1", later)]);
    validator.validate_at(&mut common::context(response, None), later)?;
    Ok(())
}

#[test]
fn full_cache_is_reported_as_cache_failure() -> anyhow::Result<()> {
    let now = Utc::now();
    let mut config = common::config();
    config.replay_cache_capacity = 1;
    let validator = common::validator_with(config, Arc::new(FakeTrustEngine::new()), None)?;

    let first = common::response(now, vec![common::signed_assertion("_a1", now)]);
    validator.validate_at(&mut common::context(first, None), now)?;

    let second = common::response(now, vec![common::signed_assertion("_a2", now)]);
    let err = validator
        .validate_at(&mut common::context(second, None), now)
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::Cache);
    Ok(())
}
