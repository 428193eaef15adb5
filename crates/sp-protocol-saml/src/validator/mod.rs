//! Response validation.
//!
//! [`ResponseValidator`] turns an inbound Response into an
//! [`AuthenticatedPrincipal`] or a classified [`SamlError`]:
//!
//! 1. Response envelope checks (status, destination, issuer, signature)
//! 2. Candidate collection: plaintext assertions, then decrypted ones
//! 3. Per candidate: structure, issuer, signature, time, audience,
//!    subject, authn, attributes, replay
//! 4. The first candidate to pass every stage is accepted
//!
//! When no candidate passes, the failure with the highest
//! [`FailureKind::priority`](crate::error::FailureKind::priority) is
//! returned.

mod response;
mod stage;

pub use stage::{AssertionFailure, ValidationStage};

use std::borrow::Cow;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sp_cache::{InMemoryReplayCache, ReplayCacheProvider};
use sp_core::{Event, EventType, SpConfig};
use tracing::{debug, info, warn};

use crate::context::SamlMessageContext;
use crate::decryption::{self, Decrypter};
use crate::error::{SamlError, SamlResult};
use crate::principal::AuthenticatedPrincipal;
use crate::signature::{AssertionSignaturePolicy, SignatureTrustEngine};
use crate::types::{Assertion, Conditions, SAML_VERSION};
use crate::validation::{self, SubjectCheck, TimeWindow};

/// Validates SAML Responses for one service provider.
///
/// Cheap to share behind an `Arc`; the replay cache inside is shared by
/// every validation.
pub struct ResponseValidator {
    config: SpConfig,
    policy: AssertionSignaturePolicy,
    trust_engine: Option<Arc<dyn SignatureTrustEngine>>,
    decrypter: Option<Arc<dyn Decrypter>>,
    replay_cache: Arc<dyn ReplayCacheProvider>,
    skew: Duration,
    max_lifetime: Duration,
}

impl std::fmt::Debug for ResponseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseValidator")
            .field("entity_id", &self.config.entity_id)
            .field("policy", &self.policy)
            .field("trust_engine", &self.trust_engine.is_some())
            .field("decrypter", &self.decrypter.is_some())
            .field("skew", &self.skew)
            .finish_non_exhaustive()
    }
}

impl ResponseValidator {
    /// Returns a builder for a validator configured by `config`.
    #[must_use]
    pub fn builder(config: SpConfig) -> ResponseValidatorBuilder {
        ResponseValidatorBuilder::new(config)
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SpConfig {
        &self.config
    }

    /// The configured trust engine.
    #[must_use]
    pub fn trust_engine(&self) -> Option<&dyn SignatureTrustEngine> {
        self.trust_engine.as_deref()
    }

    /// The shared replay cache.
    #[must_use]
    pub fn replay_cache(&self) -> &dyn ReplayCacheProvider {
        self.replay_cache.as_ref()
    }

    /// Whether assertions must be signed. See
    /// [`AssertionSignaturePolicy::wants_assertions_signed`].
    #[must_use]
    pub fn wants_assertions_signed(&self, ctx: Option<&SamlMessageContext>) -> bool {
        self.policy.wants_assertions_signed(ctx)
    }

    /// Validates an assertion signature. See
    /// [`AssertionSignaturePolicy::validate_assertion_signature`].
    ///
    /// # Errors
    ///
    /// Returns the signature policy failure.
    pub fn validate_assertion_signature(
        &self,
        assertion: Option<&Assertion>,
        ctx: Option<&SamlMessageContext>,
        engine: Option<&dyn SignatureTrustEngine>,
    ) -> SamlResult<()> {
        self.policy.validate_assertion_signature(assertion, ctx, engine)
    }

    /// Validates the Response in `ctx` at the current time.
    ///
    /// # Errors
    ///
    /// Returns the Response-level failure, or the most informative
    /// per-assertion failure when no assertion is accepted.
    pub fn validate(&self, ctx: &mut SamlMessageContext) -> SamlResult<AuthenticatedPrincipal> {
        self.validate_at(ctx, Utc::now())
    }

    /// Validates the Response in `ctx` as of `now`.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn validate_at(
        &self,
        ctx: &mut SamlMessageContext,
        now: DateTime<Utc>,
    ) -> SamlResult<AuthenticatedPrincipal> {
        let window = TimeWindow::new(now, self.skew);
        let result = self.run(ctx, &window);

        let issuer = ctx.peer_entity_id().unwrap_or_default().to_string();
        match &result {
            Ok(principal) => {
                info!(
                    issuer = %principal.issuer,
                    assertion_id = %principal.assertion_id,
                    "SAML response accepted"
                );
                Event::builder(EventType::Login)
                    .success()
                    .issuer(issuer)
                    .subject(principal.subject_id())
                    .message_id(&principal.assertion_id)
                    .build()
                    .emit();
            }
            Err(error) => {
                warn!(kind = ?error.kind(), %error, "SAML response rejected");
                Event::builder(EventType::LoginError)
                    .failure(error.to_string())
                    .issuer(issuer)
                    .message_id(&ctx.response.id)
                    .detail("kind", format!("{:?}", error.kind()))
                    .build()
                    .emit();
            }
        }
        result
    }

    fn run(
        &self,
        ctx: &mut SamlMessageContext,
        window: &TimeWindow,
    ) -> SamlResult<AuthenticatedPrincipal> {
        self.validate_response(ctx, window)?;
        let ctx: &SamlMessageContext = ctx;

        if ctx.response.assertion_count() == 0 {
            return Err(SamlError::NoValidAssertion(
                "response contains no assertion".into(),
            ));
        }

        let mut failures = Vec::new();
        for (index, candidate) in self.candidates(ctx).into_iter().enumerate() {
            let assertion = match candidate {
                Ok(assertion) => assertion,
                Err(error) => {
                    warn!(index, %error, "encrypted assertion rejected");
                    failures.push(AssertionFailure {
                        index,
                        assertion_id: None,
                        stage: ValidationStage::Decryption,
                        error,
                    });
                    continue;
                }
            };
            match self.validate_assertion(&assertion, ctx, window) {
                Ok(principal) => return Ok(principal),
                Err((stage, error)) => {
                    warn!(
                        index,
                        assertion_id = %assertion.id,
                        %stage,
                        kind = ?error.kind(),
                        "assertion rejected"
                    );
                    failures.push(AssertionFailure {
                        index,
                        assertion_id: Some(assertion.id.clone()),
                        stage,
                        error,
                    });
                }
            }
        }

        Err(stage::most_informative(failures).map_or_else(
            || SamlError::NoValidAssertion("no assertion could be evaluated".into()),
            |f| f.error,
        ))
    }

    /// Plaintext assertions first, then each encrypted assertion decrypted.
    fn candidates<'a>(&self, ctx: &'a SamlMessageContext) -> Vec<SamlResult<Cow<'a, Assertion>>> {
        let plain = ctx
            .response
            .assertions
            .iter()
            .map(|a| SamlResult::Ok(Cow::Borrowed(a)));
        let decrypted = ctx.response.encrypted_assertions.iter().map(|encrypted| {
            let assertion = decryption::require(self.decrypter.as_deref(), "assertion")?
                .decrypt_assertion(encrypted)?;
            SamlResult::Ok(Cow::Owned(assertion))
        });
        plain.chain(decrypted).collect()
    }

    fn validate_assertion(
        &self,
        assertion: &Assertion,
        ctx: &SamlMessageContext,
        window: &TimeWindow,
    ) -> Result<AuthenticatedPrincipal, (ValidationStage, SamlError)> {
        let at = |stage: ValidationStage| move |error: SamlError| (stage, error);

        check_structure(assertion).map_err(at(ValidationStage::Structure))?;

        response::check_issuer(ctx.peer_entity_id(), &assertion.issuer)
            .map_err(at(ValidationStage::Issuer))?;

        self.policy
            .validate_assertion_signature(Some(assertion), Some(ctx), self.trust_engine())
            .map_err(at(ValidationStage::Signature))?;
        debug!(assertion_id = %assertion.id, "assertion signature policy satisfied");

        window
            .check_issue_instant(assertion.issue_instant, self.max_lifetime, "assertion")
            .map_err(at(ValidationStage::Time))?;
        validation::validate_conditions(assertion.conditions.as_ref(), window)
            .map_err(at(ValidationStage::Time))?;
        if let Some(conditions) = &assertion.conditions {
            validation::validate_audience(conditions, &self.config.entity_id)
                .map_err(at(ValidationStage::Audience))?;
        }
        debug!(assertion_id = %assertion.id, "assertion conditions satisfied");

        let check = SubjectCheck {
            acs_url: &self.config.acs_url,
            request_id: ctx.request_id.as_deref(),
            window: *window,
        };
        let subject = validation::validate_subject(
            assertion.subject.as_ref(),
            &check,
            self.decrypter.as_deref(),
        )
        .map_err(at(ValidationStage::Subject))?;

        validation::validate_authn_statements(
            &assertion.authn_statements,
            window,
            self.max_lifetime,
        )
        .map_err(at(ValidationStage::Authn))?;

        let principal = AuthenticatedPrincipal::from_assertion(
            assertion,
            subject.name_id,
            self.decrypter.as_deref(),
        )
        .map_err(at(ValidationStage::Attributes))?;

        let expires_at = replay_expiry(
            assertion.conditions.as_ref(),
            Some(subject.confirmed_until),
            window,
            self.max_lifetime,
        );
        self.consume(assertion, expires_at, window.now)
            .map_err(at(ValidationStage::Replay))?;

        Ok(principal)
    }

    fn consume(
        &self,
        assertion: &Assertion,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> SamlResult<()> {
        if self.replay_cache.check_and_insert(&assertion.id, expires_at, now)? {
            debug!(assertion_id = %assertion.id, %expires_at, "assertion ID recorded");
            return Ok(());
        }
        Event::builder(EventType::ReplayDetected)
            .failure("assertion ID already consumed")
            .issuer(&assertion.issuer)
            .message_id(&assertion.id)
            .build()
            .emit();
        Err(SamlError::ReplayedAssertion(format!(
            "assertion {} has already been used",
            assertion.id
        )))
    }
}

fn check_structure(assertion: &Assertion) -> SamlResult<()> {
    if assertion.version != SAML_VERSION {
        return Err(SamlError::InvalidResponse(format!(
            "unsupported assertion version {}",
            assertion.version
        )));
    }
    if assertion.id.is_empty() {
        return Err(SamlError::InvalidResponse("assertion has no ID".into()));
    }
    Ok(())
}

/// How long an accepted assertion ID must be remembered.
///
/// Conditions `NotOnOrAfter` when present, else the bearer confirmation
/// bound, else `now + max_lifetime`. Skew is always added.
fn replay_expiry(
    conditions: Option<&Conditions>,
    confirmed_until: Option<DateTime<Utc>>,
    window: &TimeWindow,
    max_lifetime: Duration,
) -> DateTime<Utc> {
    let until = conditions
        .and_then(|c| c.not_on_or_after)
        .or(confirmed_until)
        .unwrap_or_else(|| validation::saturating_add(window.now, max_lifetime));
    validation::saturating_add(until, window.skew)
}

/// Builder for [`ResponseValidator`].
pub struct ResponseValidatorBuilder {
    config: SpConfig,
    trust_engine: Option<Arc<dyn SignatureTrustEngine>>,
    decrypter: Option<Arc<dyn Decrypter>>,
    replay_cache: Option<Arc<dyn ReplayCacheProvider>>,
    allow_sha1: bool,
}

impl ResponseValidatorBuilder {
    fn new(config: SpConfig) -> Self {
        Self {
            config,
            trust_engine: None,
            decrypter: None,
            replay_cache: None,
            allow_sha1: false,
        }
    }

    /// Sets the trust engine used for every signature.
    #[must_use]
    pub fn trust_engine(mut self, engine: Arc<dyn SignatureTrustEngine>) -> Self {
        self.trust_engine = Some(engine);
        self
    }

    /// Sets the decrypter for encrypted assertions, identifiers and
    /// attributes.
    #[must_use]
    pub fn decrypter(mut self, decrypter: Arc<dyn Decrypter>) -> Self {
        self.decrypter = Some(decrypter);
        self
    }

    /// Shares an existing replay cache. Without one, an in-memory cache
    /// sized by the configuration is created.
    #[must_use]
    pub fn replay_cache(mut self, cache: Arc<dyn ReplayCacheProvider>) -> Self {
        self.replay_cache = Some(cache);
        self
    }

    /// Accepts RSA-SHA1 signatures.
    #[must_use]
    pub const fn allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }

    /// Builds the validator.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Configuration`] when the configuration is
    /// invalid.
    pub fn build(self) -> SamlResult<ResponseValidator> {
        self.config.validate()?;
        let skew = to_duration(self.config.clock_skew(), "clock skew")?;
        let max_lifetime = to_duration(
            self.config.maximum_authentication_lifetime(),
            "maximum authentication lifetime",
        )?;
        let replay_cache = self.replay_cache.unwrap_or_else(|| {
            Arc::new(InMemoryReplayCache::new(self.config.replay_cache_capacity))
        });
        let policy = AssertionSignaturePolicy::new(self.config.want_assertions_signed)
            .with_allow_sha1(self.allow_sha1);

        Ok(ResponseValidator {
            config: self.config,
            policy,
            trust_engine: self.trust_engine,
            decrypter: self.decrypter,
            replay_cache,
            skew,
            max_lifetime,
        })
    }
}

fn to_duration(value: std::time::Duration, what: &str) -> SamlResult<Duration> {
    Duration::from_std(value).map_err(|e| SamlError::Configuration(format!("{what}: {e}")))
}
