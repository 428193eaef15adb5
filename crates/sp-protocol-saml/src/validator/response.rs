//! Checks on the Response envelope, run before any assertion.

use tracing::debug;

use super::ResponseValidator;
use crate::context::SamlMessageContext;
use crate::error::{SamlError, SamlResult};
use crate::signature::SignedElement;
use crate::types::SAML_VERSION;
use crate::validation::TimeWindow;

impl ResponseValidator {
    /// Validates status, structure, timing, destination, correlation,
    /// issuer and signature of the Response itself.
    ///
    /// A trusted response signature authenticates the peer for the rest of
    /// the pipeline.
    pub(super) fn validate_response(
        &self,
        ctx: &mut SamlMessageContext,
        window: &TimeWindow,
    ) -> SamlResult<()> {
        let response = &ctx.response;

        if !response.status.is_success() {
            return Err(SamlError::ResponseStatus {
                code: response.status.most_specific_code().to_string(),
                message: response.status.status_message.clone(),
            });
        }
        if response.version != SAML_VERSION {
            return Err(SamlError::InvalidResponse(format!(
                "unsupported SAML version {}",
                response.version
            )));
        }
        if response.id.is_empty() {
            return Err(SamlError::InvalidResponse("response has no ID".into()));
        }

        window.check_issue_instant(response.issue_instant, self.max_lifetime, "response")?;

        if let Some(destination) = &response.destination {
            if destination != &self.config.acs_url {
                return Err(SamlError::DestinationMismatch {
                    expected: self.config.acs_url.clone(),
                    actual: destination.clone(),
                });
            }
        }

        if let (Some(irt), Some(expected)) = (&response.in_response_to, &ctx.request_id) {
            if irt != expected {
                return Err(SamlError::SubjectConfirmationMismatch(format!(
                    "response InResponseTo {irt} does not match request {expected}"
                )));
            }
        }

        if let Some(issuer) = &response.issuer {
            check_issuer(ctx.peer_entity_id(), issuer)?;
        }

        match &response.signature {
            Some(signature) => {
                self.policy.verify_signature(
                    signature,
                    SignedElement::Document(&response.id),
                    Some(ctx),
                    self.trust_engine(),
                )?;
                debug!(response_id = %response.id, "response signature trusted");
                ctx.mark_peer_authenticated();
            }
            None if self.config.want_response_signed => {
                return Err(SamlError::MissingRequiredSignature(
                    "response is not signed but responses must be signed".into(),
                ));
            }
            None => {}
        }
        Ok(())
    }
}

/// Compares an issuer with the configured peer entity ID.
pub(super) fn check_issuer(expected: Option<&str>, actual: &str) -> SamlResult<()> {
    match expected {
        Some(expected) if expected == actual => Ok(()),
        Some(expected) => Err(SamlError::UntrustedIssuer {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }),
        None => Err(SamlError::UntrustedIssuer {
            expected: "<no peer configured>".to_string(),
            actual: actual.to_string(),
        }),
    }
}
