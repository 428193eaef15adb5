//! Assertion signature policy.
//!
//! Decides whether an assertion must carry its own signature and checks
//! it does. A present signature is always verified, whatever the policy
//! says; an absent one is tolerated only when the policy does not demand
//! one and the transport already authenticated the peer.

use tracing::debug;

use super::{SignatureTrustEngine, SignedElement, TrustCriteria, XmlSignature};
use crate::context::SamlMessageContext;
use crate::error::{SamlError, SamlResult};
use crate::types::Assertion;

/// Signature requirements for assertions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssertionSignaturePolicy {
    /// Explicit `want_assertions_signed` setting. `None` defers to the SP
    /// metadata.
    pub want_assertions_signed: Option<bool>,
    /// Accept RSA-SHA1 signatures.
    pub allow_sha1: bool,
}

impl AssertionSignaturePolicy {
    /// Creates a policy with the given explicit flag.
    #[must_use]
    pub const fn new(want_assertions_signed: Option<bool>) -> Self {
        Self {
            want_assertions_signed,
            allow_sha1: false,
        }
    }

    /// Allows SHA-1 based signatures (not recommended).
    #[must_use]
    pub const fn with_allow_sha1(mut self, allow: bool) -> Self {
        self.allow_sha1 = allow;
        self
    }

    /// Whether assertions must be signed.
    ///
    /// The explicit flag wins. Otherwise the SP descriptor in the self
    /// metadata decides. With neither, assertions need not be signed.
    #[must_use]
    pub fn wants_assertions_signed(&self, ctx: Option<&SamlMessageContext>) -> bool {
        if let Some(explicit) = self.want_assertions_signed {
            return explicit;
        }
        ctx.and_then(SamlMessageContext::sp_sso_descriptor)
            .is_some_and(|sp| sp.wants_assertions_signed())
    }

    /// Validates the signature of `assertion` under this policy.
    ///
    /// Any argument may be absent. A missing context means the peer is
    /// unauthenticated; a missing engine cannot trust any signature.
    ///
    /// # Errors
    ///
    /// - [`SamlError::UntrustedSignature`] when a present signature fails
    /// - [`SamlError::MissingRequiredSignature`] when unsigned but required
    /// - [`SamlError::PeerNotAuthenticated`] when unsigned, not required and
    ///   the transport did not authenticate the peer
    pub fn validate_assertion_signature(
        &self,
        assertion: Option<&Assertion>,
        ctx: Option<&SamlMessageContext>,
        engine: Option<&dyn SignatureTrustEngine>,
    ) -> SamlResult<()> {
        if let Some((assertion, signature)) =
            assertion.and_then(|a| a.signature.as_ref().map(|s| (a, s)))
        {
            return self.verify_signature(
                signature,
                SignedElement::Nested(&assertion.id),
                ctx,
                engine,
            );
        }

        if self.wants_assertions_signed(ctx) {
            return Err(SamlError::MissingRequiredSignature(
                "assertion is not signed but assertions must be signed".to_string(),
            ));
        }

        if ctx.is_some_and(SamlMessageContext::is_peer_authenticated) {
            debug!("unsigned assertion accepted on an authenticated transport");
            return Ok(());
        }

        Err(SamlError::PeerNotAuthenticated(
            "assertion is not signed and the peer was not authenticated".to_string(),
        ))
    }

    /// Verifies `signature` over `element`.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::UntrustedSignature`] when the algorithm is
    /// refused, the reference does not cover the element, no engine is
    /// available, or the engine rejects or cannot evaluate the signature.
    pub fn verify_signature(
        &self,
        signature: &XmlSignature,
        element: SignedElement<'_>,
        ctx: Option<&SamlMessageContext>,
        engine: Option<&dyn SignatureTrustEngine>,
    ) -> SamlResult<()> {
        let element_id = element.id();
        if signature.algorithm.is_deprecated() && !self.allow_sha1 {
            return Err(SamlError::UntrustedSignature(format!(
                "algorithm {} is not allowed",
                signature.algorithm.uri()
            )));
        }
        if !signature.references(element) {
            return Err(SamlError::UntrustedSignature(format!(
                "signature reference {} does not cover element {element_id}",
                signature.reference_uri
            )));
        }
        let Some(engine) = engine else {
            return Err(SamlError::UntrustedSignature(
                "no trust engine available to evaluate the signature".to_string(),
            ));
        };

        let criteria = TrustCriteria {
            peer_entity_id: ctx.and_then(SamlMessageContext::peer_entity_id),
            peer_role: ctx.and_then(|c| c.peer_metadata.role_descriptor.as_ref()),
            signed_element_id: element_id,
        };
        match engine.evaluate(signature, &criteria) {
            Ok(true) => {
                debug!(element_id, "signature trusted");
                Ok(())
            }
            Ok(false) => Err(SamlError::UntrustedSignature(format!(
                "signature on {element_id} is not trusted for the peer"
            ))),
            Err(e) => Err(SamlError::UntrustedSignature(e.to_string())),
        }
    }
}
