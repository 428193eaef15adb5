//! Per-assertion pipeline stages and failure bookkeeping.

use std::fmt;

use crate::error::SamlError;

/// A step of the per-assertion pipeline, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValidationStage {
    /// Decrypting an encrypted assertion.
    Decryption,
    /// Version and ID.
    Structure,
    /// Issuer against the expected IdP.
    Issuer,
    /// Signature per policy.
    Signature,
    /// Conditions and issue instant.
    Time,
    /// Audience restriction.
    Audience,
    /// Subject identifier and bearer confirmation.
    Subject,
    /// AuthnStatement lifetime and session.
    Authn,
    /// Attribute collection, including decryption.
    Attributes,
    /// One-time use.
    Replay,
}

impl ValidationStage {
    /// Stage name for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Decryption => "decryption",
            Self::Structure => "structure",
            Self::Issuer => "issuer",
            Self::Signature => "signature",
            Self::Time => "time",
            Self::Audience => "audience",
            Self::Subject => "subject",
            Self::Authn => "authn",
            Self::Attributes => "attributes",
            Self::Replay => "replay",
        }
    }
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why one candidate assertion was rejected.
#[derive(Debug)]
pub struct AssertionFailure {
    /// Position among candidates: plaintext assertions first, then
    /// encrypted ones, each in document order.
    pub index: usize,
    /// Assertion ID, unknown when decryption failed.
    pub assertion_id: Option<String>,
    /// Stage that failed.
    pub stage: ValidationStage,
    /// The failure.
    pub error: SamlError,
}

/// Picks the most informative failure. Ties go to the earliest candidate.
pub(crate) fn most_informative(failures: Vec<AssertionFailure>) -> Option<AssertionFailure> {
    let mut best: Option<AssertionFailure> = None;
    for failure in failures {
        let better = best
            .as_ref()
            .map_or(true, |b| failure.error.kind().outranks(b.error.kind()));
        if better {
            best = Some(failure);
        }
    }
    best
}
