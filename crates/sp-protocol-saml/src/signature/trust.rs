//! Trust engine capability.
//!
//! Key material, certificate chains and the cryptographic check live behind
//! [`SignatureTrustEngine`]. Implementations may keep an internal key cache;
//! they must be safe to share across threads.

use thiserror::Error;

use super::XmlSignature;
use crate::types::RoleDescriptor;

/// What a signature is being trusted for.
#[derive(Debug, Clone, Copy)]
pub struct TrustCriteria<'a> {
    /// Entity ID of the peer expected to have signed.
    pub peer_entity_id: Option<&'a str>,
    /// Peer role descriptor from metadata, if known.
    pub peer_role: Option<&'a RoleDescriptor>,
    /// ID of the element the signature must cover.
    pub signed_element_id: &'a str,
}

/// Errors an engine reports instead of a verdict.
#[derive(Debug, Error)]
pub enum TrustEngineError {
    /// No trusted credentials exist for the peer.
    #[error("no trusted credentials for {0}")]
    NoCredentials(String),

    /// The engine could not evaluate the signature.
    #[error("signature evaluation failed: {0}")]
    Evaluation(String),
}

/// Evaluates signatures against trusted key material for a peer.
pub trait SignatureTrustEngine: Send + Sync {
    /// Returns `Ok(true)` when `signature` validates against the peer's
    /// trusted keys.
    ///
    /// # Errors
    ///
    /// Returns an error when evaluation itself could not be performed.
    fn evaluate(
        &self,
        signature: &XmlSignature,
        criteria: &TrustCriteria<'_>,
    ) -> Result<bool, TrustEngineError>;
}
