//! Decryption capability.
//!
//! The SP private key stays inside the [`Decrypter`] implementation. The
//! validator only hands it encrypted elements and feeds the plaintext back
//! into the normal pipeline.

use thiserror::Error;

use crate::error::SamlError;
use crate::types::{Assertion, Attribute, EncryptedAssertion, EncryptedData, NameId};

/// Decryption failures reported by a [`Decrypter`].
#[derive(Debug, Error)]
pub enum DecryptionError {
    /// No key can decrypt the element.
    #[error("no usable decryption key: {0}")]
    NoKey(String),

    /// Decryption ran but the ciphertext or its plaintext was invalid.
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// The algorithm is not supported.
    #[error("unsupported encryption algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl From<DecryptionError> for SamlError {
    fn from(err: DecryptionError) -> Self {
        Self::Decryption(err.to_string())
    }
}

/// Decrypts encrypted SAML elements with SP key material.
pub trait Decrypter: Send + Sync {
    /// Decrypts an `<EncryptedAssertion>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the assertion cannot be decrypted.
    fn decrypt_assertion(
        &self,
        encrypted: &EncryptedAssertion,
    ) -> Result<Assertion, DecryptionError>;

    /// Decrypts an `<EncryptedAttribute>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute cannot be decrypted.
    fn decrypt_attribute(&self, encrypted: &EncryptedData) -> Result<Attribute, DecryptionError>;

    /// Decrypts an `<EncryptedID>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier cannot be decrypted.
    fn decrypt_name_id(&self, encrypted: &EncryptedData) -> Result<NameId, DecryptionError>;
}

/// Returns `decrypter` or a decryption failure naming `what` needed it.
pub(crate) fn require<'a>(
    decrypter: Option<&'a dyn Decrypter>,
    what: &str,
) -> Result<&'a dyn Decrypter, SamlError> {
    decrypter.ok_or_else(|| {
        SamlError::Decryption(format!("{what} is encrypted but no decrypter is configured"))
    })
}
