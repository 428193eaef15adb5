//! XML Encryption placeholders.
//!
//! Encrypted elements are opaque to the validator; they are handed to a
//! [`Decrypter`](crate::decryption::Decrypter) which owns the SP key
//! material.

use serde::{Deserialize, Serialize};

/// Encrypted data structure (`<xenc:EncryptedData>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    /// The encryption algorithm URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_method: Option<String>,

    /// Key info for decryption.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_info: Option<KeyInfo>,

    /// The cipher data.
    pub cipher_data: CipherData,
}

impl EncryptedData {
    /// Creates encrypted data from a base64 cipher value.
    #[must_use]
    pub fn new(cipher_value: impl Into<String>) -> Self {
        Self {
            encryption_method: None,
            key_info: None,
            cipher_data: CipherData {
                cipher_value: cipher_value.into(),
            },
        }
    }

    /// Sets the encryption method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.encryption_method = Some(method.into());
        self
    }
}

/// Key information for encryption/decryption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    /// Encrypted key data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_key: Option<EncryptedKey>,

    /// Key name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
}

/// Encrypted key data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedKey {
    /// The encryption algorithm used for the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_method: Option<String>,

    /// The cipher data containing the encrypted key.
    pub cipher_data: CipherData,
}

/// Cipher data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherData {
    /// The cipher value (base64 encoded).
    pub cipher_value: String,
}

/// Encrypted assertion (`<saml:EncryptedAssertion>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedAssertion {
    /// The encrypted data.
    pub encrypted_data: EncryptedData,
}

impl EncryptedAssertion {
    /// Wraps encrypted data as an encrypted assertion.
    #[must_use]
    pub const fn new(encrypted_data: EncryptedData) -> Self {
        Self { encrypted_data }
    }
}
