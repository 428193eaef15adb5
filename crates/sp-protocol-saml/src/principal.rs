//! The authenticated principal produced by a successful validation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decryption::{self, Decrypter};
use crate::error::SamlResult;
use crate::types::{Assertion, Attribute, NameId};

/// Identity established from one accepted assertion.
///
/// Immutable once built. Attribute values are merged across all attribute
/// statements of the assertion, keeping first-seen order and dropping
/// duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedPrincipal {
    /// Entity ID of the asserting IdP.
    pub issuer: String,
    /// Subject name identifier.
    pub name_id: NameId,
    /// ID of the accepted assertion.
    pub assertion_id: String,
    /// Time the subject authenticated at the IdP.
    pub authn_instant: DateTime<Utc>,
    /// IdP session index, if given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_index: Option<String>,
    /// Authentication context class references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authn_contexts: Vec<String>,
    /// Attribute name to values.
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl AuthenticatedPrincipal {
    /// The subject identifier value.
    #[must_use]
    pub fn subject_id(&self) -> &str {
        &self.name_id.value
    }

    /// Values of the attribute `name`, empty when absent.
    #[must_use]
    pub fn attribute(&self, name: &str) -> &[String] {
        self.attributes.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Assembles a principal from an assertion whose subject resolved to
    /// `name_id`. Encrypted attributes are decrypted and merged.
    ///
    /// # Errors
    ///
    /// Returns a decryption failure if an encrypted attribute cannot be read.
    pub(crate) fn from_assertion(
        assertion: &Assertion,
        name_id: NameId,
        decrypter: Option<&dyn Decrypter>,
    ) -> SamlResult<Self> {
        let mut attributes: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for statement in &assertion.attribute_statements {
            for attribute in &statement.attributes {
                merge(&mut attributes, attribute);
            }
            for encrypted in &statement.encrypted_attributes {
                let attribute =
                    decryption::require(decrypter, "attribute")?.decrypt_attribute(encrypted)?;
                merge(&mut attributes, &attribute);
            }
        }

        let first = assertion.authn_statements.first();
        let authn_contexts = assertion
            .authn_statements
            .iter()
            .filter_map(|s| s.authn_context_class_ref.clone())
            .collect();

        Ok(Self {
            issuer: assertion.issuer.clone(),
            name_id,
            assertion_id: assertion.id.clone(),
            authn_instant: first.map_or(assertion.issue_instant, |s| s.authn_instant),
            session_index: first.and_then(|s| s.session_index.clone()),
            authn_contexts,
            attributes,
        })
    }
}

fn merge(attributes: &mut BTreeMap<String, Vec<String>>, attribute: &Attribute) {
    let values = attributes.entry(attribute.name.clone()).or_default();
    for value in &attribute.values {
        if !values.contains(value) {
            values.push(value.clone());
        }
    }
}
