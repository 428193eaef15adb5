//! Conditions: validity window and audience restriction.

use super::TimeWindow;
use crate::error::{SamlError, SamlResult};
use crate::types::Conditions;

/// Checks the Conditions validity window.
///
/// Absent Conditions impose no constraint.
///
/// # Errors
///
/// Returns [`SamlError::ExpiredOrNotYetValid`].
pub fn validate_conditions(conditions: Option<&Conditions>, window: &TimeWindow) -> SamlResult<()> {
    let Some(conditions) = conditions else {
        return Ok(());
    };
    if let Some(not_before) = conditions.not_before {
        window.check_not_before(not_before, "assertion")?;
    }
    if let Some(not_on_or_after) = conditions.not_on_or_after {
        window.check_not_on_or_after(not_on_or_after, "assertion")?;
    }
    Ok(())
}

/// Checks that `sp_entity_id` is listed when any AudienceRestriction
/// exists. Comparison is exact.
///
/// # Errors
///
/// Returns [`SamlError::AudienceMismatch`] listing the audiences found.
pub fn validate_audience(conditions: &Conditions, sp_entity_id: &str) -> SamlResult<()> {
    if conditions.audience_restrictions.is_empty() {
        return Ok(());
    }
    if conditions.audiences().any(|a| a == sp_entity_id) {
        return Ok(());
    }
    Err(SamlError::AudienceMismatch {
        expected: sp_entity_id.to_string(),
        audiences: conditions.audiences().collect::<Vec<_>>().join(", "),
    })
}
