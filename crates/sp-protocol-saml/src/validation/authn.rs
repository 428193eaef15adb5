//! AuthnStatement checks.

use chrono::Duration;

use super::{saturating_sub, TimeWindow};
use crate::error::{SamlError, SamlResult};
use crate::types::AuthnStatement;

/// Checks every AuthnStatement of an assertion.
///
/// At least one statement is required. The authentication instant may not
/// lie in the future nor be older than `max_lifetime`, and a
/// `SessionNotOnOrAfter` must not have passed.
///
/// # Errors
///
/// Returns [`SamlError::InvalidResponse`], [`SamlError::AuthenticationTooOld`]
/// or [`SamlError::ExpiredOrNotYetValid`].
pub fn validate_authn_statements(
    statements: &[AuthnStatement],
    window: &TimeWindow,
    max_lifetime: Duration,
) -> SamlResult<()> {
    if statements.is_empty() {
        return Err(SamlError::InvalidResponse(
            "assertion has no AuthnStatement".into(),
        ));
    }
    for statement in statements {
        window.check_not_before(statement.authn_instant, "authentication instant")?;
        let oldest = saturating_sub(saturating_sub(window.now, window.skew), max_lifetime);
        if oldest > statement.authn_instant {
            return Err(SamlError::AuthenticationTooOld(format!(
                "authenticated at {}, maximum lifetime is {}s",
                statement.authn_instant,
                max_lifetime.num_seconds()
            )));
        }
        if let Some(session_end) = statement.session_not_on_or_after {
            window.check_not_on_or_after(session_end, "session")?;
        }
    }
    Ok(())
}
