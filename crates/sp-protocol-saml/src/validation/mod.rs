//! Semantic checks on a single assertion.
//!
//! Each check is a free function over plain data plus a [`TimeWindow`], so
//! the orchestrator in [`crate::validator`] decides ordering and failure
//! priority while these functions decide pass or fail.

mod authn;
mod conditions;
mod subject;

pub use authn::validate_authn_statements;
pub use conditions::{validate_audience, validate_conditions};
pub use subject::{validate_subject, ConfirmedSubject, SubjectCheck};

use chrono::{DateTime, Duration, Utc};

use crate::error::{SamlError, SamlResult};

/// The current instant together with the tolerated clock skew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// The instant validation runs at.
    pub now: DateTime<Utc>,
    /// Allowed clock difference with the IdP.
    pub skew: Duration,
}

impl TimeWindow {
    /// Creates a window at `now` with `skew`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>, skew: Duration) -> Self {
        Self { now, skew }
    }

    /// Fails when `not_before` is still in the future.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::ExpiredOrNotYetValid`] naming `what`.
    pub fn check_not_before(&self, not_before: DateTime<Utc>, what: &str) -> SamlResult<()> {
        if saturating_add(self.now, self.skew) < not_before {
            return Err(SamlError::ExpiredOrNotYetValid(format!(
                "{what} not valid before {not_before}"
            )));
        }
        Ok(())
    }

    /// Fails when `not_on_or_after` has been reached. The bound is exclusive.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::ExpiredOrNotYetValid`] naming `what`.
    pub fn check_not_on_or_after(
        &self,
        not_on_or_after: DateTime<Utc>,
        what: &str,
    ) -> SamlResult<()> {
        if saturating_sub(self.now, self.skew) >= not_on_or_after {
            return Err(SamlError::ExpiredOrNotYetValid(format!(
                "{what} expired at {not_on_or_after}"
            )));
        }
        Ok(())
    }

    /// Fails when `issued` lies in the future or more than `lifetime` in
    /// the past.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::ExpiredOrNotYetValid`] naming `what`.
    pub fn check_issue_instant(
        &self,
        issued: DateTime<Utc>,
        lifetime: Duration,
        what: &str,
    ) -> SamlResult<()> {
        self.check_not_before(issued, what)?;
        self.check_not_on_or_after(saturating_add(issued, lifetime), what)
    }
}

/// `instant + delta`, clamped to the representable range.
pub(crate) fn saturating_add(instant: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    instant.checked_add_signed(delta).unwrap_or(if delta < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// `instant - delta`, clamped to the representable range.
pub(crate) fn saturating_sub(instant: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    instant.checked_sub_signed(delta).unwrap_or(if delta < Duration::zero() {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    })
}
