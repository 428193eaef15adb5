//! Subject identification and bearer confirmation.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::TimeWindow;
use crate::decryption::{self, Decrypter};
use crate::error::{SamlError, SamlResult};
use crate::types::{NameId, Subject, SubjectConfirmation, SubjectConfirmationData};

/// Inputs for subject confirmation.
#[derive(Debug, Clone, Copy)]
pub struct SubjectCheck<'a> {
    /// The SP assertion consumer service URL.
    pub acs_url: &'a str,
    /// The AuthnRequest ID this SP is waiting on, if any.
    pub request_id: Option<&'a str>,
    /// Current time and skew.
    pub window: TimeWindow,
}

/// A subject with a resolved identifier and a confirmed bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedSubject {
    /// The plaintext name identifier.
    pub name_id: NameId,
    /// Earliest `NotOnOrAfter` among the bearer confirmations that passed.
    pub confirmed_until: DateTime<Utc>,
}

/// Resolves the subject identifier and confirms at least one bearer.
///
/// Non-bearer confirmation methods are skipped. An encrypted identifier is
/// decrypted with `decrypter`.
///
/// # Errors
///
/// - [`SamlError::InvalidResponse`] when the subject or its identifier is missing
/// - [`SamlError::Decryption`] when the encrypted identifier cannot be read
/// - [`SamlError::SubjectConfirmationMismatch`] when no bearer confirms
/// - [`SamlError::ExpiredOrNotYetValid`] when the only bearer failed on time
pub fn validate_subject(
    subject: Option<&Subject>,
    check: &SubjectCheck<'_>,
    decrypter: Option<&dyn Decrypter>,
) -> SamlResult<ConfirmedSubject> {
    let subject =
        subject.ok_or_else(|| SamlError::InvalidResponse("assertion has no subject".into()))?;
    let name_id = resolve_name_id(subject, decrypter)?;

    let mut confirmed_until: Option<DateTime<Utc>> = None;
    let mut last_error = None;
    for confirmation in subject.subject_confirmations.iter().filter(|c| c.is_bearer()) {
        match validate_bearer(confirmation, check) {
            Ok(until) => {
                confirmed_until = Some(confirmed_until.map_or(until, |c| c.min(until)));
            }
            Err(e) => {
                debug!(error = %e, "bearer confirmation rejected");
                last_error = Some(e);
            }
        }
    }

    match (confirmed_until, last_error) {
        (Some(confirmed_until), _) => Ok(ConfirmedSubject {
            name_id,
            confirmed_until,
        }),
        (None, Some(e)) => Err(e),
        (None, None) => Err(SamlError::SubjectConfirmationMismatch(
            "no bearer subject confirmation".into(),
        )),
    }
}

fn resolve_name_id(subject: &Subject, decrypter: Option<&dyn Decrypter>) -> SamlResult<NameId> {
    if let Some(name_id) = &subject.name_id {
        if name_id.value.is_empty() {
            return Err(SamlError::InvalidResponse("subject NameID is empty".into()));
        }
        return Ok(name_id.clone());
    }
    if let Some(encrypted) = &subject.encrypted_id {
        let name_id = decryption::require(decrypter, "subject identifier")?
            .decrypt_name_id(encrypted)?;
        return Ok(name_id);
    }
    Err(SamlError::InvalidResponse("subject has no NameID".into()))
}

fn validate_bearer(
    confirmation: &SubjectConfirmation,
    check: &SubjectCheck<'_>,
) -> SamlResult<DateTime<Utc>> {
    let Some(data) = &confirmation.subject_confirmation_data else {
        return Err(SamlError::SubjectConfirmationMismatch(
            "bearer confirmation has no SubjectConfirmationData".into(),
        ));
    };
    validate_recipient(data, check.acs_url)?;
    validate_in_response_to(data, check.request_id)?;

    if let Some(not_before) = data.not_before {
        check.window.check_not_before(not_before, "bearer confirmation")?;
    }
    let not_on_or_after = data.not_on_or_after.ok_or_else(|| {
        SamlError::SubjectConfirmationMismatch("bearer confirmation has no NotOnOrAfter".into())
    })?;
    check
        .window
        .check_not_on_or_after(not_on_or_after, "bearer confirmation")?;
    Ok(not_on_or_after)
}

fn validate_recipient(data: &SubjectConfirmationData, acs_url: &str) -> SamlResult<()> {
    match data.recipient.as_deref() {
        Some(recipient) if recipient == acs_url => Ok(()),
        Some(recipient) => Err(SamlError::SubjectConfirmationMismatch(format!(
            "recipient {recipient} is not {acs_url}"
        ))),
        None => Err(SamlError::SubjectConfirmationMismatch(
            "bearer confirmation has no Recipient".into(),
        )),
    }
}

fn validate_in_response_to(
    data: &SubjectConfirmationData,
    request_id: Option<&str>,
) -> SamlResult<()> {
    match (data.in_response_to.as_deref(), request_id) {
        (None, _) => Ok(()),
        (Some(irt), Some(expected)) if irt == expected => Ok(()),
        (Some(irt), Some(expected)) => Err(SamlError::SubjectConfirmationMismatch(format!(
            "InResponseTo {irt} does not match request {expected}"
        ))),
        (Some(irt), None) => Err(SamlError::SubjectConfirmationMismatch(format!(
            "InResponseTo {irt} but no request is outstanding"
        ))),
    }
}
