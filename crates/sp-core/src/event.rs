//! Security event logging.
//!
//! Every Response validation produces one event. Events carry the
//! identities involved and the outcome, never attribute values or raw
//! message content, and are emitted through `tracing`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// SAML login accepted.
    Login,
    /// SAML login rejected.
    LoginError,
    /// An assertion ID was presented a second time.
    ReplayDetected,
    /// An authentication request was sent to the IdP.
    AuthnRequestSent,
}

impl EventType {
    /// Returns the wire name of this event type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::LoginError => "LOGIN_ERROR",
            Self::ReplayDetected => "REPLAY_DETECTED",
            Self::AuthnRequestSent => "AUTHN_REQUEST_SENT",
        }
    }
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// A security event for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: EventType,

    /// Outcome of the event.
    pub outcome: EventOutcome,

    /// Entity ID of the identity provider.
    pub issuer: Option<String>,

    /// Subject name identifier.
    pub subject: Option<String>,

    /// Assertion or request ID the event is about.
    pub message_id: Option<String>,

    /// Error message (for failure events).
    pub error: Option<String>,

    /// Additional details as key-value pairs.
    pub details: Vec<(String, String)>,
}

impl Event {
    /// Creates a new event builder.
    #[must_use]
    pub const fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }

    /// Emits this event through `tracing`.
    ///
    /// Successful events are logged at `info`, failures at `warn`.
    pub fn emit(&self) {
        let issuer = self.issuer.as_deref().unwrap_or("-");
        let subject = self.subject.as_deref().unwrap_or("-");
        let message_id = self.message_id.as_deref().unwrap_or("-");
        let details = self.details_field();
        match self.outcome {
            EventOutcome::Success => tracing::info!(
                target: "sp::audit",
                event_id = %self.id,
                event_type = self.event_type.as_str(),
                issuer,
                subject,
                message_id,
                details,
                "security event"
            ),
            EventOutcome::Failure => tracing::warn!(
                target: "sp::audit",
                event_id = %self.id,
                event_type = self.event_type.as_str(),
                issuer,
                subject,
                message_id,
                details,
                error = self.error.as_deref().unwrap_or("-"),
                "security event"
            ),
        }
    }

    /// Details rendered as `key=value` pairs joined by commas, `-` when empty.
    fn details_field(&self) -> String {
        if self.details.is_empty() {
            return "-".to_owned();
        }
        self.details
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Builder for creating events.
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    issuer: Option<String>,
    subject: Option<String>,
    message_id: Option<String>,
    error: Option<String>,
    details: Vec<(String, String)>,
}

impl EventBuilder {
    /// Creates a new event builder.
    #[must_use]
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            outcome: EventOutcome::Success,
            issuer: None,
            subject: None,
            message_id: None,
            error: None,
            details: Vec::new(),
        }
    }

    /// Sets the outcome to success.
    #[must_use]
    pub const fn success(mut self) -> Self {
        self.outcome = EventOutcome::Success;
        self
    }

    /// Sets the outcome to failure with an error message.
    #[must_use]
    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.outcome = EventOutcome::Failure;
        self.error = Some(error.into());
        self
    }

    /// Sets the issuer.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the message ID.
    #[must_use]
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Adds a detail key-value pair.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            issuer: self.issuer,
            subject: self.subject,
            message_id: self.message_id,
            error: self.error,
            details: self.details,
        }
    }
}
