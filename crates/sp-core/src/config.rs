//! Service provider configuration.
//!
//! Configuration can be loaded from environment variables (with `.env`
//! support) or from a TOML document.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default acceptable clock skew between IdP and SP, in seconds.
pub const DEFAULT_CLOCK_SKEW_SECS: u64 = 300;

/// Default maximum age of an authentication event, in seconds.
pub const DEFAULT_MAXIMUM_AUTHENTICATION_LIFETIME_SECS: u64 = 3600;

/// Default number of assertion IDs kept for replay detection.
pub const DEFAULT_REPLAY_CACHE_CAPACITY: usize = 100_000;

/// Largest accepted clock skew, one day.
pub const MAX_CLOCK_SKEW_SECS: u64 = 86_400;

/// Largest accepted authentication lifetime, 365 days.
pub const MAX_AUTHENTICATION_LIFETIME_SECS: u64 = 31_536_000;

/// Service provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpConfig {
    /// Entity ID of this service provider (the expected audience).
    pub entity_id: String,

    /// Assertion consumer service URL (the expected recipient and destination).
    pub acs_url: String,

    /// Explicit assertion signing requirement.
    ///
    /// When `None`, the SP metadata's `WantAssertionsSigned` flag decides.
    #[serde(default)]
    pub want_assertions_signed: Option<bool>,

    /// Whether the Response element itself must be signed.
    #[serde(default)]
    pub want_response_signed: bool,

    /// Acceptable clock skew in seconds.
    #[serde(default = "default_clock_skew_secs")]
    pub clock_skew_secs: u64,

    /// Maximum age of the IdP authentication event in seconds.
    #[serde(default = "default_maximum_authentication_lifetime_secs")]
    pub maximum_authentication_lifetime_secs: u64,

    /// Maximum number of tracked assertion IDs.
    #[serde(default = "default_replay_cache_capacity")]
    pub replay_cache_capacity: usize,
}

const fn default_clock_skew_secs() -> u64 {
    DEFAULT_CLOCK_SKEW_SECS
}

const fn default_maximum_authentication_lifetime_secs() -> u64 {
    DEFAULT_MAXIMUM_AUTHENTICATION_LIFETIME_SECS
}

const fn default_replay_cache_capacity() -> usize {
    DEFAULT_REPLAY_CACHE_CAPACITY
}

impl SpConfig {
    /// Creates a configuration with defaults for everything but the
    /// entity ID and ACS URL.
    #[must_use]
    pub fn new(entity_id: impl Into<String>, acs_url: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            acs_url: acs_url.into(),
            want_assertions_signed: None,
            want_response_signed: false,
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
            maximum_authentication_lifetime_secs: DEFAULT_MAXIMUM_AUTHENTICATION_LIFETIME_SECS,
            replay_cache_capacity: DEFAULT_REPLAY_CACHE_CAPACITY,
        }
    }

    /// Sets the explicit assertion signing requirement.
    #[must_use]
    pub const fn with_want_assertions_signed(mut self, want: bool) -> Self {
        self.want_assertions_signed = Some(want);
        self
    }

    /// Sets whether responses must be signed.
    #[must_use]
    pub const fn with_want_response_signed(mut self, want: bool) -> Self {
        self.want_response_signed = want;
        self
    }

    /// Sets the acceptable clock skew in seconds.
    #[must_use]
    pub const fn with_clock_skew_secs(mut self, secs: u64) -> Self {
        self.clock_skew_secs = secs;
        self
    }

    /// Sets the maximum authentication lifetime in seconds.
    #[must_use]
    pub const fn with_maximum_authentication_lifetime_secs(mut self, secs: u64) -> Self {
        self.maximum_authentication_lifetime_secs = secs;
        self
    }

    /// Loads configuration from environment variables.
    ///
    /// `SP_ENTITY_ID` and `SP_ACS_URL` are required. Optional variables:
    /// `SP_WANT_ASSERTIONS_SIGNED`, `SP_WANT_RESPONSE_SIGNED`,
    /// `SP_CLOCK_SKEW_SECS`, `SP_MAX_AUTHN_LIFETIME_SECS`,
    /// `SP_REPLAY_CACHE_CAPACITY`.
    ///
    /// ## Errors
    ///
    /// Returns an error if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let entity_id = std::env::var("SP_ENTITY_ID")
            .map_err(|_| Error::Config("SP_ENTITY_ID environment variable is required".into()))?;
        let acs_url = std::env::var("SP_ACS_URL")
            .map_err(|_| Error::Config("SP_ACS_URL environment variable is required".into()))?;

        let mut config = Self::new(entity_id, acs_url);

        if let Some(want) = parse_env::<bool>("SP_WANT_ASSERTIONS_SIGNED")? {
            config.want_assertions_signed = Some(want);
        }
        if let Some(want) = parse_env::<bool>("SP_WANT_RESPONSE_SIGNED")? {
            config.want_response_signed = want;
        }
        if let Some(skew) = parse_env::<u64>("SP_CLOCK_SKEW_SECS")? {
            config.clock_skew_secs = skew;
        }
        if let Some(lifetime) = parse_env::<u64>("SP_MAX_AUTHN_LIFETIME_SECS")? {
            config.maximum_authentication_lifetime_secs = lifetime;
        }
        if let Some(capacity) = parse_env::<usize>("SP_REPLAY_CACHE_CAPACITY")? {
            config.replay_cache_capacity = capacity;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML document.
    ///
    /// ## Errors
    ///
    /// Returns an error if the document is malformed or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Checks that the required values are present.
    ///
    /// ## Errors
    ///
    /// Returns an error if the entity ID or ACS URL is empty, the replay
    /// cache has no capacity, or a duration exceeds its upper bound.
    pub fn validate(&self) -> Result<()> {
        if self.entity_id.trim().is_empty() {
            return Err(Error::Validation("entity_id must not be empty".into()));
        }
        if self.acs_url.trim().is_empty() {
            return Err(Error::Validation("acs_url must not be empty".into()));
        }
        if self.replay_cache_capacity == 0 {
            return Err(Error::Validation(
                "replay_cache_capacity must be greater than zero".into(),
            ));
        }
        if self.clock_skew_secs > MAX_CLOCK_SKEW_SECS {
            return Err(Error::Validation(format!(
                "clock_skew_secs must not exceed {MAX_CLOCK_SKEW_SECS}"
            )));
        }
        if self.maximum_authentication_lifetime_secs > MAX_AUTHENTICATION_LIFETIME_SECS {
            return Err(Error::Validation(format!(
                "maximum_authentication_lifetime_secs must not exceed {MAX_AUTHENTICATION_LIFETIME_SECS}"
            )));
        }
        Ok(())
    }

    /// Returns the clock skew as a duration.
    #[must_use]
    pub const fn clock_skew(&self) -> Duration {
        Duration::from_secs(self.clock_skew_secs)
    }

    /// Returns the maximum authentication lifetime as a duration.
    #[must_use]
    pub const fn maximum_authentication_lifetime(&self) -> Duration {
        Duration::from_secs(self.maximum_authentication_lifetime_secs)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(None),
    }
}
