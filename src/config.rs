use serde::{Deserialize, Serialize};

use crate::error::{BulkheadError, ErrorCode};
use crate::utils::get_env_with_prefix;

/// Main configuration for the access-control layer
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub invitations: InvitationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

/// Where the session credential is read from.
///
/// The named cookie is consulted first; an `Authorization: Bearer` header is
/// accepted as a fallback when `allow_bearer` is set.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_allow_bearer")]
    pub allow_bearer: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InvitationConfig {
    /// Days until a new or resent invitation expires.
    #[serde(default = "default_expiry_days")]
    pub expiry_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            allow_bearer: default_allow_bearer(),
        }
    }
}

impl Default for InvitationConfig {
    fn default() -> Self {
        Self {
            expiry_days: default_expiry_days(),
        }
    }
}

impl InvitationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn expiry_days(mut self, days: u32) -> Self {
        self.expiry_days = days;
        self
    }

    /// Invitation lifetime as a duration.
    #[must_use]
    pub fn expiry(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.expiry_days))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

fn default_cookie_name() -> String {
    "bulkhead_session".to_string()
}

fn default_allow_bearer() -> bool {
    true
}

fn default_expiry_days() -> u32 {
    7
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_session_cookie(mut self, name: impl Into<String>) -> Self {
        self.config.session.cookie_name = name.into();
        self
    }

    pub fn with_bearer_tokens(mut self, allowed: bool) -> Self {
        self.config.session.allow_bearer = allowed;
        self
    }

    pub fn with_invitation_expiry_days(mut self, days: u32) -> Self {
        self.config.invitations.expiry_days = days;
        self
    }

    /// Load configuration from environment variables with BULKHEAD_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }
        if let Some(name) = get_env_with_prefix("SESSION_COOKIE_NAME") {
            self.config.session.cookie_name = name;
        }
        if let Some(allow) = get_env_with_prefix("SESSION_ALLOW_BEARER") {
            if let Ok(allow) = allow.parse() {
                self.config.session.allow_bearer = allow;
            }
        }
        if let Some(days) = get_env_with_prefix("INVITATION_EXPIRY_DAYS") {
            if let Ok(days) = days.parse() {
                self.config.invitations.expiry_days = days;
            }
        }
        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown log level, an empty cookie name or a
    /// zero invitation lifetime.
    pub fn build(self) -> crate::error::Result<Config> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(BulkheadError::bad_request(
                ErrorCode::InternalError,
                format!(
                    "Invalid log level: {}. Must be one of: {}",
                    self.config.logging.level,
                    valid_log_levels.join(", ")
                ),
            ));
        }

        if self.config.session.cookie_name.trim().is_empty() {
            return Err(BulkheadError::bad_request(
                ErrorCode::InternalError,
                "Session cookie name must not be empty",
            ));
        }

        if self.config.invitations.expiry_days == 0 {
            return Err(BulkheadError::bad_request(
                ErrorCode::InternalError,
                "Invitation expiry must be at least one day",
            ));
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
