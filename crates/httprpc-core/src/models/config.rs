//! Client configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Per-request HTTP timeout used when nothing else is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    pub version: String,
    pub url: String,
    pub timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
    pub log_level: String,
}

/// Caller-supplied HTTP basic credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl ClientConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Error::Validation("URL cannot be empty".to_string()));
        }

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Validation(format!(
                "URL '{}' must use the http or https scheme",
                url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        const MAX_TIMEOUT: u64 = 3600; // 1 hour
        if self.timeout_secs > MAX_TIMEOUT {
            return Err(Error::Validation(format!(
                "Timeout too long (max {} seconds)",
                MAX_TIMEOUT
            )));
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(Error::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if let Some(ref auth) = self.auth {
            auth.validate()?;
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            url: "http://127.0.0.1:8332/".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            auth: None,
            log_level: "warn".to_string(),
        }
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(Error::Validation("Username cannot be empty".to_string()));
        }

        if self.username.contains(':') {
            return Err(Error::Validation(
                "Username cannot contain ':'".to_string(),
            ));
        }

        Ok(())
    }
}
