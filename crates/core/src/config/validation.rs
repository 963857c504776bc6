//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `store_name_prefix` or `version_tag` is empty or contains whitespace
    /// - `origin` is not an http(s) URL
    /// - any shell URL or the offline fallback does not resolve
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    ///
    /// Returns `ConfigError::Missing` if `shell_urls` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("store_name_prefix", &self.store_name_prefix), ("version_tag", &self.version_tag)] {
            if value.is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
            if value.chars().any(char::is_whitespace) {
                return Err(invalid(field, "must not contain whitespace"));
            }
        }

        let origin = self.origin_url()?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid("origin", format!("unsupported scheme: {}", origin.scheme())));
        }

        if self.shell_urls.is_empty() {
            return Err(ConfigError::Missing {
                field: "shell_urls".into(),
                hint: "list at least the root document, e.g. SHELLCACHE_SHELL_URLS='[\"/\"]'".into(),
            });
        }
        for path in &self.shell_urls {
            self.resolve(path)?;
        }
        let fallback = self.resolve(&self.offline_fallback_url)?;

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        let fallback_in_shell = self
            .shell_urls
            .iter()
            .filter_map(|p| self.resolve(p).ok())
            .any(|u| u == fallback);
        if !fallback_in_shell {
            tracing::warn!(
                offline_fallback_url = %self.offline_fallback_url,
                "offline_fallback_url is not part of shell_urls; \
                 the offline page will only exist once it has been visited"
            );
        }

        Ok(())
    }
}
