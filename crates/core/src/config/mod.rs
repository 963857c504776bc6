//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHELLCACHE_*)
//! 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::strategy::{DocumentPolicy, FallbackMode};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHELLCACHE_*)
/// 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Prefix shared by every store this worker has ever created.
    #[serde(default = "default_store_name_prefix")]
    pub store_name_prefix: String,

    /// Version tag of the current deployment.
    ///
    /// Set via SHELLCACHE_VERSION_TAG environment variable.
    #[serde(default = "default_version_tag")]
    pub version_tag: String,

    /// Site origin. Responses from any other origin are never persisted.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// App-shell URLs pre-populated at install, relative to `origin`.
    #[serde(default = "default_shell_urls")]
    pub shell_urls: Vec<String>,

    /// Store entry served when a document cannot be fetched.
    #[serde(default = "default_offline_fallback_url")]
    pub offline_fallback_url: String,

    /// Policy applied to document requests.
    #[serde(default)]
    pub document_policy: DocumentPolicy,

    /// How network failures are substituted.
    #[serde(default)]
    pub fallback_mode: FallbackMode,

    /// URL schemes never intercepted.
    #[serde(default = "default_disallowed_schemes")]
    pub disallowed_schemes: Vec<String>,

    /// Sync tag that triggers the injected sync task.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// Path to SQLite cache database.
    ///
    /// Set via SHELLCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Let write-backs finish in the background instead of awaiting them.
    #[serde(default = "default_true")]
    pub background_write_back: bool,
}

fn default_store_name_prefix() -> String {
    "blog-pwa".into()
}

fn default_version_tag() -> String {
    "v1".into()
}

fn default_origin() -> String {
    "https://localhost".into()
}

fn default_shell_urls() -> Vec<String> {
    vec!["/".into()]
}

fn default_offline_fallback_url() -> String {
    "/".into()
}

fn default_disallowed_schemes() -> Vec<String> {
    ["chrome-extension", "moz-extension", "safari-extension", "data", "blob"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_sync_tag() -> String {
    "background-sync".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shellcache.sqlite")
}

fn default_user_agent() -> String {
    "shellcache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_name_prefix: default_store_name_prefix(),
            version_tag: default_version_tag(),
            origin: default_origin(),
            shell_urls: default_shell_urls(),
            offline_fallback_url: default_offline_fallback_url(),
            document_policy: DocumentPolicy::default(),
            fallback_mode: FallbackMode::default(),
            disallowed_schemes: default_disallowed_schemes(),
            sync_tag: default_sync_tag(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            background_write_back: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Name of the store matching the current version tag.
    pub fn current_store_name(&self) -> String {
        format!("{}-{}", self.store_name_prefix, self.version_tag)
    }

    /// Parsed site origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// Resolve a shell or fallback path against the origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin or the path cannot be parsed.
    pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
        self.origin_url()?
            .join(path)
            .map_err(|e| ConfigError::Invalid { field: "url".into(), reason: format!("{path}: {e}") })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SHELLCACHE_`
    /// 2. TOML file from `SHELLCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHELLCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SHELLCACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
