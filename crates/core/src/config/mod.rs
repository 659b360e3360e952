//! Worker configuration with layered loading.
//!
//! Configuration is assembled with figment from three sources:
//!
//! 1. Environment variables (STRATA_*)
//! 2. TOML config file (if STRATA_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Worker configuration.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (STRATA_*)
/// 2. TOML config file (if STRATA_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding the cache generations.
    ///
    /// Set via STRATA_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL the precached assets are served from.
    ///
    /// Set via STRATA_ORIGIN. Required at install time; manifest paths are
    /// resolved against it.
    #[serde(default)]
    pub origin: Option<String>,

    /// Opaque deployment version identifier from the build system.
    ///
    /// Set via STRATA_VERSION. Names the current cache generation.
    #[serde(default)]
    pub version: Option<String>,

    /// Path to the JSON asset manifest written by the build system.
    ///
    /// Set via STRATA_MANIFEST_PATH.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: PathBuf,

    /// User-Agent string for install-time and forwarded requests.
    ///
    /// Set via STRATA_USER_AGENT.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes accepted per fetched response body.
    ///
    /// Set via STRATA_MAX_BYTES.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via STRATA_TIMEOUT_MS.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./strata-cache.sqlite")
}

fn default_manifest_path() -> PathBuf {
    PathBuf::from("./precache-manifest.json")
}

fn default_user_agent() -> String {
    "strata/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: None,
            version: None,
            manifest_path: default_manifest_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, a value cannot be
    /// parsed, or validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("STRATA_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("STRATA_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The origin, which deployments must always supply.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no origin is configured.
    pub fn require_origin(&self) -> Result<&str, ConfigError> {
        self.origin.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "origin".into(),
            hint: "Set STRATA_ORIGIN environment variable".into(),
        })
    }

    /// The deployment version identifier, which deployments must always supply.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no version is configured.
    pub fn require_version(&self) -> Result<&str, ConfigError> {
        self.version.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "version".into(),
            hint: "Set STRATA_VERSION environment variable".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, PathBuf::from("./strata-cache.sqlite"));
        assert_eq!(config.manifest_path, PathBuf::from("./precache-manifest.json"));
        assert_eq!(config.user_agent, "strata/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert!(config.origin.is_none());
        assert!(config.version.is_none());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_require_origin_missing() {
        let config = AppConfig::default();
        assert!(matches!(config.require_origin(), Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_version_present() {
        let config = AppConfig { version: Some("v42".into()), ..Default::default() };
        assert_eq!(config.require_version().unwrap(), "v42");
    }
}
