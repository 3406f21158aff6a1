//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
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

/// Store path that selects the in-memory store instead of SQLite.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWCACHE_*)
/// 2. TOML config file (if SWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the worker is scoped to; relative precache paths resolve against it.
    ///
    /// Set via SWCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Prefix of every cache generation name (`{prefix}-{token}`).
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Generation token used when no manifest supplies `generated_at`.
    #[serde(default = "default_version")]
    pub default_version: String,

    /// Well-known manifest locations, tried in order.
    #[serde(default = "default_manifest_paths")]
    pub manifest_paths: Vec<String>,

    /// Offline fallback pages for navigations, tried in order.
    #[serde(default = "default_offline_paths")]
    pub offline_paths: Vec<String>,

    /// Embedded precache list used when no usable manifest is found.
    #[serde(default = "default_precache_urls")]
    pub precache_urls: Vec<String>,

    /// Control-channel command that triggers immediate activation.
    #[serde(default = "default_skip_waiting_token")]
    pub skip_waiting_token: String,

    /// Path to SQLite cache database, or `:memory:`.
    ///
    /// Set via SWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SWCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Optional HTTP request timeout in milliseconds. Unset means no timeout.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_cache_prefix() -> String {
    "mindful".into()
}

fn default_version() -> String {
    "v1".into()
}

fn default_manifest_paths() -> Vec<String> {
    vec!["/precache-manifest.json".into(), "/web/precache-manifest.json".into()]
}

fn default_offline_paths() -> Vec<String> {
    vec!["/offline.html".into(), "/web/offline.html".into()]
}

fn default_precache_urls() -> Vec<String> {
    [
        "/",
        "/assets/logo.png",
        "/offline.html",
        "/web/icons/log1024.png",
        "/web/icons/log192.png",
        "/web/icons/log512.png",
        "/web/index.html",
        "/web/manifest.json",
        "/web/offline.html",
        "/web/service_worker.js",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_skip_waiting_token() -> String {
    "SKIP_WAITING".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

fn default_user_agent() -> String {
    "swcache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_prefix: default_cache_prefix(),
            default_version: default_version(),
            manifest_paths: default_manifest_paths(),
            offline_paths: default_offline_paths(),
            precache_urls: default_precache_urls(),
            skip_waiting_token: default_skip_waiting_token(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
            timeout_ms: None,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Whether the in-memory store was requested instead of SQLite.
    pub fn uses_memory_store(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY_DB
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SWCACHE_`
    /// 2. TOML file from `SWCACHE_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.origin, "http://localhost:8080");
        assert_eq!(config.cache_prefix, "mindful");
        assert_eq!(config.default_version, "v1");
        assert_eq!(config.manifest_paths, vec!["/precache-manifest.json", "/web/precache-manifest.json"]);
        assert_eq!(config.offline_paths, vec!["/offline.html", "/web/offline.html"]);
        assert_eq!(config.precache_urls.len(), 10);
        assert_eq!(config.precache_urls[0], "/");
        assert_eq!(config.skip_waiting_token, "SKIP_WAITING");
        assert_eq!(config.db_path, PathBuf::from("./swcache.sqlite"));
        assert_eq!(config.user_agent, "swcache/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert!(config.timeout_ms.is_none());
    }

    #[test]
    fn test_timeout_duration() {
        assert_eq!(AppConfig::default().timeout(), None);
        let config = AppConfig { timeout_ms: Some(2_500), ..Default::default() };
        assert_eq!(config.timeout(), Some(Duration::from_millis(2_500)));
    }

    #[test]
    fn test_memory_store_selection() {
        assert!(!AppConfig::default().uses_memory_store());
        let config = AppConfig { db_path: PathBuf::from(IN_MEMORY_DB), ..Default::default() };
        assert!(config.uses_memory_store());
    }

    #[test]
    fn test_load_layers_file_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("swcache.toml", "cache_prefix = \"notes\"\ndefault_version = \"v7\"")?;
            jail.set_env("SWCACHE_CONFIG_FILE", "swcache.toml");
            jail.set_env("SWCACHE_DEFAULT_VERSION", "v9");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.cache_prefix, "notes");
            assert_eq!(config.default_version, "v9");
            assert_eq!(config.origin, "http://localhost:8080");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SWCACHE_MAX_BYTES", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
