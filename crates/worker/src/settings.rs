//! Worker settings derived from [`AppConfig`].

use swcache_client::resolve;
use swcache_core::{AppConfig, CacheGeneration, Error};
use url::Url;

/// Immutable settings shared by every phase of the worker.
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub origin: Url,
    pub cache_prefix: String,
    pub default_version: String,
    pub manifest_paths: Vec<String>,
    pub offline_paths: Vec<String>,
    pub precache_urls: Vec<String>,
    pub skip_waiting_token: String,
}

impl WorkerSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {}", config.origin, e)))?;

        Ok(Self {
            origin,
            cache_prefix: config.cache_prefix.clone(),
            default_version: config.default_version.clone(),
            manifest_paths: config.manifest_paths.clone(),
            offline_paths: config.offline_paths.clone(),
            precache_urls: config.precache_urls.clone(),
            skip_waiting_token: config.skip_waiting_token.clone(),
        })
    }

    /// Generation used when no manifest names one.
    pub fn default_generation(&self) -> CacheGeneration {
        CacheGeneration::new(&self.cache_prefix, self.default_version.clone())
    }

    pub fn generation(&self, token: impl Into<String>) -> CacheGeneration {
        CacheGeneration::new(&self.cache_prefix, token)
    }

    /// Resolve an origin-relative path to the absolute URL used as cache key.
    pub fn absolute(&self, path: &str) -> Result<Url, Error> {
        resolve(&self.origin, path).map_err(|e| Error::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Offline fallback pages as absolute URLs, in lookup order.
    pub fn offline_urls(&self) -> Vec<String> {
        self.offline_paths
            .iter()
            .filter_map(|path| match self.absolute(path) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unusable offline page");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let settings = WorkerSettings::from_config(&AppConfig::default()).unwrap();
        assert_eq!(settings.origin.as_str(), "http://localhost:8080/");
        assert_eq!(settings.default_generation().name(), "mindful-v1");
        assert_eq!(
            settings.offline_urls(),
            vec!["http://localhost:8080/offline.html", "http://localhost:8080/web/offline.html"]
        );
    }

    #[test]
    fn test_invalid_origin() {
        let config = AppConfig { origin: "::".into(), ..Default::default() };
        assert!(matches!(WorkerSettings::from_config(&config), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_absolute() {
        let settings = WorkerSettings::from_config(&AppConfig::default()).unwrap();
        assert_eq!(settings.absolute("/a.js").unwrap().as_str(), "http://localhost:8080/a.js");
    }
}
