//! Precache manifest resolution.
//!
//! Tries each configured manifest location in order and falls back to the
//! embedded precache list and default version. Resolution cannot fail.

use swcache_client::{FetchOptions, Fetcher};
use swcache_core::{CacheGeneration, Error, PrecacheManifest, Request};

use crate::settings::WorkerSettings;

/// What to precache, and under which generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub generation: CacheGeneration,
    /// Origin-relative or absolute URLs, as listed. Never empty.
    pub precache: Vec<String>,
    /// Location the manifest was read from, if any.
    pub manifest_source: Option<String>,
}

/// Resolve the generation and precache list for this install.
pub async fn resolve(fetcher: &dyn Fetcher, settings: &WorkerSettings) -> Resolution {
    let mut found = None;

    for path in &settings.manifest_paths {
        match fetch_manifest(fetcher, settings, path).await {
            Ok(manifest) => {
                found = Some((path.clone(), manifest));
                break;
            }
            Err(e) => tracing::debug!(path = %path, error = %e, "precache manifest unavailable"),
        }
    }

    let Some((source, manifest)) = found else {
        tracing::info!("no precache manifest found, using embedded precache list");
        return Resolution {
            generation: settings.default_generation(),
            precache: settings.precache_urls.clone(),
            manifest_source: None,
        };
    };

    let generation = match manifest.version_token() {
        Some(token) => settings.generation(token),
        None => settings.default_generation(),
    };

    let precache = match manifest.precache_urls() {
        Some(urls) => urls.to_vec(),
        None => {
            tracing::warn!(source = %source, "manifest has no precache entries, using embedded precache list");
            settings.precache_urls.clone()
        }
    };

    tracing::info!(source = %source, generation = %generation, urls = precache.len(), "resolved precache manifest");

    Resolution { generation, precache, manifest_source: Some(source) }
}

async fn fetch_manifest(fetcher: &dyn Fetcher, settings: &WorkerSettings, path: &str) -> Result<PrecacheManifest, Error> {
    let url = settings.absolute(path)?;
    let response = fetcher.fetch(&Request::get(url.as_str()), FetchOptions::no_cache()).await?;

    if !response.is_success() {
        return Err(Error::HttpError(format!("status {}", response.status)));
    }

    PrecacheManifest::parse(&response.body)
}
