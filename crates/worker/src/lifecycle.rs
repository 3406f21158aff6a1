//! Install and activate phases.
//!
//! Both phases are best-effort: individual URLs and namespaces fail on their
//! own, and neither phase ever returns an error to the host.

use std::sync::Arc;

use serde::Serialize;
use swcache_client::{FetchOptions, Fetcher};
use swcache_core::{CacheGeneration, CacheHandle, CacheStore, Error, Request, settle_all};

use crate::host::HostControl;
use crate::manifest::{self, Resolution};
use crate::settings::WorkerSettings;

/// Summary of an install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    #[serde(serialize_with = "generation_name")]
    pub generation: CacheGeneration,
    pub manifest_source: Option<String>,
    pub attempted: usize,
    pub cached: usize,
    pub failed: usize,
}

/// Summary of an activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    #[serde(serialize_with = "generation_name")]
    pub generation: CacheGeneration,
    pub deleted: Vec<String>,
    pub failed: usize,
}

fn generation_name<S: serde::Serializer>(generation: &CacheGeneration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(generation.name())
}

/// Resolve the manifest and populate the new generation.
pub async fn install(
    store: Arc<dyn CacheStore>, fetcher: &dyn Fetcher, settings: &WorkerSettings, host: &dyn HostControl,
) -> InstallReport {
    host.skip_waiting();

    let Resolution { generation, precache, manifest_source } = manifest::resolve(fetcher, settings).await;
    let attempted = precache.len();

    let cache = match CacheHandle::open(store, generation.name()).await {
        Ok(cache) => cache,
        Err(e) => {
            tracing::warn!(generation = %generation, error = %e, "failed to open cache, nothing precached");
            return InstallReport { generation, manifest_source, attempted, cached: 0, failed: attempted };
        }
    };

    let settled = settle_all(precache.iter().map(|path| precache_one(&cache, fetcher, settings, path))).await;

    tracing::info!(
        generation = %generation,
        cached = settled.fulfilled.len(),
        failed = settled.rejected,
        "install complete"
    );

    InstallReport { generation, manifest_source, attempted, cached: settled.fulfilled.len(), failed: settled.rejected }
}

async fn precache_one(cache: &CacheHandle, fetcher: &dyn Fetcher, settings: &WorkerSettings, path: &str) -> Result<(), Error> {
    let url = settings.absolute(path)?;
    let response = fetcher.fetch(&Request::get(url.as_str()), FetchOptions::no_cache()).await?;

    if !response.is_success() {
        return Err(Error::HttpError(format!("{}: status {}", url, response.status)));
    }

    cache.put(url.as_str(), &response).await
}

/// Delete every namespace that is not `generation`, then claim clients.
pub async fn activate(store: &dyn CacheStore, generation: &CacheGeneration, host: &dyn HostControl) -> ActivationReport {
    let names = match store.keys().await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!(error = %e, "failed to list cache namespaces, skipping cleanup");
            Vec::new()
        }
    };

    let stale = names.into_iter().filter(|name| !generation.owns(name));
    let settled = settle_all(stale.map(|name| async move {
        match store.delete(&name).await {
            Ok(true) => Ok(Some(name)),
            Ok(false) => Ok(None),
            Err(e) => {
                tracing::debug!(namespace = %name, "failed to delete stale cache");
                Err(e)
            }
        }
    }))
    .await;

    let deleted: Vec<String> = settled.fulfilled.into_iter().flatten().collect();

    host.clients_claim();

    tracing::info!(generation = %generation, deleted = deleted.len(), failed = settled.rejected, "activation complete");

    ActivationReport { generation: generation.clone(), deleted, failed: settled.rejected }
}
