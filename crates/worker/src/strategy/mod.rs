//! Response strategies.
//!
//! - [`network_first`]: navigations; freshest content when online
//! - [`cache_first`]: static assets; network only on a cache miss
//!
//! Both read and write only the current generation. Cache failures are
//! treated as misses and store failures never change the response.

pub mod cache_first;
pub mod network_first;

use std::sync::Arc;

use swcache_client::Fetcher;
use swcache_core::{CacheHandle, CacheStore, Response};

/// Everything a strategy needs to answer one request.
#[derive(Clone)]
pub struct StrategyContext {
    /// Current generation.
    pub cache: CacheHandle,
    /// Whole store, for the offline fallback lookup.
    pub store: Arc<dyn CacheStore>,
    pub fetcher: Arc<dyn Fetcher>,
    /// Absolute offline page URLs, in lookup order.
    pub offline_urls: Vec<String>,
}

impl StrategyContext {
    async fn cached(&self, url: &str) -> Option<Response> {
        match self.cache.get(url).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::debug!(url, error = %e, "cache read failed, treating as miss");
                None
            }
        }
    }

    async fn store_copy(&self, url: &str, response: &Response) {
        if let Err(e) = self.cache.put(url, response).await {
            tracing::debug!(url, error = %e, "failed to store response copy");
        }
    }

    async fn offline_page(&self) -> Option<Response> {
        for url in &self.offline_urls {
            match self.store.match_any(url).await {
                Ok(Some(page)) => return Some(page),
                Ok(None) => {}
                Err(e) => tracing::debug!(url = %url, error = %e, "offline page lookup failed"),
            }
        }
        None
    }
}
