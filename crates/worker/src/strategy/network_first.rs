//! Network-first: fetch, then cached copy, then offline page, then 503.

use swcache_client::FetchOptions;
use swcache_core::{Request, Response};

use super::StrategyContext;

/// Answer a navigation. `request.url` must already be canonical.
///
/// Whatever the network returns is stored and returned, error statuses
/// included; only a failed fetch falls back.
pub async fn respond(ctx: &StrategyContext, request: &Request) -> Response {
    match ctx.fetcher.fetch(request, FetchOptions::default()).await {
        Ok(response) => {
            ctx.store_copy(&request.url, &response).await;
            response
        }
        Err(e) => {
            tracing::debug!(url = %request.url, error = %e, "navigation fetch failed, falling back");

            if let Some(cached) = ctx.cached(&request.url).await {
                return cached;
            }
            if let Some(page) = ctx.offline_page().await {
                return page;
            }
            Response::offline()
        }
    }
}
