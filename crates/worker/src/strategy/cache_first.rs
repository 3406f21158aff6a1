//! Cache-first: cached copy, else network, else 504.

use swcache_client::FetchOptions;
use swcache_core::{Request, Response};

use super::StrategyContext;

/// Answer an asset request. `request.url` must already be canonical.
pub async fn respond(ctx: &StrategyContext, request: &Request) -> Response {
    if let Some(cached) = ctx.cached(&request.url).await {
        return cached;
    }

    match ctx.fetcher.fetch(request, FetchOptions::default()).await {
        Ok(response) => {
            if response.is_success() {
                ctx.store_copy(&request.url, &response).await;
            }
            response
        }
        Err(e) => {
            tracing::debug!(url = %request.url, error = %e, "asset fetch failed");
            Response::gateway_timeout()
        }
    }
}
