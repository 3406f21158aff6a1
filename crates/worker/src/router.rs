//! Request classification and dispatch.

use serde::Serialize;
use swcache_client::canonicalize;
use swcache_core::{Request, Response};

use crate::strategy::{StrategyContext, cache_first, network_first};

const HTML_MEDIA_TYPE: &str = "text/html";

/// How an intercepted request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Document load: network-first.
    Navigation,
    /// Everything else fetched with GET: cache-first.
    Asset,
    /// Not intercepted; the host handles it normally.
    Ignored,
}

pub fn classify(request: &Request) -> RouteKind {
    if !request.is_get() {
        return RouteKind::Ignored;
    }

    let wants_html = request
        .header("accept")
        .is_some_and(|accept| accept.contains(HTML_MEDIA_TYPE));

    if request.navigate || wants_html { RouteKind::Navigation } else { RouteKind::Asset }
}

/// Routes requests against the current generation.
#[derive(Clone)]
pub struct Router {
    ctx: StrategyContext,
}

impl Router {
    pub fn new(ctx: StrategyContext) -> Self {
        Self { ctx }
    }

    /// `None` means the request is not intercepted.
    pub async fn handle(&self, request: &Request) -> Option<Response> {
        let kind = classify(request);
        if kind == RouteKind::Ignored {
            return None;
        }

        let url = match canonicalize(&request.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "not intercepting unroutable request");
                return None;
            }
        };
        let request = request.with_url(url.as_str());

        let response = match kind {
            RouteKind::Navigation => network_first::respond(&self.ctx, &request).await,
            RouteKind::Asset => cache_first::respond(&self.ctx, &request).await,
            RouteKind::Ignored => return None,
        };

        tracing::debug!(url = %request.url, ?kind, status = response.status, "request handled");
        Some(response)
    }
}
