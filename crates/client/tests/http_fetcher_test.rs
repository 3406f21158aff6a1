use std::net::SocketAddr;

use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::net::TcpListener;

use swcache_client::{FetchConfig, FetchOptions, Fetcher, HttpFetcher};
use swcache_core::{Error, Request};

async fn page() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html")], "<h1>notes</h1>")
}

async fn missing() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nope")
}

async fn echo_cache_control(headers: HeaderMap) -> String {
    headers
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none")
        .to_string()
}

async fn echo_accept(headers: HeaderMap) -> String {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none")
        .to_string()
}

async fn large() -> Vec<u8> {
    vec![b'x'; 4096]
}

async fn start_server() -> SocketAddr {
    let app = Router::new()
        .route("/page", get(page))
        .route("/missing", get(missing))
        .route("/cache-control", get(echo_cache_control))
        .route("/accept", get(echo_accept))
        .route("/large", get(large));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{addr}{path}")
}

#[tokio::test]
async fn fetch_returns_status_headers_and_body() {
    let addr = start_server().await;
    let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();

    let response = fetcher
        .fetch(&Request::get(url(addr, "/page")), FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.status_text, "OK");
    assert_eq!(response.header("content-type"), Some("text/html"));
    assert_eq!(&response.body[..], b"<h1>notes</h1>");
}

#[tokio::test]
async fn non_success_status_is_not_an_error() {
    let addr = start_server().await;
    let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();

    let response = fetcher
        .fetch(&Request::get(url(addr, "/missing")), FetchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
}

#[tokio::test]
async fn bypass_cache_sends_no_cache() {
    let addr = start_server().await;
    let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
    let request = Request::get(url(addr, "/cache-control"));

    let plain = fetcher.fetch(&request, FetchOptions::default()).await.unwrap();
    assert_eq!(&plain.body[..], b"none");

    let bypass = fetcher.fetch(&request, FetchOptions::no_cache()).await.unwrap();
    assert_eq!(&bypass.body[..], b"no-cache");
}

#[tokio::test]
async fn request_headers_are_forwarded() {
    let addr = start_server().await;
    let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
    let request = Request::navigation(url(addr, "/accept")).with_header("accept", "text/html");

    let response = fetcher.fetch(&request, FetchOptions::default()).await.unwrap();
    assert_eq!(&response.body[..], b"text/html");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let addr = start_server().await;
    let fetcher = HttpFetcher::new(FetchConfig { max_bytes: 1024, ..Default::default() }).unwrap();

    let result = fetcher
        .fetch(&Request::get(url(addr, "/large")), FetchOptions::default())
        .await;
    assert!(matches!(result, Err(Error::FetchTooLarge(_))));
}

#[tokio::test]
async fn connection_refused_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = HttpFetcher::new(FetchConfig::default()).unwrap();
    let result = fetcher
        .fetch(&Request::get(url(addr, "/page")), FetchOptions::default())
        .await;
    assert!(matches!(result, Err(Error::Network(_))));
}
