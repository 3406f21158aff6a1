#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use swcache_client::{FetchOptions, Fetcher};
use swcache_core::{AppConfig, CacheStore, Error, MemoryStore, Request, Response};
use swcache_worker::{HostControl, ServiceWorker, WorkerSettings};
use tokio::sync::Notify;

pub const ORIGIN: &str = "http://localhost:8080";

pub fn url(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

pub fn settings() -> WorkerSettings {
    WorkerSettings::from_config(&AppConfig::default()).unwrap()
}

pub fn ok(body: &'static str) -> Response {
    Response::new(200, body).with_status_text("OK")
}

/// Fetcher answering from a fixed table; unknown URLs fail like a dropped
/// connection. Every call is recorded.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, Response>>,
    calls: Mutex<Vec<(String, FetchOptions)>>,
    held: Mutex<HashMap<String, Arc<Notify>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offline() -> Self {
        Self::default()
    }

    pub fn route(self, path: &str, response: Response) -> Self {
        self.serve(path, response);
        self
    }

    pub fn serve(&self, path: &str, response: Response) {
        self.routes.lock().unwrap().insert(url(path), response);
    }

    /// Fail every request from now on.
    pub fn disconnect(&self) {
        self.routes.lock().unwrap().clear();
    }

    /// Park requests for `path` until the returned handle is notified.
    pub fn hold(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.held.lock().unwrap().insert(url(path), gate.clone());
        gate
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn options_for(&self, path: &str) -> Vec<FetchOptions> {
        let target = url(path);
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| *url == target)
            .map(|(_, options)| *options)
            .collect()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &Request, options: FetchOptions) -> Result<Response, Error> {
        self.calls.lock().unwrap().push((request.url.clone(), options));
        let gate = self.held.lock().unwrap().get(&request.url).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.routes
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .ok_or_else(|| Error::Network(format!("{}: connection refused", request.url)))
    }
}

/// Memory store whose writes and deletes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_puts: std::sync::atomic::AtomicBool,
    undeletable: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn undeletable(&self, namespace: &str) {
        self.undeletable.lock().unwrap().insert(namespace.to_string());
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        self.inner.open(namespace).await
    }

    async fn get(&self, namespace: &str, url: &str) -> Result<Option<Response>, Error> {
        self.inner.get(namespace, url).await
    }

    async fn put(&self, namespace: &str, url: &str, response: &Response) -> Result<(), Error> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Error::Storage("quota exceeded".into()));
        }
        self.inner.put(namespace, url, response).await
    }

    async fn match_any(&self, url: &str) -> Result<Option<Response>, Error> {
        self.inner.match_any(url).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.inner.keys().await
    }

    async fn delete(&self, namespace: &str) -> Result<bool, Error> {
        if self.undeletable.lock().unwrap().contains(namespace) {
            return Err(Error::Storage(format!("{namespace} is locked")));
        }
        self.inner.delete(namespace).await
    }
}

#[derive(Default)]
pub struct RecordingHost {
    pub skips: AtomicUsize,
    pub claims: AtomicUsize,
}

impl RecordingHost {
    pub fn skips(&self) -> usize {
        self.skips.load(Ordering::SeqCst)
    }

    pub fn claims(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }
}

impl HostControl for RecordingHost {
    fn skip_waiting(&self) {
        self.skips.fetch_add(1, Ordering::SeqCst);
    }

    fn clients_claim(&self) {
        self.claims.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub store: Arc<FlakyStore>,
    pub fetcher: Arc<ScriptedFetcher>,
    pub host: Arc<RecordingHost>,
    pub worker: ServiceWorker,
}

impl Harness {
    pub fn new(fetcher: ScriptedFetcher) -> Self {
        Self::with_settings(fetcher, settings())
    }

    pub fn with_settings(fetcher: ScriptedFetcher, settings: WorkerSettings) -> Self {
        let store = Arc::new(FlakyStore::new());
        let fetcher = Arc::new(fetcher);
        let host = Arc::new(RecordingHost::default());
        let worker = ServiceWorker::new(store.clone(), fetcher.clone(), settings, host.clone());
        Self { store, fetcher, host, worker }
    }
}
