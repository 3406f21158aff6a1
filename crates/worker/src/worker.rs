//! The worker, typed by lifecycle phase.
//!
//! A [`Router`] only exists inside an [`ActiveWorker`], and an `ActiveWorker`
//! can only be obtained by activating an [`InstalledWorker`]. Requests
//! therefore can never be routed against a generation that is still being
//! populated.

use std::sync::Arc;

use serde_json::Value;
use swcache_client::Fetcher;
use swcache_core::{CacheGeneration, CacheHandle, CacheStore, Request, Response};

use crate::control;
use crate::host::HostControl;
use crate::lifecycle::{self, ActivationReport, InstallReport};
use crate::router::Router;
use crate::settings::WorkerSettings;
use crate::strategy::StrategyContext;

/// Capabilities and settings shared by every phase.
#[derive(Clone)]
pub struct ServiceWorker {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    settings: Arc<WorkerSettings>,
    host: Arc<dyn HostControl>,
}

impl ServiceWorker {
    pub fn new(
        store: Arc<dyn CacheStore>, fetcher: Arc<dyn Fetcher>, settings: WorkerSettings, host: Arc<dyn HostControl>,
    ) -> Self {
        Self { store, fetcher, settings: Arc::new(settings), host }
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    /// Install event: resolve the generation and precache it.
    pub async fn install(&self) -> InstalledWorker {
        let report = lifecycle::install(self.store.clone(), self.fetcher.as_ref(), &self.settings, self.host.as_ref()).await;
        InstalledWorker { worker: self.clone(), report }
    }

    /// Message event. Valid in every phase.
    pub fn on_message(&self, data: &Value) -> bool {
        control::handle_message(data, &self.settings.skip_waiting_token, self.host.as_ref())
    }
}

/// Installed, not yet serving.
#[derive(Clone)]
pub struct InstalledWorker {
    worker: ServiceWorker,
    report: InstallReport,
}

impl InstalledWorker {
    pub fn generation(&self) -> &CacheGeneration {
        &self.report.generation
    }

    pub fn report(&self) -> &InstallReport {
        &self.report
    }

    pub fn worker(&self) -> &ServiceWorker {
        &self.worker
    }

    /// Activate event: drop stale generations and start routing.
    pub async fn activate(self) -> ActiveWorker {
        let generation = self.report.generation.clone();
        let worker = self.worker;
        let activation = lifecycle::activate(worker.store.as_ref(), &generation, worker.host.as_ref()).await;

        let cache = CacheHandle::new(worker.store.clone(), generation.name());

        let router = Router::new(StrategyContext {
            cache,
            store: worker.store.clone(),
            fetcher: worker.fetcher.clone(),
            offline_urls: worker.settings.offline_urls(),
        });

        ActiveWorker { worker, generation, activation, router }
    }
}

/// Activated and routing requests.
#[derive(Clone)]
pub struct ActiveWorker {
    worker: ServiceWorker,
    generation: CacheGeneration,
    activation: ActivationReport,
    router: Router,
}

impl ActiveWorker {
    pub fn generation(&self) -> &CacheGeneration {
        &self.generation
    }

    pub fn report(&self) -> &ActivationReport {
        &self.activation
    }

    pub fn worker(&self) -> &ServiceWorker {
        &self.worker
    }

    /// Fetch event. `None` means the request is left to the host.
    pub async fn on_fetch(&self, request: &Request) -> Option<Response> {
        self.router.handle(request).await
    }
}
