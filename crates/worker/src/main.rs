//! swcache worker entry point.
//!
//! Runs the worker behind the JSON-lines host bridge on stdio.
//! Logging goes to stderr to avoid interfering with the protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use swcache_client::{FetchConfig, HttpFetcher};
use swcache_core::{AppConfig, CacheStore, MemoryStore, SqliteStore};
use swcache_worker::{Bridge, ChannelHost, ServiceWorker, WorkerSettings, transport};
use tokio::io::BufReader;
use tokio::task::LocalSet;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    let store: Arc<dyn CacheStore> = if config.uses_memory_store() {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(SqliteStore::open(&config.db_path).await?)
    };
    let fetcher = Arc::new(HttpFetcher::new(FetchConfig::from(&config))?);
    let settings = WorkerSettings::from_config(&config)?;

    let (tx, triggers) = tokio::sync::mpsc::unbounded_channel();
    let worker = ServiceWorker::new(store, fetcher, settings, Arc::new(ChannelHost::new(tx)));
    let bridge = Bridge::new(worker);

    tracing::info!(origin = %config.origin, "Starting swcache worker on stdio");

    let input = BufReader::new(tokio::io::stdin());
    LocalSet::new()
        .run_until(transport::serve(bridge, input, tokio::io::stdout(), triggers))
        .await?;

    tracing::info!("stdin closed, shutting down");

    Ok(())
}
