//! Namespaced response cache.
//!
//! A store holds any number of named namespaces (one per cache generation),
//! each mapping a request URL to a stored response. Two backends are provided:
//!
//! - [`SqliteStore`]: persistent, async access via tokio-rusqlite, WAL mode
//! - [`MemoryStore`]: process-local, used for tests and ephemeral workers

pub mod connection;
pub mod entries;
pub mod hash;
pub mod memory;
pub mod migrations;

use std::sync::Arc;

use async_trait::async_trait;

pub use crate::Error;
use crate::model::Response;

pub use connection::SqliteStore;
pub use memory::MemoryStore;

/// Host-provided key/value byte store, addressed by namespace name.
///
/// Keys are absolute request URLs; callers canonicalize them first.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the namespace if it does not exist yet.
    async fn open(&self, namespace: &str) -> Result<(), Error>;

    async fn get(&self, namespace: &str, url: &str) -> Result<Option<Response>, Error>;

    /// Insert or overwrite. Creates the namespace when missing.
    async fn put(&self, namespace: &str, url: &str, response: &Response) -> Result<(), Error>;

    /// Look `url` up in every namespace, oldest namespace first.
    async fn match_any(&self, url: &str) -> Result<Option<Response>, Error>;

    /// Namespace names in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Drop a namespace and everything in it. Returns whether it existed.
    async fn delete(&self, namespace: &str) -> Result<bool, Error>;
}

/// An opened namespace.
#[derive(Clone)]
pub struct CacheHandle {
    store: Arc<dyn CacheStore>,
    namespace: String,
}

impl CacheHandle {
    /// Handle on `namespace` without touching the store. The namespace is
    /// created by the first `put`.
    pub fn new(store: Arc<dyn CacheStore>, namespace: &str) -> Self {
        Self { store, namespace: namespace.to_string() }
    }

    /// Open `namespace` on `store`, creating it if needed.
    pub async fn open(store: Arc<dyn CacheStore>, namespace: &str) -> Result<Self, Error> {
        store.open(namespace).await?;
        Ok(Self::new(store, namespace))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn get(&self, url: &str) -> Result<Option<Response>, Error> {
        self.store.get(&self.namespace, url).await
    }

    pub async fn put(&self, url: &str, response: &Response) -> Result<(), Error> {
        self.store.put(&self.namespace, url, response).await
    }
}

impl std::fmt::Debug for CacheHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheHandle").field("namespace", &self.namespace).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_scopes_to_namespace() {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let current = CacheHandle::open(store.clone(), "mindful-v2").await.unwrap();
        let stale = CacheHandle::open(store.clone(), "mindful-v1").await.unwrap();

        stale.put("http://localhost:8080/a.js", &Response::new(200, "old")).await.unwrap();

        assert_eq!(current.namespace(), "mindful-v2");
        assert!(current.get("http://localhost:8080/a.js").await.unwrap().is_none());
        assert!(stale.get("http://localhost:8080/a.js").await.unwrap().is_some());
    }
}
