//! In-memory cache store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CacheStore;
use crate::Error;
use crate::model::Response;

/// Process-local store. Namespaces keep their creation order.
///
/// Uses a Vec of namespaces behind a tokio RwLock for concurrent access.
#[derive(Clone, Default)]
pub struct MemoryStore {
    namespaces: Arc<RwLock<Vec<(String, HashMap<String, Response>)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in `namespace`, or `None` if it does not exist.
    pub async fn entry_count(&self, namespace: &str) -> Option<usize> {
        let namespaces = self.namespaces.read().await;
        namespaces
            .iter()
            .find(|(name, _)| name == namespace)
            .map(|(_, entries)| entries.len())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        let mut namespaces = self.namespaces.write().await;
        if !namespaces.iter().any(|(name, _)| name == namespace) {
            namespaces.push((namespace.to_string(), HashMap::new()));
        }
        Ok(())
    }

    async fn get(&self, namespace: &str, url: &str) -> Result<Option<Response>, Error> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces
            .iter()
            .find(|(name, _)| name == namespace)
            .and_then(|(_, entries)| entries.get(url).cloned()))
    }

    async fn put(&self, namespace: &str, url: &str, response: &Response) -> Result<(), Error> {
        let mut namespaces = self.namespaces.write().await;
        let index = match namespaces.iter().position(|(name, _)| name == namespace) {
            Some(index) => index,
            None => {
                namespaces.push((namespace.to_string(), HashMap::new()));
                namespaces.len() - 1
            }
        };
        namespaces[index].1.insert(url.to_string(), response.clone());
        Ok(())
    }

    async fn match_any(&self, url: &str) -> Result<Option<Response>, Error> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces.iter().find_map(|(_, entries)| entries.get(url).cloned()))
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        let namespaces = self.namespaces.read().await;
        Ok(namespaces.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn delete(&self, namespace: &str) -> Result<bool, Error> {
        let mut namespaces = self.namespaces.write().await;
        let before = namespaces.len();
        namespaces.retain(|(name, _)| name != namespace);
        Ok(namespaces.len() != before)
    }
}
