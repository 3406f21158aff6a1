//! Cache generations: the versioned namespaces responses are stored under.

use std::fmt;

/// A versioned cache namespace.
///
/// Built once per install from the resolved version token and never mutated;
/// a new install produces a new value instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheGeneration {
    token: String,
    name: String,
}

impl CacheGeneration {
    pub fn new(prefix: &str, token: impl Into<String>) -> Self {
        let token = token.into();
        let name = format!("{prefix}-{token}");
        Self { token, name }
    }

    /// The version token (default version or manifest `generated_at`).
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The namespace name in the cache store.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a store namespace belongs to this generation.
    pub fn owns(&self, namespace: &str) -> bool {
        self.name == namespace
    }
}

impl fmt::Display for CacheGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
