//! Core types and shared functionality for swcache.
//!
//! This crate provides:
//! - Request/response model and cache generations
//! - Namespaced cache stores (SQLite backend and in-memory)
//! - Precache manifest parsing
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod generation;
pub mod manifest;
pub mod model;
pub mod settle;

pub use cache::{CacheHandle, CacheStore, MemoryStore, SqliteStore};
pub use config::AppConfig;
pub use error::Error;
pub use generation::CacheGeneration;
pub use manifest::PrecacheManifest;
pub use model::{Request, Response};
pub use settle::{Settlement, settle_all};
