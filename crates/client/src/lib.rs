//! Client code for swcache.
//!
//! This crate provides the network fetch capability the worker wraps, and the
//! URL normalization shared by fetches and cache keys.

pub mod fetch;

pub use fetch::{FetchConfig, FetchOptions, Fetcher, HttpFetcher, UrlError, canonicalize, resolve};
