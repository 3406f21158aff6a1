//! Offline-first request cache worker.
//!
//! This crate provides:
//! - Precache manifest resolution with embedded fallbacks
//! - Install (precache) and activate (stale generation cleanup) phases
//! - Request routing: network-first for navigations, cache-first for assets
//! - Control channel handling and a JSON-lines host bridge with concurrent fetches

pub mod bridge;
pub mod control;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod manifest;
pub mod router;
pub mod settings;
pub mod strategy;
pub mod transport;
pub mod worker;

pub use bridge::{Bridge, Dispatch, FetchTask, HostEvent, HostReply};
pub use error::BridgeError;
pub use host::{ChannelHost, HostControl, Trigger};
pub use lifecycle::{ActivationReport, InstallReport};
pub use router::{RouteKind, Router, classify};
pub use settings::WorkerSettings;
pub use worker::{ActiveWorker, InstalledWorker, ServiceWorker};
