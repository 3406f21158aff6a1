//! JSON-lines host bridge.
//!
//! An out-of-process host drives the worker by writing one event per line:
//!
//! ```json
//! {"event": "install"}
//! {"event": "activate"}
//! {"event": "fetch", "id": 7, "request": {"url": "http://localhost:8080/", "navigate": true}}
//! {"event": "message", "data": {"type": "SKIP_WAITING"}}
//! ```
//!
//! and reads one reply per event. Fetch replies carry the event's `id` and
//! may arrive in any order, since each fetch runs as its own task. A new
//! install while a version is active leaves the active version serving until
//! the next `activate`.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swcache_core::{Request, Response};

use crate::error::BridgeError;
use crate::host::Trigger;
use crate::lifecycle::{ActivationReport, InstallReport};
use crate::worker::{ActiveWorker, InstalledWorker, ServiceWorker};

/// Event sent by the host.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    Install,
    Activate,
    Fetch {
        /// Echoed on the reply.
        id: u64,
        request: Request,
    },
    Message {
        #[serde(default)]
        data: Value,
    },
}

/// Reply written back to the host.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum HostReply {
    Installed(InstallReport),
    Activated(ActivationReport),
    Response {
        id: u64,
        #[serde(flatten)]
        response: WireResponse,
    },
    /// Not intercepted; the host performs its default handling.
    Passthrough {
        id: u64,
    },
    Ack {
        handled: bool,
    },
    Control {
        trigger: Trigger,
    },
    Error {
        message: String,
    },
}

/// Response as written on the wire; the body is base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<Response> for WireResponse {
    fn from(response: Response) -> Self {
        Self {
            status: response.status,
            status_text: response.status_text,
            headers: response.headers,
            body: STANDARD.encode(&response.body),
        }
    }
}

impl From<BridgeError> for HostReply {
    fn from(err: BridgeError) -> Self {
        HostReply::Error { message: err.to_string() }
    }
}

/// A fetch event bound to the version that was active when it arrived.
///
/// Owns everything it needs, so it can run as a separate task while the
/// bridge keeps reading events.
pub struct FetchTask {
    id: u64,
    request: Request,
    active: Option<ActiveWorker>,
}

impl FetchTask {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn run(self) -> HostReply {
        let Some(active) = self.active else {
            tracing::debug!(url = %self.request.url, "fetch before activation, passing through");
            return HostReply::Passthrough { id: self.id };
        };

        match active.on_fetch(&self.request).await {
            Some(response) => HostReply::Response { id: self.id, response: response.into() },
            None => HostReply::Passthrough { id: self.id },
        }
    }
}

/// Outcome of dispatching one event.
pub enum Dispatch {
    /// Handled in order; the reply is ready.
    Reply(HostReply),
    /// A fetch to run alongside later events.
    Fetch(FetchTask),
}

impl Dispatch {
    /// Run a pending fetch inline and return its reply.
    pub async fn into_reply(self) -> HostReply {
        match self {
            Dispatch::Reply(reply) => reply,
            Dispatch::Fetch(task) => task.run().await,
        }
    }
}

/// Tracks which versions are installed and active.
pub struct Bridge {
    worker: ServiceWorker,
    installed: Option<InstalledWorker>,
    active: Option<ActiveWorker>,
}

impl Bridge {
    pub fn new(worker: ServiceWorker) -> Self {
        Self { worker, installed: None, active: None }
    }

    pub fn active(&self) -> Option<&ActiveWorker> {
        self.active.as_ref()
    }

    /// Parse one input line and dispatch it.
    pub async fn dispatch_line(&mut self, line: &str) -> Dispatch {
        match serde_json::from_str::<HostEvent>(line) {
            Ok(event) => self.dispatch(event).await,
            Err(e) => Dispatch::Reply(BridgeError::from(e).into()),
        }
    }

    /// Install and activate complete before this returns; they gate which
    /// version later fetches see. Fetches are handed back unstarted.
    pub async fn dispatch(&mut self, event: HostEvent) -> Dispatch {
        let reply = match event {
            HostEvent::Install => {
                let installed = self.worker.install().await;
                let report = installed.report().clone();
                self.installed = Some(installed);
                HostReply::Installed(report)
            }
            HostEvent::Activate => {
                let Some(installed) = self.installed.take() else {
                    return Dispatch::Reply(BridgeError::NotInstalled.into());
                };
                let active = installed.activate().await;
                let report = active.report().clone();
                self.active = Some(active);
                HostReply::Activated(report)
            }
            HostEvent::Fetch { id, request } => {
                return Dispatch::Fetch(FetchTask { id, request, active: self.active.clone() });
            }
            HostEvent::Message { data } => HostReply::Ack { handled: self.worker.on_message(&data) },
        };

        Dispatch::Reply(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events() {
        let event: HostEvent = serde_json::from_str(r#"{"event": "install"}"#).unwrap();
        assert!(matches!(event, HostEvent::Install));

        let event: HostEvent =
            serde_json::from_str(r#"{"event": "fetch", "id": 3, "request": {"url": "http://localhost:8080/a.js"}}"#)
                .unwrap();
        assert!(matches!(event, HostEvent::Fetch { id: 3, request } if request.is_get() && !request.navigate));

        let event: HostEvent = serde_json::from_str(r#"{"event": "message"}"#).unwrap();
        assert!(matches!(event, HostEvent::Message { data: Value::Null }));
    }

    #[test]
    fn test_fetch_requires_id() {
        assert!(
            serde_json::from_str::<HostEvent>(r#"{"event": "fetch", "request": {"url": "http://localhost:8080/"}}"#)
                .is_err()
        );
    }

    #[test]
    fn test_unknown_event_rejected() {
        assert!(serde_json::from_str::<HostEvent>(r#"{"event": "sync"}"#).is_err());
    }

    #[test]
    fn test_reply_serialization() {
        let reply = HostReply::Response { id: 9, response: Response::offline().into() };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["reply"], "response");
        assert_eq!(json["id"], 9);
        assert_eq!(json["status"], 503);
        assert_eq!(json["body"], "T2ZmbGluZQ==");

        let json = serde_json::to_value(HostReply::Control { trigger: Trigger::ClientsClaim }).unwrap();
        assert_eq!(json, serde_json::json!({"reply": "control", "trigger": "clients_claim"}));

        let json = serde_json::to_value(HostReply::Passthrough { id: 4 }).unwrap();
        assert_eq!(json, serde_json::json!({"reply": "passthrough", "id": 4}));
    }

    #[tokio::test]
    async fn test_fetch_without_active_version_passes_through() {
        let task = FetchTask { id: 5, request: Request::get("http://localhost:8080/a.js"), active: None };
        assert_eq!(task.id(), 5);

        let json = serde_json::to_value(task.run().await).unwrap();
        assert_eq!(json, serde_json::json!({"reply": "passthrough", "id": 5}));
    }
}
