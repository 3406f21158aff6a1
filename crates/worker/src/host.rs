//! Control triggers the worker invokes on its host.

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// Host lifecycle controls.
pub trait HostControl: Send + Sync {
    /// Activate the newly installed version without waiting for old clients.
    fn skip_waiting(&self);

    /// Take control of already-open clients.
    fn clients_claim(&self);
}

/// A trigger as reported to an out-of-process host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    SkipWaiting,
    ClientsClaim,
}

/// Forwards triggers over a channel; the host bridge drains it after each event.
#[derive(Debug, Clone)]
pub struct ChannelHost {
    tx: UnboundedSender<Trigger>,
}

impl ChannelHost {
    pub fn new(tx: UnboundedSender<Trigger>) -> Self {
        Self { tx }
    }

    fn send(&self, trigger: Trigger) {
        if self.tx.send(trigger).is_err() {
            tracing::debug!(?trigger, "host channel closed, trigger dropped");
        }
    }
}

impl HostControl for ChannelHost {
    fn skip_waiting(&self) {
        self.send(Trigger::SkipWaiting);
    }

    fn clients_claim(&self) {
        self.send(Trigger::ClientsClaim);
    }
}
