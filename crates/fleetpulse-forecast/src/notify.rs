//! Notification dispatch seam.
//!
//! The engine only decides *whether* to alert; delivery (SMS, webhooks) is
//! an external collaborator behind the [`Notifier`] trait. Delivery failure
//! is logged and reported as `false`, never raised.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Category of an outgoing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Incident,
    BusInGarage,
    RepairCompleted,
    ForecastUpdate,
}

/// Outbound notification channel. Returns whether delivery succeeded.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str, kind: NotificationKind) -> bool;
}

/// Notifier that only logs. Used when no delivery channel is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str, kind: NotificationKind) -> bool {
        info!(?kind, %message, "notification dispatched (log only)");
        true
    }
}

/// In-memory notifier that records every message, for tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<(NotificationKind, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All dispatched notifications, in order.
    pub fn sent(&self) -> Vec<(NotificationKind, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, message: &str, kind: NotificationKind) -> bool {
        self.sent.lock().unwrap().push((kind, message.to_string()));
        true
    }
}
