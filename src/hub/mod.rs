use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::event::RideEvent;

/// The live-subscriber registry. Every connected rider and driver socket
/// registers a sender here; lifecycle events fan out to all of them.
///
/// Delivery is best-effort: no retry, no queueing, no acknowledgment. A
/// subscriber whose buffer is full or whose socket closed mid-send just
/// misses the event and reconciles through the status endpoint after
/// reconnecting.
pub struct NotificationHub {
    connections: DashMap<Uuid, mpsc::Sender<String>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Idempotent: re-registering a connection id replaces its sender.
    pub fn subscribe(&self, connection_id: Uuid, tx: mpsc::Sender<String>) {
        self.connections.insert(connection_id, tx);
    }

    /// No-op when the connection is already gone.
    pub fn unsubscribe(&self, connection_id: Uuid) {
        self.connections.remove(&connection_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.connections.len()
    }

    /// Serializes once and fans out to every registered connection. Send
    /// failures are skipped; the publisher never sees them.
    pub fn publish(&self, event: &RideEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, event = event.name(), "failed to serialize ride event");
                return;
            }
        };

        self.fan_out(None, &payload);
    }

    /// Echo behavior of the realtime channel: an inbound frame is forwarded
    /// verbatim to every connection except its origin.
    pub fn relay(&self, origin: Uuid, payload: &str) {
        self.fan_out(Some(origin), payload);
    }

    fn fan_out(&self, skip: Option<Uuid>, payload: &str) {
        // Snapshot first so subscribe/unsubscribe during the send loop can't
        // disturb iteration; a connection removed before this point gets
        // nothing.
        let targets: Vec<(Uuid, mpsc::Sender<String>)> = self
            .connections
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        for (connection_id, tx) in targets {
            if Some(connection_id) == skip {
                continue;
            }
            if tx.try_send(payload.to_string()).is_err() {
                debug!(%connection_id, "skipping slow or closed subscriber");
            }
        }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}
