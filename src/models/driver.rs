use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::ride::GeoPoint;

/// Ephemeral record of a driver with a live websocket connection. Purely an
/// in-memory aid for dispatch visibility; never persisted. Created when the
/// driver's socket connects, removed on disconnect.
#[derive(Debug, Clone, Serialize)]
pub struct DriverPoolEntry {
    pub driver_id: Uuid,
    pub public_id: String,
    pub location: Option<GeoPoint>,
    #[serde(skip)]
    pub connection_id: Uuid,
    pub connected_at: DateTime<Utc>,
}
