use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Lifecycle states of a ride. `Requested` is initial; `Completed` and
/// `Cancelled` are terminal. Valid edges are encoded in
/// [`RideStatus::can_advance_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideStatus {
    Requested,
    Accepted,
    DriverReached,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RideStatus::Completed | RideStatus::Cancelled)
    }

    /// The transition table. Every status mutation in the system goes through
    /// this check; there are no backward edges.
    pub fn can_advance_to(self, next: RideStatus) -> bool {
        use RideStatus::*;

        matches!(
            (self, next),
            (Requested, Accepted)
                | (Accepted, DriverReached)
                | (DriverReached, Completed)
                | (Requested, Cancelled)
                | (Accepted, Cancelled)
                | (DriverReached, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub rider_id: Uuid,
    /// None while `Requested`, set on accept and immutable afterwards.
    pub driver_id: Option<Uuid>,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub fare: f64,
    pub distance_km: f64,
    pub duration_min: f64,
    pub status: RideStatus,
    /// Driver-supplied ETA in minutes, recorded on accept.
    pub time_to_reach_min: Option<f64>,
    pub created_at: DateTime<Utc>,
    /// Bumped on every transition; drives "most recent ride" queries.
    pub updated_at: DateTime<Utc>,
}
