use serde::Serialize;
use uuid::Uuid;

use crate::models::ride::{Ride, RideStatus};

/// Lifecycle events pushed to every live websocket subscriber. The wire tag
/// lives in the `event` field; tag spellings are part of the client contract
/// and are kept as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum RideEvent {
    #[serde(rename = "NewRide")]
    NewRide {
        ride: Ride,
        fare: f64,
        duration_min: f64,
    },
    #[serde(rename = "rideAccepted")]
    RideAccepted { ride: Ride },
    #[serde(rename = "driverReached")]
    DriverReached { ride: Ride },
    #[serde(rename = "rideStatusUpdated")]
    RideStatusUpdated { ride_id: Uuid, status: RideStatus },
    #[serde(rename = "rideCompleted")]
    RideCompleted { ride: Ride },
    #[serde(rename = "rideCancelled")]
    RideCancelled { ride: Ride },
}

impl RideEvent {
    /// Stable label for metrics, independent of the wire tag.
    pub fn name(&self) -> &'static str {
        match self {
            RideEvent::NewRide { .. } => "new_ride",
            RideEvent::RideAccepted { .. } => "ride_accepted",
            RideEvent::DriverReached { .. } => "driver_reached",
            RideEvent::RideStatusUpdated { .. } => "ride_status_updated",
            RideEvent::RideCompleted { .. } => "ride_completed",
            RideEvent::RideCancelled { .. } => "ride_cancelled",
        }
    }
}
