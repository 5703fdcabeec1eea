//! Orchestration between the HTTP surface and the core: every client-facing
//! operation validates, runs the lifecycle transition, then broadcasts the
//! matching event. A lifecycle failure short-circuits before any broadcast.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::fare;
use crate::models::event::RideEvent;
use crate::models::ride::{GeoPoint, Ride, RideStatus};
use crate::models::user::{UserRecord, UserRole};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateRideResponse {
    pub ride: Ride,
    pub fare: f64,
    pub duration_min: f64,
}

#[derive(Debug, Serialize)]
pub struct RideStatusResponse {
    pub ride_id: Uuid,
    pub status: RideStatus,
    pub driver_id: Option<Uuid>,
}

pub fn create_ride(
    state: &AppState,
    rider_public_id: &str,
    pickup: GeoPoint,
    dropoff: GeoPoint,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<CreateRideResponse, AppError> {
    let rider = resolve(state, rider_public_id, UserRole::Rider)?;

    let duration_min = (end_time - start_time).num_seconds() as f64 / 60.0;
    if duration_min <= 0.0 {
        return Err(AppError::BadRequest(
            "end_time must be after start_time".to_string(),
        ));
    }

    let quote = fare::quote(&pickup, &dropoff, duration_min);
    let result = state
        .lifecycle
        .create(rider.id, pickup, dropoff, duration_min, &quote);
    state.metrics.record_transition("create", result.is_ok());
    let ride = result?;

    state.metrics.fare_amount.observe(ride.fare);
    publish(
        state,
        RideEvent::NewRide {
            ride: ride.clone(),
            fare: ride.fare,
            duration_min,
        },
    );

    Ok(CreateRideResponse {
        fare: ride.fare,
        duration_min,
        ride,
    })
}

pub fn accept_ride(
    state: &AppState,
    ride_id: Uuid,
    driver_public_id: &str,
    time_to_reach_min: f64,
) -> Result<Ride, AppError> {
    let driver = resolve(state, driver_public_id, UserRole::Driver)?;

    let result = state.lifecycle.accept(ride_id, driver.id, time_to_reach_min);
    state.metrics.record_transition("accept", result.is_ok());
    let ride = result?;

    publish(state, RideEvent::RideAccepted { ride: ride.clone() });
    Ok(ride)
}

pub fn mark_reached(
    state: &AppState,
    ride_id: Uuid,
    driver_public_id: &str,
) -> Result<Ride, AppError> {
    let driver = resolve(state, driver_public_id, UserRole::Driver)?;

    let result = state.lifecycle.mark_reached(ride_id, driver.id);
    state.metrics.record_transition("reached", result.is_ok());
    let ride = result?;

    publish(state, RideEvent::DriverReached { ride: ride.clone() });
    publish(
        state,
        RideEvent::RideStatusUpdated {
            ride_id: ride.id,
            status: ride.status,
        },
    );
    Ok(ride)
}

pub fn complete_ride(state: &AppState, ride_id: Uuid) -> Result<Ride, AppError> {
    let result = state.lifecycle.complete(ride_id);
    state.metrics.record_transition("complete", result.is_ok());
    let ride = result?;

    publish(state, RideEvent::RideCompleted { ride: ride.clone() });
    settle(state, &ride);
    Ok(ride)
}

pub fn cancel_ride(state: &AppState, ride_id: Uuid) -> Result<Ride, AppError> {
    let result = state.lifecycle.cancel(ride_id);
    state.metrics.record_transition("cancel", result.is_ok());
    let ride = result?;

    publish(state, RideEvent::RideCancelled { ride: ride.clone() });
    Ok(ride)
}

/// Pull-side reconciliation: the rider's most recent ride across every
/// partition, for clients that missed broadcasts.
pub fn ride_status(state: &AppState, rider_public_id: &str) -> Result<RideStatusResponse, AppError> {
    let rider = resolve(state, rider_public_id, UserRole::Rider)?;

    let ride = state
        .lifecycle
        .latest_for_rider(rider.id)
        .ok_or_else(|| AppError::NotFound(format!("no rides for rider {rider_public_id}")))?;

    Ok(RideStatusResponse {
        ride_id: ride.id,
        status: ride.status,
        driver_id: ride.driver_id,
    })
}

pub fn available_rides(state: &AppState) -> Vec<Ride> {
    state.rides.list_requested()
}

fn resolve(state: &AppState, public_id: &str, role: UserRole) -> Result<UserRecord, AppError> {
    state
        .users
        .find_by_public_id(public_id)
        .filter(|user| user.role == role)
        .ok_or_else(|| {
            let kind = match role {
                UserRole::Rider => "rider",
                UserRole::Driver => "driver",
            };
            AppError::NotFound(format!("{kind} {public_id} not found"))
        })
}

fn publish(state: &AppState, event: RideEvent) {
    state
        .metrics
        .events_broadcast_total
        .with_label_values(&[event.name()])
        .inc();
    state.hub.publish(&event);
}

/// Post-commit side calls, detached from the response path. Each reports its
/// own failure; neither can disturb the completed ride.
fn settle(state: &AppState, ride: &Ride) {
    let ledger = state.ledger.clone();
    let for_ledger = ride.clone();
    tokio::spawn(async move {
        match ledger.record_ride(&for_ledger).await {
            Ok(tx) => debug!(ride_id = %for_ledger.id, tx_ref = %tx.0, "ride settled"),
            Err(err) => {
                warn!(error = %err, ride_id = %for_ledger.id, "settlement ledger call failed");
            }
        }
    });

    let mailer = state.mailer.clone();
    let for_mail = ride.clone();
    tokio::spawn(async move {
        if let Err(err) = mailer.send_receipt(&for_mail).await {
            warn!(error = %err, ride_id = %for_mail.id, "receipt mail failed");
        }
    });
}
