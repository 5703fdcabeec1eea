use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::fare::FareQuote;
use crate::models::ride::{GeoPoint, Ride, RideStatus};
use crate::storage::{Partition, RideRepository};

pub const MIN_DISTANCE_KM: f64 = 1.0;
pub const MAX_DISTANCE_KM: f64 = 17.5;

/// The ride state machine. Sole owner of status mutations: every transition
/// goes through [`RideStatus::can_advance_to`] inside the repository's
/// critical section, so concurrent callers get a proper check-and-set rather
/// than a read-then-write race.
pub struct RideLifecycle {
    repo: Arc<dyn RideRepository>,
}

impl RideLifecycle {
    pub fn new(repo: Arc<dyn RideRepository>) -> Self {
        Self { repo }
    }

    pub fn create(
        &self,
        rider_id: Uuid,
        pickup: GeoPoint,
        dropoff: GeoPoint,
        duration_min: f64,
        quote: &FareQuote,
    ) -> Result<Ride, AppError> {
        if !(MIN_DISTANCE_KM..=MAX_DISTANCE_KM).contains(&quote.distance_km) {
            return Err(AppError::DistanceOutOfRange(quote.distance_km));
        }

        let now = Utc::now();
        let ride = Ride {
            id: Uuid::new_v4(),
            rider_id,
            driver_id: None,
            pickup,
            dropoff,
            fare: quote.fare,
            distance_km: quote.distance_km,
            duration_min,
            status: RideStatus::Requested,
            time_to_reach_min: None,
            created_at: now,
            updated_at: now,
        };

        self.repo.insert_active(ride.clone())?;
        info!(ride_id = %ride.id, rider_id = %rider_id, distance_km = ride.distance_km, "ride requested");

        Ok(ride)
    }

    /// First acceptance wins: the status check and the driver assignment are
    /// one atomic step, so of two concurrent accepts exactly one succeeds.
    pub fn accept(
        &self,
        ride_id: Uuid,
        driver_id: Uuid,
        time_to_reach_min: f64,
    ) -> Result<Ride, AppError> {
        let ride = self.repo.update_active(ride_id, &mut |ride| {
            guard(ride.status, RideStatus::Accepted)?;
            ride.status = RideStatus::Accepted;
            ride.driver_id = Some(driver_id);
            ride.time_to_reach_min = Some(time_to_reach_min);
            ride.updated_at = Utc::now();
            Ok(())
        })?;

        info!(ride_id = %ride_id, driver_id = %driver_id, "ride accepted");
        Ok(ride)
    }

    pub fn mark_reached(&self, ride_id: Uuid, driver_id: Uuid) -> Result<Ride, AppError> {
        let ride = self.repo.update_active(ride_id, &mut |ride| {
            if ride.driver_id != Some(driver_id) {
                return Err(AppError::NotAssignedDriver);
            }
            guard(ride.status, RideStatus::DriverReached)?;
            ride.status = RideStatus::DriverReached;
            ride.updated_at = Utc::now();
            Ok(())
        })?;

        info!(ride_id = %ride_id, driver_id = %driver_id, "driver reached pickup");
        Ok(ride)
    }

    /// Relocates the record into the completed partition; after this the ride
    /// no longer shows up in active queries.
    pub fn complete(&self, ride_id: Uuid) -> Result<Ride, AppError> {
        let ride = self.repo.retire(ride_id, Partition::Completed, &mut |ride| {
            guard(ride.status, RideStatus::Completed)?;
            ride.status = RideStatus::Completed;
            ride.updated_at = Utc::now();
            Ok(())
        })?;

        info!(ride_id = %ride_id, fare = ride.fare, "ride completed");
        Ok(ride)
    }

    pub fn cancel(&self, ride_id: Uuid) -> Result<Ride, AppError> {
        let ride = self.repo.retire(ride_id, Partition::Cancelled, &mut |ride| {
            guard(ride.status, RideStatus::Cancelled)?;
            ride.status = RideStatus::Cancelled;
            ride.updated_at = Utc::now();
            Ok(())
        })?;

        info!(ride_id = %ride_id, "ride cancelled");
        Ok(ride)
    }

    pub fn latest_for_rider(&self, rider_id: Uuid) -> Option<Ride> {
        self.repo.latest_for_rider(rider_id)
    }
}

fn guard(from: RideStatus, to: RideStatus) -> Result<(), AppError> {
    if from.can_advance_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition { from, to })
    }
}
