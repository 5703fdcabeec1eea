use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::ride::{Ride, RideStatus};

/// Terminal partitions a ride can be retired into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Completed,
    Cancelled,
}

/// Durable ride storage, partitioned by outcome: one active working set plus
/// completed and cancelled archives. A ride id lives in exactly one partition
/// at any time.
///
/// The mutating operations take the transition closure so the status check
/// and the write happen inside the same critical section; callers never get a
/// read-then-write window.
pub trait RideRepository: Send + Sync {
    fn insert_active(&self, ride: Ride) -> Result<(), AppError>;

    fn get_active(&self, ride_id: Uuid) -> Option<Ride>;

    /// Applies `apply` to the active ride under the partition lock and
    /// returns the updated copy. `RideNotFound` if the id is not active.
    fn update_active(
        &self,
        ride_id: Uuid,
        apply: &mut dyn FnMut(&mut Ride) -> Result<(), AppError>,
    ) -> Result<Ride, AppError>;

    /// Applies `apply`, then moves the ride from the active partition into
    /// `into`, all in one critical section. If `apply` fails the ride stays
    /// where it was.
    fn retire(
        &self,
        ride_id: Uuid,
        into: Partition,
        apply: &mut dyn FnMut(&mut Ride) -> Result<(), AppError>,
    ) -> Result<Ride, AppError>;

    /// The rider's most recent ride across all three partitions, by
    /// `updated_at`. Ties prefer active over cancelled over completed.
    fn latest_for_rider(&self, rider_id: Uuid) -> Option<Ride>;

    fn list_requested(&self) -> Vec<Ride>;

    /// (active, completed, cancelled) sizes.
    fn partition_counts(&self) -> (usize, usize, usize);
}

#[derive(Default)]
struct Partitions {
    active: HashMap<Uuid, Ride>,
    completed: HashMap<Uuid, Ride>,
    cancelled: HashMap<Uuid, Ride>,
}

/// In-memory repository. A single `RwLock` spans all three partitions so a
/// retire is atomic from any reader's point of view: no reader can catch a
/// ride absent from every partition or present in two.
#[derive(Default)]
pub struct InMemoryRideRepository {
    partitions: RwLock<Partitions>,
}

impl InMemoryRideRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Partitions> {
        self.partitions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Partitions> {
        self.partitions.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn not_found(ride_id: Uuid) -> AppError {
    AppError::NotFound(format!("ride {ride_id} not found"))
}

impl RideRepository for InMemoryRideRepository {
    fn insert_active(&self, ride: Ride) -> Result<(), AppError> {
        let mut parts = self.write();
        if parts.active.contains_key(&ride.id)
            || parts.completed.contains_key(&ride.id)
            || parts.cancelled.contains_key(&ride.id)
        {
            return Err(AppError::Conflict(format!("ride {} already exists", ride.id)));
        }

        parts.active.insert(ride.id, ride);
        Ok(())
    }

    fn get_active(&self, ride_id: Uuid) -> Option<Ride> {
        self.read().active.get(&ride_id).cloned()
    }

    fn update_active(
        &self,
        ride_id: Uuid,
        apply: &mut dyn FnMut(&mut Ride) -> Result<(), AppError>,
    ) -> Result<Ride, AppError> {
        let mut parts = self.write();
        let ride = parts.active.get_mut(&ride_id).ok_or_else(|| not_found(ride_id))?;

        apply(ride)?;
        Ok(ride.clone())
    }

    fn retire(
        &self,
        ride_id: Uuid,
        into: Partition,
        apply: &mut dyn FnMut(&mut Ride) -> Result<(), AppError>,
    ) -> Result<Ride, AppError> {
        let mut parts = self.write();
        let ride = parts.active.get_mut(&ride_id).ok_or_else(|| not_found(ride_id))?;

        apply(ride)?;

        let ride = parts
            .active
            .remove(&ride_id)
            .ok_or_else(|| not_found(ride_id))?;

        let archived = ride.clone();
        match into {
            Partition::Completed => parts.completed.insert(ride_id, ride),
            Partition::Cancelled => parts.cancelled.insert(ride_id, ride),
        };

        Ok(archived)
    }

    fn latest_for_rider(&self, rider_id: Uuid) -> Option<Ride> {
        let parts = self.read();

        // Rank breaks updated_at ties: active > cancelled > completed.
        let candidates = parts
            .active
            .values()
            .map(|r| (r, 2u8))
            .chain(parts.cancelled.values().map(|r| (r, 1u8)))
            .chain(parts.completed.values().map(|r| (r, 0u8)))
            .filter(|(r, _)| r.rider_id == rider_id);

        candidates
            .max_by(|(a, rank_a), (b, rank_b)| {
                match a.updated_at.cmp(&b.updated_at) {
                    Ordering::Equal => rank_a.cmp(rank_b),
                    other => other,
                }
            })
            .map(|(r, _)| r.clone())
    }

    fn list_requested(&self) -> Vec<Ride> {
        self.read()
            .active
            .values()
            .filter(|r| r.status == RideStatus::Requested)
            .cloned()
            .collect()
    }

    fn partition_counts(&self) -> (usize, usize, usize) {
        let parts = self.read();
        (parts.active.len(), parts.completed.len(), parts.cancelled.len())
    }
}
