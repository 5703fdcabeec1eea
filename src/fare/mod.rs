use crate::geo::haversine_km;
use crate::models::ride::GeoPoint;

const BASE_FARE: f64 = 25.0;
const PER_KM_RATE: f64 = 12.0;
const PER_MIN_RATE: f64 = 2.0;
const BOOKING_SURCHARGE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FareQuote {
    pub fare: f64,
    pub distance_km: f64,
}

/// Prices a trip from its endpoints and expected duration. Pure and
/// deterministic; coordinate validation is the caller's job.
pub fn quote(pickup: &GeoPoint, dropoff: &GeoPoint, duration_min: f64) -> FareQuote {
    let distance_km = haversine_km(pickup, dropoff);
    let fare =
        BASE_FARE + distance_km * PER_KM_RATE + duration_min * PER_MIN_RATE + BOOKING_SURCHARGE;

    FareQuote { fare, distance_km }
}
