use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;
use crate::geo::haversine_km;
use crate::models::ride::GeoPoint;

#[derive(Debug, Clone, Serialize)]
pub struct RouteEstimate {
    pub distance_km: f64,
    pub duration_min: f64,
    pub waypoints: Vec<GeoPoint>,
}

/// Route-geometry lookup, normally backed by a third-party routing provider.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<RouteEstimate, AppError>;
}

/// Fallback provider: great-circle distance at an assumed average speed, with
/// the endpoints as the only waypoints.
pub struct StraightLineRoutes {
    pub avg_speed_kmh: f64,
}

impl StraightLineRoutes {
    pub fn new() -> Self {
        Self { avg_speed_kmh: 30.0 }
    }
}

impl Default for StraightLineRoutes {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RouteProvider for StraightLineRoutes {
    async fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<RouteEstimate, AppError> {
        let distance_km = haversine_km(&from, &to);
        let duration_min = distance_km / self.avg_speed_kmh * 60.0;

        Ok(RouteEstimate {
            distance_km,
            duration_min,
            waypoints: vec![from, to],
        })
    }
}
