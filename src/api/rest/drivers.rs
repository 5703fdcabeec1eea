use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch};
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::error::AppError;
use crate::models::driver::DriverPoolEntry;
use crate::models::ride::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/drivers", get(list_drivers))
        .route("/drivers/:public_id/location", patch(update_location))
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub location: GeoPoint,
}

async fn list_drivers(State(state): State<Arc<AppState>>) -> Json<Vec<DriverPoolEntry>> {
    let drivers = state
        .drivers
        .iter()
        .map(|entry| entry.value().clone())
        .collect();

    Json(drivers)
}

/// Only drivers with a live socket have a pool entry to update.
async fn update_location(
    State(state): State<Arc<AppState>>,
    Path(public_id): Path<String>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<Json<DriverPoolEntry>, AppError> {
    let mut entry = state
        .drivers
        .iter_mut()
        .find(|entry| entry.public_id == public_id)
        .ok_or_else(|| AppError::NotFound(format!("driver {public_id} is not connected")))?;

    entry.location = Some(payload.location);
    Ok(Json(entry.clone()))
}
