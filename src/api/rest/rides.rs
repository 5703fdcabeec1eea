use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::dispatch;
use crate::dispatch::{CreateRideResponse, RideStatusResponse};
use crate::error::AppError;
use crate::models::ride::{GeoPoint, Ride};
use crate::routing::RouteEstimate;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides", post(create_ride))
        .route("/rides/available", get(available_rides))
        .route("/rides/status", get(ride_status))
        .route("/rides/:id/accept", post(accept_ride))
        .route("/rides/:id/reached", post(mark_reached))
        .route("/rides/:id/complete", post(complete_ride))
        .route("/rides/:id/cancel", post(cancel_ride))
        .route("/route", get(route_preview))
}

#[derive(Deserialize)]
pub struct CreateRideRequest {
    pub rider_public_id: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct AcceptRideRequest {
    pub driver_public_id: String,
    pub time_to_reach_min: f64,
}

#[derive(Deserialize)]
pub struct MarkReachedRequest {
    pub driver_public_id: String,
}

#[derive(Deserialize)]
pub struct RideStatusQuery {
    pub rider_public_id: String,
}

#[derive(Deserialize)]
pub struct RoutePreviewQuery {
    pub from_lat: f64,
    pub from_lng: f64,
    pub to_lat: f64,
    pub to_lng: f64,
}

async fn create_ride(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRideRequest>,
) -> Result<Json<CreateRideResponse>, AppError> {
    let response = dispatch::create_ride(
        &state,
        &payload.rider_public_id,
        payload.pickup,
        payload.dropoff,
        payload.start_time,
        payload.end_time,
    )?;

    Ok(Json(response))
}

async fn accept_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AcceptRideRequest>,
) -> Result<Json<Ride>, AppError> {
    let ride = dispatch::accept_ride(
        &state,
        id,
        &payload.driver_public_id,
        payload.time_to_reach_min,
    )?;

    Ok(Json(ride))
}

async fn mark_reached(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MarkReachedRequest>,
) -> Result<Json<Ride>, AppError> {
    let ride = dispatch::mark_reached(&state, id, &payload.driver_public_id)?;
    Ok(Json(ride))
}

async fn complete_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    let ride = dispatch::complete_ride(&state, id)?;
    Ok(Json(ride))
}

async fn cancel_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    let ride = dispatch::cancel_ride(&state, id)?;
    Ok(Json(ride))
}

async fn ride_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RideStatusQuery>,
) -> Result<Json<RideStatusResponse>, AppError> {
    let status = dispatch::ride_status(&state, &query.rider_public_id)?;
    Ok(Json(status))
}

async fn available_rides(State(state): State<Arc<AppState>>) -> Json<Vec<Ride>> {
    Json(dispatch::available_rides(&state))
}

async fn route_preview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RoutePreviewQuery>,
) -> Result<Json<RouteEstimate>, AppError> {
    let from = GeoPoint {
        lat: query.from_lat,
        lng: query.from_lng,
    };
    let to = GeoPoint {
        lat: query.to_lat,
        lng: query.to_lng,
    };

    let estimate = state.routes.route(from, to).await?;
    Ok(Json(estimate))
}
