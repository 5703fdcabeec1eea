use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{UserProfile, UserRole};
use crate::state::AppState;
use crate::users::NewUser;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub public_id: String,
    pub name: String,
    pub role: UserRole,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub public_id: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let user = state.users.register(NewUser {
        public_id: payload.public_id,
        name: payload.name,
        role: payload.role,
        password: payload.password,
    })?;

    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user_id = state.users.verify(&payload.public_id, &payload.password)?;
    Ok(Json(LoginResponse { user_id }))
}
