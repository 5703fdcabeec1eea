use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ride_dispatch::api::rest::router;
use ride_dispatch::state::AppState;
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup() -> axum::Router {
    router(Arc::new(AppState::new(64)))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn register(app: &axum::Router, public_id: &str, role: &str) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/register",
            json!({
                "public_id": public_id,
                "name": public_id,
                "role": role,
                "password": "secret"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

/// ~5 km trip within Bengaluru, well inside the serviceable band.
fn ride_payload(rider_public_id: &str) -> Value {
    json!({
        "rider_public_id": rider_public_id,
        "pickup": { "lat": 12.9716, "lng": 77.5946 },
        "dropoff": { "lat": 13.0166, "lng": 77.5946 },
        "start_time": "2026-08-29T10:00:00Z",
        "end_time": "2026-08-29T10:30:00Z"
    })
}

async fn create_ride(app: &axum::Router, rider_public_id: &str) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/rides", ride_payload(rider_public_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_rides"], 0);
    assert_eq!(body["completed_rides"], 0);
    assert_eq!(body["cancelled_rides"], 0);
    assert_eq!(body["subscribers"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("ws_subscribers"));
    assert!(body.contains("fare_amount"));
}

#[tokio::test]
async fn register_does_not_echo_credentials() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            json!({
                "public_id": "asha-01",
                "name": "Asha",
                "role": "Rider",
                "password": "secret"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["public_id"], "asha-01");
    assert_eq!(body["role"], "Rider");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/register",
            json!({
                "public_id": "asha-01",
                "name": "Asha",
                "role": "Rider",
                "password": "secret"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_checks_credentials() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;

    let ok = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "public_id": "asha-01", "password": "secret" }),
        ))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body = body_json(ok).await;
    assert!(body["user_id"].as_str().unwrap().len() > 0);

    let bad = app
        .oneshot(json_request(
            "POST",
            "/auth/login",
            json!({ "public_id": "asha-01", "password": "guess" }),
        ))
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_ride_returns_quote_and_requested_status() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;

    let body = create_ride(&app, "asha-01").await;

    assert_eq!(body["ride"]["status"], "Requested");
    assert!(body["ride"]["driver_id"].is_null());
    assert!((body["ride"]["distance_km"].as_f64().unwrap() - 5.0).abs() < 0.1);
    assert_eq!(body["duration_min"], 30.0);
    assert!(body["fare"].as_f64().unwrap() > 100.0);
}

#[tokio::test]
async fn create_ride_unknown_rider_returns_404() {
    let app = setup();
    let response = app
        .oneshot(json_request("POST", "/rides", ride_payload("nobody")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_ride_too_short_returns_400() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;

    let mut payload = ride_payload("asha-01");
    payload["dropoff"] = json!({ "lat": 12.9766, "lng": 77.5946 });

    let response = app
        .oneshot(json_request("POST", "/rides", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_ride_too_long_returns_400() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;

    let mut payload = ride_payload("asha-01");
    payload["dropoff"] = json!({ "lat": 13.18, "lng": 77.5946 });

    let response = app
        .oneshot(json_request("POST", "/rides", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_ride_with_inverted_times_returns_400() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;

    let mut payload = ride_payload("asha-01");
    payload["end_time"] = json!("2026-08-29T09:00:00Z");

    let response = app
        .oneshot(json_request("POST", "/rides", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn accept_records_driver_and_eta() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;
    register(&app, "dev-07", "Driver").await;

    let ride = create_ride(&app, "asha-01").await;
    let ride_id = ride["ride"]["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/rides/{ride_id}/accept"),
            json!({ "driver_public_id": "dev-07", "time_to_reach_min": 5.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Accepted");
    assert!(!body["driver_id"].is_null());
    assert_eq!(body["time_to_reach_min"], 5.0);
}

#[tokio::test]
async fn second_accept_returns_409() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;
    register(&app, "dev-07", "Driver").await;
    register(&app, "dev-08", "Driver").await;

    let ride = create_ride(&app, "asha-01").await;
    let ride_id = ride["ride"]["id"].as_str().unwrap().to_string();

    let first = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/rides/{ride_id}/accept"),
            json!({ "driver_public_id": "dev-07", "time_to_reach_min": 5.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(json_request(
            "POST",
            &format!("/rides/{ride_id}/accept"),
            json!({ "driver_public_id": "dev-08", "time_to_reach_min": 3.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn accept_unknown_ride_returns_404() {
    let app = setup();
    register(&app, "dev-07", "Driver").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/rides/00000000-0000-0000-0000-000000000000/accept",
            json!({ "driver_public_id": "dev-07", "time_to_reach_min": 5.0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mark_reached_by_wrong_driver_returns_403() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;
    register(&app, "dev-07", "Driver").await;
    register(&app, "dev-08", "Driver").await;

    let ride = create_ride(&app, "asha-01").await;
    let ride_id = ride["ride"]["id"].as_str().unwrap().to_string();

    let accept = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/rides/{ride_id}/accept"),
            json!({ "driver_public_id": "dev-07", "time_to_reach_min": 5.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(accept.status(), StatusCode::OK);

    let reached = app
        .oneshot(json_request(
            "POST",
            &format!("/rides/{ride_id}/reached"),
            json!({ "driver_public_id": "dev-08" }),
        ))
        .await
        .unwrap();
    assert_eq!(reached.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn mark_reached_before_accept_returns_403() {
    // The ride has no assigned driver yet, so the driver check fires first.
    let app = setup();
    register(&app, "asha-01", "Rider").await;
    register(&app, "dev-07", "Driver").await;

    let ride = create_ride(&app, "asha-01").await;
    let ride_id = ride["ride"]["id"].as_str().unwrap().to_string();

    let reached = app
        .oneshot(json_request(
            "POST",
            &format!("/rides/{ride_id}/reached"),
            json!({ "driver_public_id": "dev-07" }),
        ))
        .await
        .unwrap();
    assert_eq!(reached.status(), StatusCode::FORBIDDEN);
}

async fn run_full_ride(app: &axum::Router, rider: &str, driver: &str) -> String {
    let ride = create_ride(app, rider).await;
    let ride_id = ride["ride"]["id"].as_str().unwrap().to_string();

    for (uri, body) in [
        (
            format!("/rides/{ride_id}/accept"),
            Some(json!({ "driver_public_id": driver, "time_to_reach_min": 5.0 })),
        ),
        (
            format!("/rides/{ride_id}/reached"),
            Some(json!({ "driver_public_id": driver })),
        ),
        (format!("/rides/{ride_id}/complete"), None),
    ] {
        let request = match body {
            Some(body) => json_request("POST", &uri, body),
            None => post_request(&uri),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "step {uri}");
    }

    ride_id
}

#[tokio::test]
async fn completed_ride_leaves_the_active_partition() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;
    register(&app, "dev-07", "Driver").await;

    let ride_id = run_full_ride(&app, "asha-01", "dev-07").await;

    let cancel = app
        .clone()
        .oneshot(post_request(&format!("/rides/{ride_id}/cancel")))
        .await
        .unwrap();
    assert_eq!(cancel.status(), StatusCode::NOT_FOUND);

    let health = body_json(app.oneshot(get_request("/health")).await.unwrap()).await;
    assert_eq!(health["active_rides"], 0);
    assert_eq!(health["completed_rides"], 1);
    assert_eq!(health["cancelled_rides"], 0);
}

#[tokio::test]
async fn cancelled_ride_cannot_be_completed() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;

    let ride = create_ride(&app, "asha-01").await;
    let ride_id = ride["ride"]["id"].as_str().unwrap().to_string();

    let cancel = app
        .clone()
        .oneshot(post_request(&format!("/rides/{ride_id}/cancel")))
        .await
        .unwrap();
    assert_eq!(cancel.status(), StatusCode::OK);

    let complete = app
        .clone()
        .oneshot(post_request(&format!("/rides/{ride_id}/complete")))
        .await
        .unwrap();
    assert_eq!(complete.status(), StatusCode::NOT_FOUND);

    let health = body_json(app.oneshot(get_request("/health")).await.unwrap()).await;
    assert_eq!(health["completed_rides"], 0);
    assert_eq!(health["cancelled_rides"], 1);
}

#[tokio::test]
async fn ride_status_returns_most_recent_ride() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;

    let first = create_ride(&app, "asha-01").await;
    let first_id = first["ride"]["id"].as_str().unwrap().to_string();
    let cancel = app
        .clone()
        .oneshot(post_request(&format!("/rides/{first_id}/cancel")))
        .await
        .unwrap();
    assert_eq!(cancel.status(), StatusCode::OK);

    let second = create_ride(&app, "asha-01").await;
    let second_id = second["ride"]["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(get_request("/rides/status?rider_public_id=asha-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ride_id"], second_id.as_str());
    assert_eq!(body["status"], "Requested");
    assert!(body["driver_id"].is_null());
}

#[tokio::test]
async fn ride_status_without_param_returns_400() {
    let app = setup();
    let response = app.oneshot(get_request("/rides/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ride_status_with_no_rides_returns_404() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;

    let response = app
        .oneshot(get_request("/rides/status?rider_public_id=asha-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn available_rides_lists_only_requested() {
    let app = setup();
    register(&app, "asha-01", "Rider").await;
    register(&app, "ravi-02", "Rider").await;
    register(&app, "dev-07", "Driver").await;

    create_ride(&app, "asha-01").await;
    let taken = create_ride(&app, "ravi-02").await;
    let taken_id = taken["ride"]["id"].as_str().unwrap().to_string();

    let accept = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/rides/{taken_id}/accept"),
            json!({ "driver_public_id": "dev-07", "time_to_reach_min": 4.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(accept.status(), StatusCode::OK);

    let response = app.oneshot(get_request("/rides/available")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["status"], "Requested");
}

#[tokio::test]
async fn drivers_pool_starts_empty() {
    let app = setup();
    let response = app.oneshot(get_request("/drivers")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn route_preview_estimates_distance() {
    let app = setup();
    let response = app
        .oneshot(get_request(
            "/route?from_lat=12.9716&from_lng=77.5946&to_lat=13.0166&to_lng=77.5946",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!((body["distance_km"].as_f64().unwrap() - 5.0).abs() < 0.1);
    assert!(body["duration_min"].as_f64().unwrap() > 0.0);
}
