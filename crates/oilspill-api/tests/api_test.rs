//! REST lifecycle exercised in-process via `tower::ServiceExt::oneshot`,
//! mirroring the teacher's `api_test.rs` but without a live network
//! dependency — the router is the same one `main.rs` serves.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use oilspill_api::{build_app, SimulationRegistry};
use serde_json::{json, Value};
use tower::ServiceExt;

fn registry() -> SimulationRegistry {
    SimulationRegistry::new(16)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_and_ready_report_ok() {
    let app = build_app(registry());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_start_and_fetch_simulation_lifecycle() {
    let app = build_app(registry());

    let create_body = json!({
        "spill_lat": 30.0,
        "spill_lng": -88.0,
        "oil_volume_tonnes": 200.0,
        "oil_type": "crude",
        "spill_mode": "instant",
        "spill_duration_hours": 0.0,
        "particle_count": 10,
        "time_step_seconds": 600.0,
        "max_time_seconds": 3600.0,
        "wind_speed_ms": 5.0,
        "wind_dir_deg": 180.0,
        "current_speed_ms": 0.0,
        "current_dir_deg": 0.0,
        "water_temp_c": 15.0,
        "use_grid_data": false,
        "grid_time_offset_hours": 0.0,
        "playback_speed": 1
    });

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/simulations")
                .header("content-type", "application/json")
                .body(Body::from(create_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let simulation_id = body["simulation_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/simulations/{simulation_id}/start"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/simulations/{simulation_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["simulation_id"], simulation_id);
}

#[tokio::test]
async fn unknown_simulation_id_returns_404() {
    let app = build_app(registry());
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/simulations/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_configuration_is_rejected_with_422() {
    let app = build_app(registry());
    let create_body = json!({
        "spill_lat": 0.0,
        "spill_lng": 0.0,
        "oil_volume_tonnes": 100.0,
        "oil_type": "crude",
        "spill_mode": "instant",
        "spill_duration_hours": 0.0,
        "particle_count": 0,
        "time_step_seconds": 600.0,
        "max_time_seconds": 3600.0,
        "wind_speed_ms": 5.0,
        "wind_dir_deg": 0.0,
        "current_speed_ms": 0.0,
        "current_dir_deg": 0.0,
        "water_temp_c": 15.0,
        "use_grid_data": false,
        "grid_time_offset_hours": 0.0,
        "playback_speed": 1
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/simulations")
                .header("content-type", "application/json")
                .body(Body::from(create_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
