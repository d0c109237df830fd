use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use oilspill_core::{GridSet, SimulationConfig};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiError, SimulationRegistry};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn ready() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ready",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Grid documents are accepted inline as raw JSON strings (spec §6.1's wire
/// format), not parsed by this layer — `GridSet::from_json_documents` does
/// the validation and absorbs malformed input per spec §7. Preprocessing a
/// NetCDF source into this JSON shape remains the offline collaborator's job
/// (spec §1, out of scope).
#[derive(Debug, Default, Deserialize)]
pub struct GridDocuments {
    pub wind: Option<String>,
    pub current: Option<String>,
    pub temperature: Option<String>,
    pub landmask: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSimulationRequest {
    #[serde(flatten)]
    pub config: SimulationConfig,
    #[serde(default)]
    pub grids: GridDocuments,
}

#[derive(Debug, Serialize)]
pub struct CreateSimulationResponse {
    pub simulation_id: Uuid,
}

async fn create_simulation(
    State(registry): State<SimulationRegistry>,
    Json(req): Json<CreateSimulationRequest>,
) -> Result<Json<CreateSimulationResponse>, ApiError> {
    let grids = GridSet::from_json_documents(
        req.grids.wind.as_deref(),
        req.grids.current.as_deref(),
        req.grids.temperature.as_deref(),
        req.grids.landmask.as_deref(),
    );
    let simulation_id = registry.create(req.config, grids).await?;
    Ok(Json(CreateSimulationResponse { simulation_id }))
}

async fn start_simulation(State(registry): State<SimulationRegistry>, Path(id): Path<Uuid>) -> Result<(), ApiError> {
    registry.start(id).await
}

async fn pause_simulation(State(registry): State<SimulationRegistry>, Path(id): Path<Uuid>) -> Result<(), ApiError> {
    registry.pause(id).await
}

async fn reset_simulation(State(registry): State<SimulationRegistry>, Path(id): Path<Uuid>) -> Result<(), ApiError> {
    registry.reset(id).await
}

#[derive(Debug, Serialize)]
pub struct SimulationSnapshotResponse {
    pub simulation_id: Uuid,
    pub state: String,
    pub time_seconds: f64,
    pub stats: oilspill_core::Statistics,
    pub particle_count: usize,
}

async fn get_simulation(
    State(registry): State<SimulationRegistry>,
    Path(id): Path<Uuid>,
) -> Result<Json<SimulationSnapshotResponse>, ApiError> {
    let handle = registry.get(id).await.ok_or(ApiError::NotFound(id))?;
    let driver = handle.driver.lock().await;
    Ok(Json(SimulationSnapshotResponse {
        simulation_id: id,
        state: format!("{:?}", driver.state()),
        time_seconds: driver.time(),
        stats: driver.stats().clone(),
        particle_count: driver.particles().len(),
    }))
}

pub fn create_router() -> Router<SimulationRegistry> {
    Router::new()
        .route("/simulations", post(create_simulation))
        .route("/simulations/{id}", get(get_simulation))
        .route("/simulations/{id}/start", post(start_simulation))
        .route("/simulations/{id}/pause", post(pause_simulation))
        .route("/simulations/{id}/reset", post(reset_simulation))
}
