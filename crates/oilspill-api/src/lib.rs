pub mod error;
pub mod registry;
pub mod rest;
pub mod websocket;

pub use error::ApiError;
pub use registry::{SimulationHandle, SimulationRegistry, TickUpdate};

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

/// Assembles the full router against a given registry. Split out of
/// `main.rs` so integration tests can drive the real app in-process
/// instead of re-deriving the route table.
pub fn build_app(registry: SimulationRegistry) -> Router {
    Router::new()
        .route("/health", axum::routing::get(rest::health))
        .route("/ready", axum::routing::get(rest::ready))
        .nest("/v1", rest::create_router())
        .nest("/ws", websocket::create_router())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(registry)
}
