use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oilspill_core::ConfigError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("simulation {0} not found")]
    NotFound(uuid::Uuid),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("at capacity: {0} simulations already running")]
    AtCapacity(usize),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Config(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::AtCapacity(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
