//! API route handlers.
//!
//! - `health`: liveness and readiness probes
//! - `search`: the visual similarity query endpoint

pub mod health;
pub mod search;

use crate::error::ServerError;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info (GET /)
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "name": "Lookalike Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/find-similar-products",
            "/health",
            "/ready"
        ]
    }))
}

/// 404 Not Found handler for undefined routes
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
