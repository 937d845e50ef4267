use axum::{response::IntoResponse, Json};

use super::super::SERVICE_NAME;

/// `GET /`
pub(crate) async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/// `GET /health`
pub(crate) async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    }))
}
