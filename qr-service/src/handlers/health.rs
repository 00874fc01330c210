use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::api::StatusResponse;

/// Liveness payload on `/`, kept for clients that probe the root.
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "QR Generator API is running".to_string(),
    })
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "qr-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        service_core::observability::get_metrics(),
    )
}
