use axum::{
    body::Body,
    http::Request,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    make_request_span, metrics_middleware, page_security_headers_middleware,
    request_id_middleware,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{generate_qr_page, health_check, index, metrics};
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/qr", post(generate_qr_page))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(page_security_headers_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            make_request_span(request)
        }))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
