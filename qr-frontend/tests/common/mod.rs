#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use qr_frontend::config::BackendSettings;
use qr_frontend::services::QrClient;
use qr_frontend::startup::build_router;
use qr_frontend::AppState;
use qr_service::config::{GeneratorConfig, QrServiceConfig};
use qr_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Start a real qr-service on a random port and return its base URL.
pub async fn spawn_qr_service() -> String {
    let config = QrServiceConfig {
        common: CoreConfig {
            port: 0,
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
        generator: GeneratorConfig::default(),
    };
    let app = Application::build(config)
        .await
        .expect("Failed to build qr-service");
    let address = format!("http://127.0.0.1:{}", app.port());

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    wait_until_up(&address).await;
    address
}

/// Serve an arbitrary router standing in for qr-service.
pub async fn spawn_stub_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub backend");
    let address = format!(
        "http://127.0.0.1:{}",
        listener.local_addr().unwrap().port()
    );

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    address
}

async fn wait_until_up(address: &str) {
    let client = reqwest::Client::new();
    let health_url = format!("{}/health", address);
    for _ in 0..50 {
        if client.get(&health_url).send().await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

pub fn client_for(url: &str, timeout_secs: u64) -> QrClient {
    QrClient::new(BackendSettings {
        url: url.to_string(),
        timeout_secs,
    })
    .expect("Failed to build QR client")
}

pub fn frontend_router(backend_url: &str) -> Router {
    build_router(AppState::new(Arc::new(client_for(backend_url, 5))))
}

pub struct PageResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

pub async fn send(router: Router, request: Request<Body>) -> PageResponse {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    PageResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn post_form(router: Router, form: &str) -> PageResponse {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/qr")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    send(router, request).await
}
