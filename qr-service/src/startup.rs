//! Application startup and lifecycle management.

use crate::config::QrServiceConfig;
use crate::handlers;
use crate::services::{LogoQrGenerator, QrGenerator};
use axum::{
    body::Body,
    http::{header, Method, Request},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::api::GENERATE_QR_PATH;
use service_core::error::AppError;
use service_core::middleware::{
    api_security_headers_middleware, make_request_span, metrics_middleware,
    request_id_middleware,
};
use service_core::shutdown::shutdown_signal;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: QrServiceConfig,
    pub generator: Arc<dyn QrGenerator>,
    /// Caps blocking-pool threads used by generation.
    pub generation_slots: Arc<Semaphore>,
}

impl AppState {
    pub fn new(config: QrServiceConfig, generator: Arc<dyn QrGenerator>) -> Self {
        let generation_slots = Arc::new(Semaphore::new(config.generator.max_concurrent));
        Self {
            config,
            generator,
            generation_slots,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Browser frontends call the API from their own origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(GENERATE_QR_PATH, post(handlers::generate_qr))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(api_security_headers_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            make_request_span(request)
        }))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build with the logo generator described by `config`.
    pub async fn build(config: QrServiceConfig) -> Result<Self, AppError> {
        let generator = LogoQrGenerator::from_config(&config.generator).map_err(|e| {
            tracing::error!("Failed to initialize QR generator: {}", e);
            AppError::ConfigError(anyhow::Error::new(e))
        })?;

        Self::build_with_generator(config, Arc::new(generator)).await
    }

    pub async fn build_with_generator(
        config: QrServiceConfig,
        generator: Arc<dyn QrGenerator>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            timeout_ms = config.generator.timeout_ms,
            max_concurrent = config.generator.max_concurrent,
            logo = config.generator.logo_path.as_deref().unwrap_or("built-in"),
            "QR service listening"
        );

        let router = build_router(AppState::new(config, generator));

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
