//! Cross-service workflow integration tests library.
//!
//! Runs qr-service and qr-frontend in-process on random ports, or points at
//! an already running stack when `QR_SERVICE_URL` / `QR_FRONTEND_URL` are set.
//!
//! ## Usage
//!
//! ```bash
//! cargo test -p workflow-tests
//!
//! # Against a deployed stack
//! QR_SERVICE_URL=http://localhost:5000 QR_FRONTEND_URL=http://localhost:3000 \
//!     cargo test -p workflow-tests
//! ```

use anyhow::{anyhow, Result};
use qr_frontend::config::BackendSettings;
use qr_frontend::services::QrClient;
use qr_frontend::AppState;
use qr_service::config::{GeneratorConfig, QrServiceConfig};
use qr_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::net::TcpListener;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,workflow_tests=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Base URLs of the two services under test.
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub qr_service: String,
    pub frontend: String,
}

impl ServiceEndpoints {
    /// Endpoints of an externally started stack, if both are configured.
    pub fn from_env() -> Option<Self> {
        let qr_service = std::env::var("QR_SERVICE_URL").ok()?;
        let frontend = std::env::var("QR_FRONTEND_URL").ok()?;
        Some(Self {
            qr_service,
            frontend,
        })
    }

    pub fn health_urls(&self) -> Vec<(&'static str, String)> {
        vec![
            ("qr-service", format!("{}/health", self.qr_service)),
            ("qr-frontend", format!("{}/health", self.frontend)),
        ]
    }
}

/// Everything a workflow test needs: where the services live and a client
/// wired the way the frontend wires it.
pub struct WorkflowTestContext {
    pub endpoints: ServiceEndpoints,
    pub qr_client: QrClient,
    pub http: reqwest::Client,
}

impl WorkflowTestContext {
    /// Use the stack from the environment, or start both services in-process.
    pub async fn new() -> Result<Self> {
        init_tracing();

        let endpoints = match ServiceEndpoints::from_env() {
            Some(endpoints) => endpoints,
            None => spawn_in_process().await?,
        };

        let qr_client = QrClient::new(BackendSettings {
            url: endpoints.qr_service.clone(),
            timeout_secs: 15,
        })
        .map_err(|e| anyhow!("Failed to create QR client: {}", e))?;

        Ok(Self {
            endpoints,
            qr_client,
            http: reqwest::Client::new(),
        })
    }
}

async fn spawn_in_process() -> Result<ServiceEndpoints> {
    let config = QrServiceConfig {
        common: CoreConfig {
            port: 0,
            log_level: "info".to_string(),
            otlp_endpoint: None,
        },
        generator: GeneratorConfig::default(),
    };
    let app = Application::build(config)
        .await
        .map_err(|e| anyhow!("Failed to build qr-service: {}", e))?;
    let qr_service = format!("http://127.0.0.1:{}", app.port());
    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let client = QrClient::new(BackendSettings {
        url: qr_service.clone(),
        timeout_secs: 15,
    })
    .map_err(|e| anyhow!("Failed to create QR client: {}", e))?;
    let router = qr_frontend::startup::build_router(AppState::new(Arc::new(client)));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let frontend = format!("http://127.0.0.1:{}", listener.local_addr()?.port());
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    tracing::debug!(%qr_service, %frontend, "Started services in-process");
    Ok(ServiceEndpoints {
        qr_service,
        frontend,
    })
}

/// Wait for all services to be healthy.
///
/// Polls health endpoints until all services respond with 200 OK.
/// Times out after the specified duration.
pub async fn wait_for_services(endpoints: &ServiceEndpoints, timeout: Duration) -> Result<()> {
    let health_urls = endpoints.health_urls();
    let client = reqwest::Client::new();
    let start = std::time::Instant::now();

    tracing::info!("Waiting for {} services to be healthy...", health_urls.len());

    loop {
        let mut unhealthy_services = Vec::new();

        for (name, url) in &health_urls {
            match client.get(url).timeout(Duration::from_secs(2)).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    unhealthy_services.push(format!("{} (status: {})", name, resp.status()));
                }
                Err(e) => {
                    unhealthy_services.push(format!("{} (error: {})", name, e));
                }
            }
        }

        if unhealthy_services.is_empty() {
            tracing::info!("All services are healthy");
            return Ok(());
        }

        if start.elapsed() > timeout {
            return Err(anyhow!(
                "Timeout waiting for services. Unhealthy: {}",
                unhealthy_services.join(", ")
            ));
        }

        tracing::debug!("Waiting for services: {}", unhealthy_services.join(", "));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
