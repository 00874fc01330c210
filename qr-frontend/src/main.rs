use dotenvy::dotenv;
use qr_frontend::config::get_configuration;
use qr_frontend::services::QrClient;
use qr_frontend::startup::build_router;
use qr_frontend::AppState;
use service_core::observability::{init_metrics, init_tracing};
use service_core::shutdown::shutdown_signal;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "qr-frontend",
        &configuration.log_level,
        configuration.otlp_endpoint.as_deref(),
    );

    init_metrics();

    let qr_client = QrClient::new(configuration.backend.clone()).map_err(|e| {
        tracing::error!("Failed to create QR client: {}", e);
        anyhow::anyhow!("Client error: {}", e)
    })?;
    info!(backend = %qr_client.base_url(), "QR service client ready");

    let app = build_router(AppState::new(Arc::new(qr_client)));

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!("Starting qr-frontend on {}", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            tracing::error!("Server error: {}", e);
            anyhow::anyhow!("Server error: {}", e)
        })?;

    Ok(())
}
