pub mod components;
pub mod config;
pub mod handlers;
pub mod services;
pub mod startup;

use services::qr_client::QrClient;
use std::sync::Arc;

/// Shared application state containing the backend client.
#[derive(Clone)]
pub struct AppState {
    pub qr_client: Arc<QrClient>,
}

impl AppState {
    pub fn new(qr_client: Arc<QrClient>) -> Self {
        Self { qr_client }
    }
}
