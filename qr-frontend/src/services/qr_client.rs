use crate::config::BackendSettings;
use reqwest::Client;
use service_core::api::{GenerateQrRequest, QrResponse, GENERATE_QR_PATH};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure, timeout: the backend never answered.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with something other than a QR envelope.
    #[error("response from {url} (status {status}) is not a QR envelope: {source}")]
    Decode {
        url: String,
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

/// Thin wrapper around `POST /api/generate-qr`.
///
/// Performs no validation of its own and never retries: whatever envelope the
/// backend sends, including `success: false`, is handed back as `Ok`.
pub struct QrClient {
    client: Client,
    settings: BackendSettings,
}

impl QrClient {
    pub fn new(settings: BackendSettings) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.url
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.settings.url.trim_end_matches('/'),
            GENERATE_QR_PATH
        )
    }

    pub async fn generate_qr(&self, roll_number: &str) -> Result<QrResponse, ClientError> {
        let url = self.endpoint();

        let response = self
            .client
            .post(&url)
            .json(&GenerateQrRequest::new(roll_number))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                ClientError::Request {
                    url: url.clone(),
                    source: e,
                }
            })?;

        let status = response.status();
        let envelope = response.json::<QrResponse>().await.map_err(|e| {
            tracing::error!(status = status.as_u16(), "Undecodable response from {}: {}", url, e);
            ClientError::Decode {
                url: url.clone(),
                status: status.as_u16(),
                source: e,
            }
        })?;

        tracing::debug!(
            status = status.as_u16(),
            success = envelope.success,
            "QR service responded"
        );

        Ok(envelope)
    }
}
