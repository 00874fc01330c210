use crate::services::GeneratorError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use service_core::api::{ErrorCode, QrResponse};
use std::time::Duration;
use thiserror::Error;

/// Per-request failure of `POST /api/generate-qr`.
///
/// Every variant is rendered as a `{ success: false, message, code }` envelope.
#[derive(Debug, Error)]
pub enum QrError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("QR generation failed: {0:#}")]
    Generation(anyhow::Error),

    #[error("QR generation timed out after {0:?}")]
    Timeout(Duration),
}

impl QrError {
    pub fn code(&self) -> ErrorCode {
        match self {
            QrError::InvalidInput(_) => ErrorCode::InvalidInput,
            QrError::Generation(_) => ErrorCode::GenerationFailed,
            QrError::Timeout(_) => ErrorCode::GenerationTimeout,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            QrError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            QrError::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            QrError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Message sent to the caller. Internal causes stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            QrError::InvalidInput(msg) => msg.clone(),
            QrError::Generation(_) => "Failed to generate QR code".to_string(),
            QrError::Timeout(_) => "QR code generation timed out".to_string(),
        }
    }
}

/// Shown when the roll number exceeds the capacity of the largest QR symbol.
pub const TOO_LONG_MESSAGE: &str = "Roll number is too long to encode";

impl From<GeneratorError> for QrError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::Encode(qrcode::types::QrError::DataTooLong) => {
                QrError::InvalidInput(TOO_LONG_MESSAGE.to_string())
            }
            other => QrError::Generation(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for QrError {
    fn into_response(self) -> Response {
        match &self {
            QrError::InvalidInput(msg) => tracing::info!(reason = %msg, "Rejected QR request"),
            QrError::Generation(err) => tracing::error!(error = ?err, "QR generation failed"),
            QrError::Timeout(after) => tracing::error!(timeout = ?after, "QR generation timed out"),
        }

        (
            self.status_code(),
            Json(QrResponse::failure(self.code(), self.public_message())),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn invalid_input_is_400_with_message() {
        let response = QrError::InvalidInput("Roll number is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Roll number is required");
        assert_eq!(json["code"], "invalid_input");
        assert!(json.get("image").is_none());
    }

    #[tokio::test]
    async fn generation_failure_hides_cause() {
        let response =
            QrError::Generation(anyhow::anyhow!("disk on fire at /var/secret")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["message"], "Failed to generate QR code");
        assert_eq!(json["code"], "generation_failed");
    }

    #[test]
    fn oversized_payload_is_invalid_input() {
        let err = QrError::from(GeneratorError::Encode(
            qrcode::types::QrError::DataTooLong,
        ));

        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), TOO_LONG_MESSAGE);
    }

    #[test]
    fn other_encode_failures_stay_generation_errors() {
        let err = QrError::from(GeneratorError::Encode(
            qrcode::types::QrError::InvalidVersion,
        ));

        assert_eq!(err.code(), ErrorCode::GenerationFailed);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn timeout_is_504() {
        let response = QrError::Timeout(Duration::from_millis(5)).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body_json(response).await["code"], "generation_timeout");
    }
}
