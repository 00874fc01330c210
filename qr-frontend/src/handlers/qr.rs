use crate::components::{HeadlessDocument, QrModal, QrModalProps};
use crate::handlers::app::IndexTemplate;
use crate::services::ClientError;
use crate::AppState;
use askama::Template;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Form};
use serde::Deserialize;
use service_core::api::QrResponse;
use service_core::error::AppError;
use std::cell::RefCell;
use std::rc::Rc;

const UNREACHABLE_MESSAGE: &str = "Could not reach the QR service. Please try again.";
const UNEXPECTED_RESPONSE_MESSAGE: &str = "The QR service returned an unexpected response.";
const FALLBACK_FAILURE_MESSAGE: &str = "QR code generation failed.";

#[derive(Deserialize)]
pub struct QrForm {
    #[serde(rename = "rollNumber", default)]
    pub roll_number: String,
}

/// `POST /qr`: forward the roll number to qr-service and render the page
/// with either the modal open or an error banner.
pub async fn generate_qr_page(
    State(state): State<AppState>,
    Form(form): Form<QrForm>,
) -> Result<impl IntoResponse, AppError> {
    let roll_number = form.roll_number;
    let outcome = state.qr_client.generate_qr(&roll_number).await;

    let (status, page) = match outcome {
        Ok(QrResponse {
            success: true,
            image: Some(image),
            ..
        }) => {
            let modal_html = render_open_modal(QrModalProps {
                qr_image_base64: image,
                roll_number: roll_number.clone(),
            })?;
            tracing::info!(roll_number = %roll_number.trim(), "QR code rendered");
            (
                StatusCode::OK,
                IndexTemplate {
                    roll_number,
                    error: None,
                    modal_html: Some(modal_html),
                },
            )
        }
        Ok(QrResponse { success: true, .. }) => {
            tracing::error!("QR service reported success without an image");
            (
                StatusCode::BAD_GATEWAY,
                error_page(roll_number, UNEXPECTED_RESPONSE_MESSAGE),
            )
        }
        Ok(envelope) => {
            let message = envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string());
            tracing::warn!(code = ?envelope.code, message = %message, "QR service rejected request");
            (StatusCode::OK, error_page(roll_number, &message))
        }
        Err(e) => {
            tracing::error!(error = %e, "QR service call failed");
            let message = match e {
                ClientError::Decode { .. } => UNEXPECTED_RESPONSE_MESSAGE,
                ClientError::Request { .. } | ClientError::Build(_) => UNREACHABLE_MESSAGE,
            };
            (StatusCode::BAD_GATEWAY, error_page(roll_number, message))
        }
    };

    Ok((status, page))
}

fn error_page(roll_number: String, message: &str) -> IndexTemplate {
    IndexTemplate {
        roll_number,
        error: Some(message.to_string()),
        modal_html: None,
    }
}

/// Drive a modal into `Open` against a headless document and render it.
/// The browser-side script re-acquires the listener and scroll lock.
fn render_open_modal(props: QrModalProps) -> Result<String, AppError> {
    let document = Rc::new(RefCell::new(HeadlessDocument::new()));
    let mut modal = QrModal::new(document, props);
    modal.set_open(true);

    let view = modal
        .render()
        .ok_or_else(|| AppError::TemplateError("modal did not open".to_string()))?;
    view.render()
        .map_err(|e| AppError::TemplateError(e.to_string()))
}
