use crate::error::QrError;
use crate::models::RollNumber;
use crate::services::{record_generation, QrGenerator};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use service_core::api::{GenerateQrRequest, QrResponse};
use service_core::middleware::RequestId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use validator::Validate;

const MALFORMED_BODY: &str = "Request body must be JSON like {\"rollNumber\": \"...\"}";

pub async fn generate_qr(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    payload: Result<Json<GenerateQrRequest>, JsonRejection>,
) -> Result<Json<QrResponse>, QrError> {
    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();
    let start = Instant::now();

    let result = handle(&state, payload).await;

    let outcome = match &result {
        Ok(_) => "success".to_string(),
        Err(e) => e.code().to_string(),
    };
    record_generation(&outcome, start.elapsed().as_secs_f64());
    tracing::info!(
        request_id = %request_id,
        outcome = %outcome,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "generate-qr finished"
    );

    result.map(Json)
}

async fn handle(
    state: &AppState,
    payload: Result<Json<GenerateQrRequest>, JsonRejection>,
) -> Result<QrResponse, QrError> {
    let Json(payload) = payload.map_err(|rejection| {
        tracing::debug!(rejection = %rejection.body_text(), "Unreadable generate-qr body");
        QrError::InvalidInput(MALFORMED_BODY.to_string())
    })?;

    payload
        .validate()
        .map_err(|errors| QrError::InvalidInput(first_message(&errors)))?;

    let roll_number = payload
        .roll_number
        .as_deref()
        .and_then(RollNumber::parse)
        .ok_or_else(|| QrError::InvalidInput("Roll number is required".to_string()))?;

    let png = run_generator(
        state.generator.clone(),
        state.generation_slots.clone(),
        roll_number.clone(),
        state.config.generator.timeout(),
    )
    .await?;

    tracing::info!(roll_number = %roll_number, bytes = png.len(), "Generated QR code");

    Ok(QrResponse::success(STANDARD.encode(png)))
}

/// Run the generator on the blocking pool, giving up after `timeout`.
///
/// Waiting for a slot counts against `timeout`. The slot is held by the
/// blocking task itself, so a timed-out generation keeps its slot until its
/// thread finishes and at most `slots` threads are ever busy generating.
pub async fn run_generator(
    generator: Arc<dyn QrGenerator>,
    slots: Arc<Semaphore>,
    roll_number: RollNumber,
    timeout: Duration,
) -> Result<Vec<u8>, QrError> {
    let generation = async move {
        let permit = slots
            .acquire_owned()
            .await
            .map_err(|e| QrError::Generation(anyhow::anyhow!("generation slots closed: {}", e)))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            generator.generate(&roll_number)
        })
        .await
        .map_err(|join_error| {
            QrError::Generation(anyhow::anyhow!("generator task failed: {}", join_error))
        })?
        .map_err(QrError::from)
    };

    tokio::time::timeout(timeout, generation)
        .await
        .map_err(|_| QrError::Timeout(timeout))?
}

fn first_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Roll number is required".to_string())
}
