//! QR-specific metric series. The recorder itself lives in
//! `service_core::observability::metrics`.

use metrics::{counter, histogram};

/// Record one generation attempt. `outcome` is `success` or an error code.
pub fn record_generation(outcome: &str, duration_secs: f64) {
    counter!("qr_generations_total", "outcome" => outcome.to_string()).increment(1);
    histogram!("qr_generation_duration_seconds", "outcome" => outcome.to_string())
        .record(duration_secs);
}
