use askama::Template;
use axum::response::IntoResponse;

/// The single page: form, optional error banner, optional open modal.
#[derive(Template, Default)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub roll_number: String,
    pub error: Option<String>,
    /// Pre-rendered `qr_modal.html`.
    pub modal_html: Option<String>,
}

pub async fn index() -> impl IntoResponse {
    IndexTemplate::default()
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn metrics() -> impl IntoResponse {
    (
        [("content-type", "text/plain; charset=utf-8")],
        service_core::observability::get_metrics(),
    )
}
