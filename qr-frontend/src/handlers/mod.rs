pub mod app;
pub mod qr;

pub use app::{health_check, index, metrics, IndexTemplate};
pub use qr::{generate_qr_page, QrForm};
