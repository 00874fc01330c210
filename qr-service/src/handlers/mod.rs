pub mod health;
pub mod qr;

pub use health::{health_check, metrics_endpoint, root};
pub use qr::generate_qr;
