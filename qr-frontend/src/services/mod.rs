pub mod qr_client;

pub use qr_client::{ClientError, QrClient};
