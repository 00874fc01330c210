pub mod generator;
pub mod metrics;

pub use generator::{GeneratorError, LogoQrGenerator, QrGenerator};
pub use self::metrics::record_generation;
