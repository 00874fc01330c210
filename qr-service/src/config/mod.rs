use service_core::config::{self as core_config, get_env_parsed};
use service_core::error::AppError;
use std::env;
use std::time::Duration;

const DEFAULT_MODULE_SIZE: u32 = 10;
const DEFAULT_QUIET_ZONE: u32 = 4;
const DEFAULT_LOGO_SCALE: f32 = 0.2;
const DEFAULT_GENERATION_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Error-correction level H recovers about 30% of the symbol; the logo has to
/// stay well inside that.
const MAX_LOGO_SCALE: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct QrServiceConfig {
    pub common: core_config::Config,
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// PNG composited over the centre of every code. A built-in badge is used when unset.
    pub logo_path: Option<String>,
    /// Pixels per QR module.
    pub module_size: u32,
    /// Quiet-zone width in modules.
    pub quiet_zone: u32,
    /// Logo width as a fraction of the full image width.
    pub logo_scale: f32,
    pub timeout_ms: u64,
    /// Generations allowed to run at once, counting timed-out ones that are
    /// still finishing on the blocking pool.
    pub max_concurrent: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            logo_path: None,
            module_size: DEFAULT_MODULE_SIZE,
            quiet_zone: DEFAULT_QUIET_ZONE,
            logo_scale: DEFAULT_LOGO_SCALE,
            timeout_ms: DEFAULT_GENERATION_TIMEOUT_MS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=64).contains(&self.module_size) {
            return Err(config_error(format!(
                "QR_MODULE_SIZE must be between 1 and 64, got {}",
                self.module_size
            )));
        }
        if self.quiet_zone > 16 {
            return Err(config_error(format!(
                "QR_QUIET_ZONE must be at most 16, got {}",
                self.quiet_zone
            )));
        }
        if !(self.logo_scale > 0.0 && self.logo_scale <= MAX_LOGO_SCALE) {
            return Err(config_error(format!(
                "QR_LOGO_SCALE must be in (0, {}], got {}",
                MAX_LOGO_SCALE, self.logo_scale
            )));
        }
        if self.timeout_ms == 0 {
            return Err(config_error(
                "QR_GENERATION_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        if !(1..=256).contains(&self.max_concurrent) {
            return Err(config_error(format!(
                "QR_MAX_CONCURRENT must be between 1 and 256, got {}",
                self.max_concurrent
            )));
        }
        Ok(())
    }
}

impl QrServiceConfig {
    pub fn load() -> Result<Self, AppError> {
        // Handles .env, the optional configuration file, APP__ variables and PORT.
        let common = core_config::Config::load()?;

        let defaults = GeneratorConfig::default();
        let generator = GeneratorConfig {
            logo_path: env::var("QR_LOGO_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            module_size: get_env_parsed("QR_MODULE_SIZE")?.unwrap_or(defaults.module_size),
            quiet_zone: get_env_parsed("QR_QUIET_ZONE")?.unwrap_or(defaults.quiet_zone),
            logo_scale: get_env_parsed("QR_LOGO_SCALE")?.unwrap_or(defaults.logo_scale),
            timeout_ms: get_env_parsed("QR_GENERATION_TIMEOUT_MS")?
                .unwrap_or(defaults.timeout_ms),
            max_concurrent: get_env_parsed("QR_MAX_CONCURRENT")?
                .unwrap_or(defaults.max_concurrent),
        };
        generator.validate()?;

        Ok(QrServiceConfig { common, generator })
    }
}

fn config_error(msg: String) -> AppError {
    AppError::ConfigError(anyhow::anyhow!(msg))
}
