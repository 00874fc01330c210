use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BackendSettings {
    /// Base URL of qr-service, without a trailing path.
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Whole-request timeout for calls to qr-service.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn configuration_directory() -> Result<PathBuf, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;

    // Running from the workspace root or from inside the crate
    Ok(if base_path.ends_with("qr-frontend") {
        base_path.join("config")
    } else {
        base_path.join("qr-frontend").join("config")
    })
}

/// Load settings from `config/base.yaml` (optional), then `APP_` prefixed
/// environment (`APP_SERVER__PORT=8080`), then the flat overrides
/// `QR_BACKEND_URL`, `LOG_LEVEL` and `OTLP_ENDPOINT`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let configuration_directory = configuration_directory()?;

    let settings = config::Config::builder()
        .set_default("server.host", default_host())?
        .set_default("backend.url", default_backend_url())?
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("backend.url", non_empty_env("QR_BACKEND_URL"))?
        .set_override_option("log_level", non_empty_env("LOG_LEVEL"))?
        .set_override_option("otlp_endpoint", non_empty_env("OTLP_ENDPOINT"))?
        .build()?;

    settings.try_deserialize::<Settings>()
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
