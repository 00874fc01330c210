#![allow(dead_code)]

use qr_service::config::{GeneratorConfig, QrServiceConfig};
use qr_service::models::RollNumber;
use qr_service::services::{GeneratorError, QrGenerator};
use qr_service::startup::{AppState, Application};
use service_core::config::Config as CoreConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

pub fn test_config() -> QrServiceConfig {
    QrServiceConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
        generator: GeneratorConfig::default(),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let app = Application::build(test_config())
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    pub async fn spawn_with_generator(generator: Arc<dyn QrGenerator>, timeout_ms: u64) -> Self {
        let mut config = test_config();
        config.generator.timeout_ms = timeout_ms;
        let app = Application::build_with_generator(config, generator)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    async fn start(app: Application) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn post_generate(&self, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/generate-qr", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// State for router-level tests that do not need a socket.
pub fn test_state(generator: Arc<dyn QrGenerator>, timeout_ms: u64) -> AppState {
    test_state_with_limit(generator, timeout_ms, GeneratorConfig::default().max_concurrent)
}

pub fn test_state_with_limit(
    generator: Arc<dyn QrGenerator>,
    timeout_ms: u64,
    max_concurrent: usize,
) -> AppState {
    let mut config = test_config();
    config.generator.timeout_ms = timeout_ms;
    config.generator.max_concurrent = max_concurrent;
    AppState::new(config, generator)
}

/// Generator that always fails.
pub struct FailingGenerator;

impl QrGenerator for FailingGenerator {
    fn generate(&self, _roll_number: &RollNumber) -> Result<Vec<u8>, GeneratorError> {
        Err(GeneratorError::Encode(qrcode::types::QrError::InvalidVersion))
    }
}

/// Generator that sleeps before answering.
pub struct SlowGenerator(pub Duration);

impl QrGenerator for SlowGenerator {
    fn generate(&self, _roll_number: &RollNumber) -> Result<Vec<u8>, GeneratorError> {
        std::thread::sleep(self.0);
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

/// Generator that panics.
pub struct PanickingGenerator;

impl QrGenerator for PanickingGenerator {
    fn generate(&self, _roll_number: &RollNumber) -> Result<Vec<u8>, GeneratorError> {
        panic!("generator exploded")
    }
}

/// Generator that sleeps and records how many calls overlapped.
pub struct CountingGenerator {
    delay: Duration,
    running: AtomicUsize,
    pub peak: AtomicUsize,
    pub calls: AtomicUsize,
}

impl CountingGenerator {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }
}

impl QrGenerator for CountingGenerator {
    fn generate(&self, _roll_number: &RollNumber) -> Result<Vec<u8>, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.running.fetch_sub(1, Ordering::SeqCst);
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}
