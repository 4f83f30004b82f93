use crate::scrapers::types::{DriverKind, SettleStrategy, SiteSelectors};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub collector: CollectorConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub base_url: String,
    pub output_path: String,
    pub driver: DriverKind,
    pub headless: bool,
    pub deduplicate: bool,
    /// Stop after this many extraction passes; unbounded when absent
    pub max_pages: Option<usize>,
    pub navigation_timeout_ms: u64,
    pub selector_timeout_ms: u64,
    pub initial_scroll_bottom_ms: u64,
    pub initial_scroll_top_ms: u64,
    pub initial_scroll_y: i64,
    pub load_more_settle_ms: u64,
    pub supplementary_scroll_px: i64,
    pub supplementary_scroll_ms: u64,
    pub settle: SettleStrategy,
    pub dom_quiet_ms: u64,
    pub selectors: SiteSelectors,
}

impl CollectorConfig {
    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Report invalid input with 500 like every other failure
    #[serde(default)]
    pub legacy_error_status: bool,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub model_path: String,
    #[serde(default = "default_preprocessor_path")]
    pub preprocessor_path: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://propertiesinyangon.com/rent/".to_string(),
            output_path: "properties.json".to_string(),
            driver: DriverKind::Chrome,
            headless: true,
            deduplicate: true,
            max_pages: None,
            navigation_timeout_ms: 60_000,
            selector_timeout_ms: 10_000,
            initial_scroll_bottom_ms: 2_000,
            initial_scroll_top_ms: 3_000,
            initial_scroll_y: 500,
            load_more_settle_ms: 3_000,
            supplementary_scroll_px: 300,
            supplementary_scroll_ms: 2_000,
            settle: SettleStrategy::Fixed,
            dom_quiet_ms: 500,
            selectors: SiteSelectors::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            service_name: default_service_name(),
            legacy_error_status: false,
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            preprocessor_path: default_preprocessor_path(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_service_name() -> String {
    "Myanmar Real Estate Price Predictor".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_model_path() -> String {
    "artifacts/model.json".to_string()
}

fn default_preprocessor_path() -> String {
    "artifacts/preprocessor.json".to_string()
}
