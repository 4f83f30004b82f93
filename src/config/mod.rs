mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use std::path::Path;
use tracing::debug;

/// Load configuration from `CONFIG_PATH` (default `config.yaml`), then apply
/// environment overrides. A missing file yields the defaults.
pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    let mut config = load_from(&config_path).await?;
    apply_env_overrides(&mut config, |key| env::var(key).ok())?;
    Ok(config)
}

pub async fn load_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from: {}", path.display());

    if !tokio::fs::try_exists(path).await? {
        debug!("No configuration file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let config_str = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.collector.max_pages == Some(0) {
        return Err(Error::config(
            "collector.max_pages must be at least 1; omit it for no cap",
        ));
    }
    Ok(())
}

/// Apply `CORS_ORIGINS`, `HOST`, `PORT`, `MODEL_PATH` and `PREPROCESSOR_PATH`.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(origins) = lookup("CORS_ORIGINS") {
        config.server.cors_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = port
            .parse()
            .map_err(|_| Error::config(format!("PORT must be a port number, got '{}'", port)))?;
    }
    if let Some(path) = lookup("MODEL_PATH") {
        config.model.model_path = path;
    }
    if let Some(path) = lookup("PREPROCESSOR_PATH") {
        config.model.preprocessor_path = path;
    }
    Ok(())
}
