//! Configuration file read/write
//!
//! Configuration is stored as a single pretty-printed JSON document. A missing
//! file is not an error; the defaults are used instead.

use super::schema::AppConfig;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "videokit.json";

/// Read configuration from `path`, falling back to defaults if it does not exist
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    validate(&config)?;

    tracing::debug!("Loaded config from {:?}", path);

    Ok(config)
}

/// Write configuration to `path`, creating parent directories as needed
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    validate(config)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;

    tracing::debug!("Saved config to {:?}", path);

    Ok(())
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let player = &config.player;

    if player.allowed_rates.is_empty() {
        return Err(ConfigError::Invalid("allowedRates must not be empty".to_string()));
    }
    if player.allowed_rates.iter().any(|r| !r.is_finite() || *r <= 0.0) {
        return Err(ConfigError::Invalid("allowedRates must be positive".to_string()));
    }
    if !player.allows_rate(player.initial_rate) {
        return Err(ConfigError::Invalid(format!(
            "initialRate {} is not in allowedRates",
            player.initial_rate
        )));
    }
    if !(0.0..=1.0).contains(&player.initial_volume) {
        return Err(ConfigError::Invalid("initialVolume must be within [0, 1]".to_string()));
    }
    if config.recorder.max_duration_secs == Some(0) {
        return Err(ConfigError::Invalid("maxDurationSecs must be non-zero".to_string()));
    }

    Ok(())
}
