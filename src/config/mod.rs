//! Player and recorder configuration
//!
//! - `schema`: serde types with defaults
//! - `loader`: JSON file read/write

pub mod loader;
pub mod schema;

pub use loader::{load_config, save_config, ConfigError, CONFIG_FILE_NAME};
pub use schema::{AppConfig, EngineOptions, PlayerConfig, RecorderConfig};
