//! Configuration schema
//!
//! Every player and recorder instance is constructed from one of these
//! structs. There is no process-wide mutable configuration: two players on the
//! same page can run with different rates and steps.

use crate::recorder::device::FacingMode;
use serde::{Deserialize, Serialize};

/// Top-level configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub player: PlayerConfig,
    pub recorder: RecorderConfig,
}

/// Per-player transport and engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerConfig {
    /// Playback rates offered to the user
    pub allowed_rates: Vec<f64>,

    /// Seconds moved by skip forward/backward
    pub seek_step_secs: f64,

    /// Amount added or removed by volume up/down
    pub volume_step: f64,

    /// Volume applied when the player is created
    pub initial_volume: f64,

    /// Rate applied when the player is created
    pub initial_rate: f64,

    /// Options handed to the adaptive engine on construction
    pub engine: EngineOptions,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            allowed_rates: vec![1.0, 1.5, 2.0],
            seek_step_secs: 5.0,
            volume_step: 0.1,
            initial_volume: 1.0,
            initial_rate: 1.0,
            engine: EngineOptions::default(),
        }
    }
}

impl PlayerConfig {
    /// Whether `rate` is one of the allowed rates
    pub fn allows_rate(&self, rate: f64) -> bool {
        self.allowed_rates
            .iter()
            .any(|allowed| (allowed - rate).abs() < f64::EPSILON)
    }
}

/// Adaptive engine construction options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOptions {
    /// Level to start on; -1 lets the engine pick
    pub start_level: i32,

    /// Maximum forward buffer in seconds
    pub max_buffer_length_secs: u32,

    /// Whether the engine may demux in a worker
    pub enable_worker: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            start_level: -1,
            max_buffer_length_secs: 10,
            enable_worker: true,
        }
    }
}

/// Per-recorder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderConfig {
    /// Camera facing requested on first acquisition
    pub facing: FacingMode,

    /// Whether to request a microphone track alongside video
    pub capture_audio: bool,

    /// Recording length limit in seconds; `None` disables it
    pub max_duration_secs: Option<u64>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            capture_audio: false,
            max_duration_secs: Some(5 * 60),
        }
    }
}
