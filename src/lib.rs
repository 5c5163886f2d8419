//! hls-videokit - adaptive playback control and camera recording for video widgets.
//!
//! This is the main library crate. It provides:
//! - `playback`: engine binding, quality selection and transport state for one player
//! - `recorder`: the camera recording session lifecycle
//! - `config`: per-instance player and recorder settings
//!
//! Platform facilities (adaptive engine, media element, capture devices,
//! recording encoder) are injected through the traits in those modules.

pub mod config;
pub mod playback;
pub mod recorder;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::{AppConfig, PlayerConfig, RecorderConfig};
pub use playback::{Player, PlayerEvent, PlayerSnapshot};
pub use recorder::{RecorderEvent, RecordingSession, RecordingState};
pub use utils::{AppError, AppResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "hls_videokit=debug";

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `default_filter`. Returns false if a
/// subscriber was already installed by the host application.
pub fn init_tracing(default_filter: &str) -> bool {
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Starting hls-videokit v{}", env!("CARGO_PKG_VERSION"));
    }

    installed
}
