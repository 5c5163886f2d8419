//! Playback error types
//!
//! Errors raised by the engine binding and the transport model. None of these
//! are fatal; the player converts them into notices for the presentation layer.

use thiserror::Error;

/// Playback-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Neither the adaptive engine nor native playback is available for this source")]
    UnsupportedPlatform,

    #[error("Unknown quality level: {0}")]
    UnknownLevel(i32),

    #[error("Invalid quality selection: {0}")]
    InvalidSelection(String),

    #[error("Unsupported playback rate: {0}")]
    UnsupportedRate(f64),

    #[error("Invalid seek input: {0:?}")]
    InvalidSeekInput(String),

    #[error("Seek target {target}s is outside the media duration ({duration}s)")]
    SeekOutOfRange { target: f64, duration: f64 },

    #[error("Media surface rejected command: {0}")]
    Surface(String),
}

/// Result type alias for playback operations
pub type PlaybackResult<T> = Result<T, PlaybackError>;
