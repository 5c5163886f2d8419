//! Error types and handling
//!
//! Crate-wide error type and its serializable form for the presentation layer.

use crate::config::ConfigError;
use crate::playback::PlaybackError;
use crate::recorder::RecordingError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Recording error: {0}")]
    Recording(#[from] RecordingError),
}

/// Error response for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        let code = match error {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Playback(PlaybackError::UnsupportedPlatform) => "UNSUPPORTED_PLATFORM",
            AppError::Playback(
                PlaybackError::InvalidSeekInput(_) | PlaybackError::SeekOutOfRange { .. },
            ) => "INVALID_SEEK_INPUT",
            AppError::Playback(_) => "PLAYBACK_ERROR",
            AppError::Recording(RecordingError::PermissionDenied(_)) => "PERMISSION_DENIED",
            AppError::Recording(RecordingError::NoDevice(_)) => "NO_DEVICE",
            AppError::Recording(_) => "RECORDING_ERROR",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self::from(&error)
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let response = ErrorResponse::from(AppError::from(PlaybackError::SeekOutOfRange {
            target: 130.0,
            duration: 120.0,
        }));
        assert_eq!(response.code, "INVALID_SEEK_INPUT");
        assert!(response.message.contains("130"));

        let response = ErrorResponse::from(AppError::from(RecordingError::PermissionDenied(
            "camera".to_string(),
        )));
        assert_eq!(response.code, "PERMISSION_DENIED");
    }
}
