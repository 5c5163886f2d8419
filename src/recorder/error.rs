//! Recording error types

use super::device::CaptureError;
use super::state::RecordingState;
use thiserror::Error;

/// Recording-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordingError {
    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("No capture device available: {0}")]
    NoDevice(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Cannot {action} while {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: RecordingState,
    },
}

impl From<CaptureError> for RecordingError {
    fn from(error: CaptureError) -> Self {
        match error {
            CaptureError::PermissionDenied(message) => RecordingError::PermissionDenied(message),
            CaptureError::NotFound(message) => RecordingError::NoDevice(message),
            CaptureError::Other(message) => RecordingError::Device(message),
        }
    }
}

/// Result type alias for recording operations
pub type RecordingResult<T> = Result<T, RecordingError>;
