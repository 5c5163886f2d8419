//! Capture device contract
//!
//! Platform-agnostic traits for camera/microphone acquisition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Which camera to use on devices with more than one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera
    User,
    /// Rear camera
    Environment,
}

impl FacingMode {
    pub fn opposite(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

/// What to ask the capture API for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConstraints {
    /// Camera facing
    pub facing: FacingMode,

    /// Specific device, overriding `facing` when set
    pub device_id: Option<String>,

    /// Whether to include a microphone track
    pub audio: bool,
}

impl CaptureConstraints {
    pub fn video(facing: FacingMode) -> Self {
        Self {
            facing,
            device_id: None,
            audio: false,
        }
    }

    pub fn with_audio(mut self, audio: bool) -> Self {
        self.audio = audio;
        self
    }
}

/// Failures reported by the capture API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No matching device: {0}")]
    NotFound(String),

    #[error("Capture failed: {0}")]
    Other(String),
}

/// Media type of a capture track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

/// One camera or microphone track
pub trait CaptureTrack: Send + Sync {
    fn kind(&self) -> TrackKind;

    /// Stop the track and release the underlying device
    fn stop(&self);
}

/// A live capture stream
pub trait CaptureStream: Send + Sync {
    fn tracks(&self) -> Vec<Arc<dyn CaptureTrack>>;
}

/// Entry point of the platform capture API
#[async_trait]
pub trait CaptureDevices: Send + Sync {
    /// Request a stream matching `constraints`. May prompt the user.
    async fn get_stream(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Arc<dyn CaptureStream>, CaptureError>;
}

/// Stop every track of a stream
pub fn release_stream(stream: &dyn CaptureStream) -> usize {
    let tracks = stream.tracks();
    for track in &tracks {
        track.stop();
    }
    tracks.len()
}
