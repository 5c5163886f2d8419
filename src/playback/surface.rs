//! Media surface contract
//!
//! The surface is the element that decodes and presents media. Engines attach
//! to it and the transport model drives it. Implementations are expected to
//! use interior mutability, the way a DOM element handle does.

use serde::{Deserialize, Serialize};

/// Error reported when the surface refuses a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRejection(pub String);

impl std::fmt::Display for SurfaceRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Imperative transport controls exposed by a renderable media element
pub trait MediaSurface: Send + Sync {
    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Request a new playback position
    fn set_current_time(&self, seconds: f64);

    /// Media duration in seconds; `NaN` until metadata is loaded
    fn duration(&self) -> f64;

    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);

    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);

    /// Start playback. May be rejected (autoplay policy, no source).
    fn play(&self) -> Result<(), SurfaceRejection>;

    fn pause(&self);

    /// Enter fullscreen. May be rejected (permission denied).
    fn request_fullscreen(&self) -> Result<(), SurfaceRejection>;

    fn exit_fullscreen(&self) -> Result<(), SurfaceRejection>;

    /// Whether the surface can decode the given container natively
    fn can_play_type(&self, mime: &str) -> bool;

    /// Assign a URI for native playback
    fn set_src(&self, uri: &str);

    /// Remove any natively assigned source
    fn clear_src(&self);
}

/// Events emitted by the surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceEvent {
    /// `timeupdate`
    TimeUpdate { current_time: f64 },
    /// `loadedmetadata`
    LoadedMetadata { duration: f64 },
    /// `play`
    Play,
    /// `pause`
    Pause,
    /// `fullscreenchange`
    FullscreenChange { fullscreen: bool },
}
