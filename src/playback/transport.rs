//! Transport state model
//!
//! Commands go to the surface; position, duration, play/pause and fullscreen
//! flags only change when the surface reports them back through events.
//! Volume, mute and rate are applied to the state as soon as the surface has
//! been told, since the surface accepts them unconditionally.

use super::error::{PlaybackError, PlaybackResult};
use super::surface::{MediaSurface, SurfaceEvent};
use crate::config::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Derived playback state shown by the controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportState {
    /// Position in seconds, within `[0, duration]` once duration is known
    pub current_time: f64,
    /// Media duration in seconds, `None` until metadata has loaded
    pub duration: Option<f64>,
    pub is_playing: bool,
    pub is_muted: bool,
    /// Always within `[0, 1]`
    pub volume: f64,
    pub playback_rate: f64,
    pub is_fullscreen: bool,
}

impl TransportState {
    fn new(volume: f64, playback_rate: f64) -> Self {
        Self {
            current_time: 0.0,
            duration: None,
            is_playing: false,
            is_muted: false,
            volume,
            playback_rate,
            is_fullscreen: false,
        }
    }
}

/// Drives a media surface and tracks what it reports
pub struct TransportController {
    surface: Arc<dyn MediaSurface>,
    config: PlayerConfig,
    state: TransportState,
}

impl TransportController {
    /// Create a controller and push the configured volume and rate to the surface
    pub fn new(surface: Arc<dyn MediaSurface>, config: PlayerConfig) -> Self {
        let volume = clamp_volume(config.initial_volume).unwrap_or(1.0);
        let rate = if config.allows_rate(config.initial_rate) {
            config.initial_rate
        } else {
            config.allowed_rates.first().copied().unwrap_or(1.0)
        };

        surface.set_volume(volume);
        surface.set_playback_rate(rate);

        Self {
            surface,
            config,
            state: TransportState::new(volume, rate),
        }
    }

    pub fn state(&self) -> &TransportState {
        &self.state
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Forget position and duration when a new source is bound
    pub fn reset_media(&mut self) {
        self.state.current_time = 0.0;
        self.state.duration = None;
        self.state.is_playing = false;
    }

    // ---------------------------------------------------------------------
    // Play / pause
    // ---------------------------------------------------------------------

    pub fn play(&self) -> PlaybackResult<()> {
        self.surface
            .play()
            .map_err(|rejection| PlaybackError::Surface(rejection.to_string()))
    }

    pub fn pause(&self) {
        self.surface.pause();
    }

    /// Based on the last reported play state, not on the last command
    pub fn toggle_play_pause(&self) -> PlaybackResult<()> {
        if self.state.is_playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Pause and rewind to the start
    pub fn stop(&self) {
        self.pause();
        self.seek(0.0);
    }

    // ---------------------------------------------------------------------
    // Seeking
    // ---------------------------------------------------------------------

    fn known_duration(&self) -> Option<f64> {
        self.state.duration.or_else(|| {
            let duration = self.surface.duration();
            (duration.is_finite() && duration >= 0.0).then_some(duration)
        })
    }

    fn clamp_time(&self, seconds: f64) -> f64 {
        let lower = seconds.max(0.0);
        match self.known_duration() {
            Some(duration) => lower.min(duration),
            None => lower,
        }
    }

    /// Seek to `seconds`, clamped into `[0, duration]`. Returns the commanded time.
    pub fn seek(&self, seconds: f64) -> f64 {
        if !seconds.is_finite() {
            tracing::debug!("Ignoring non-finite seek target");
            return self.surface.current_time();
        }

        let target = self.clamp_time(seconds);
        self.surface.set_current_time(target);
        target
    }

    /// Seek relative to the surface's current position
    pub fn seek_relative(&self, delta: f64) -> f64 {
        self.seek(self.surface.current_time() + delta)
    }

    pub fn skip_forward(&self) -> f64 {
        self.seek_relative(self.config.seek_step_secs)
    }

    pub fn skip_backward(&self) -> f64 {
        self.seek_relative(-self.config.seek_step_secs)
    }

    /// Seek bar input; `fraction` is clamped to `[0, 1]`. No-op until the duration is known.
    pub fn seek_to_fraction(&self, fraction: f64) -> Option<f64> {
        let duration = self.known_duration()?;
        if !fraction.is_finite() {
            return None;
        }
        Some(self.seek(fraction.clamp(0.0, 1.0) * duration))
    }

    /// Position as a fraction of the duration, for the seek bar
    pub fn progress_fraction(&self) -> f64 {
        match self.state.duration {
            Some(duration) if duration > 0.0 => (self.state.current_time / duration).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Absolute "seek to time" text input
    ///
    /// Non-numeric text and targets outside `[0, duration]` are rejected
    /// without touching the surface.
    pub fn seek_to_input(&self, input: &str) -> PlaybackResult<f64> {
        let target = parse_seconds(input)?;
        let duration = self.known_duration().unwrap_or(0.0);

        if target < 0.0 || target > duration {
            return Err(PlaybackError::SeekOutOfRange { target, duration });
        }

        self.surface.set_current_time(target);
        Ok(target)
    }

    /// Relative "jump" text input, in whole seconds
    ///
    /// Only the leading integer is read, so `"15s"` jumps 15 seconds. A jump
    /// past the end is rejected; a jump before the start lands on 0.
    pub fn jump_by_input(&self, input: &str) -> PlaybackResult<f64> {
        let delta = parse_leading_whole_seconds(input)?;
        let target = self.surface.current_time() + delta;
        let duration = self.known_duration().unwrap_or(0.0);

        if target > duration {
            return Err(PlaybackError::SeekOutOfRange { target, duration });
        }

        let target = target.max(0.0);
        self.surface.set_current_time(target);
        Ok(target)
    }

    // ---------------------------------------------------------------------
    // Volume and rate
    // ---------------------------------------------------------------------

    /// Set the volume, clamped into `[0, 1]`. Returns the applied volume.
    pub fn set_volume(&mut self, volume: f64) -> f64 {
        let Some(volume) = clamp_volume(volume) else {
            return self.state.volume;
        };

        self.surface.set_volume(volume);
        self.state.volume = volume;
        volume
    }

    pub fn adjust_volume(&mut self, delta: f64) -> f64 {
        self.set_volume(self.surface.volume() + delta)
    }

    pub fn volume_up(&mut self) -> f64 {
        self.adjust_volume(self.config.volume_step)
    }

    pub fn volume_down(&mut self) -> f64 {
        self.adjust_volume(-self.config.volume_step)
    }

    /// Returns the new muted flag
    pub fn toggle_mute(&mut self) -> bool {
        let muted = !self.state.is_muted;
        self.surface.set_muted(muted);
        self.state.is_muted = muted;
        muted
    }

    /// Only rates from the configured set are accepted
    pub fn set_playback_rate(&mut self, rate: f64) -> PlaybackResult<()> {
        if !self.config.allows_rate(rate) {
            return Err(PlaybackError::UnsupportedRate(rate));
        }

        self.surface.set_playback_rate(rate);
        self.state.playback_rate = rate;
        tracing::debug!(rate, "Playback rate set");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Fullscreen
    // ---------------------------------------------------------------------

    /// Request the opposite of the last reported fullscreen state
    pub fn toggle_fullscreen(&self) -> PlaybackResult<()> {
        let result = if self.state.is_fullscreen {
            self.surface.exit_fullscreen()
        } else {
            self.surface.request_fullscreen()
        };

        result.map_err(|rejection| PlaybackError::Surface(rejection.to_string()))
    }

    // ---------------------------------------------------------------------
    // Surface events
    // ---------------------------------------------------------------------

    pub fn handle_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::TimeUpdate { current_time } => {
                if current_time.is_finite() {
                    self.state.current_time = self.clamp_time(current_time);
                }
            }
            SurfaceEvent::LoadedMetadata { duration } => {
                if duration.is_finite() && duration >= 0.0 {
                    self.state.duration = Some(duration);
                    self.state.current_time = self.state.current_time.min(duration);
                    tracing::debug!(duration, "Metadata loaded");
                }
            }
            SurfaceEvent::Play => self.state.is_playing = true,
            SurfaceEvent::Pause => self.state.is_playing = false,
            SurfaceEvent::FullscreenChange { fullscreen } => self.state.is_fullscreen = fullscreen,
        }
    }
}

fn clamp_volume(volume: f64) -> Option<f64> {
    (!volume.is_nan()).then(|| volume.clamp(0.0, 1.0))
}

fn parse_seconds(input: &str) -> PlaybackResult<f64> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| PlaybackError::InvalidSeekInput(input.to_string()))
}

/// Optional sign followed by digits; anything after the digits is ignored
fn parse_leading_whole_seconds(input: &str) -> PlaybackResult<f64> {
    let trimmed = input.trim_start();
    let digits_start = usize::from(trimmed.starts_with(['-', '+']));
    let digits_end = trimmed[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed.len(), |offset| digits_start + offset);

    trimmed[..digits_end]
        .parse::<i64>()
        .map(|value| value as f64)
        .map_err(|_| PlaybackError::InvalidSeekInput(input.to_string()))
}
