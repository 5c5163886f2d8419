//! Parameterized player
//!
//! One component covers every player layout: engine binding, quality model
//! and transport are shared, and the layout only changes which controls the
//! presentation layer shows. Failed commands never propagate; they become
//! notices that the presentation layer can display.

use super::binding::{BindingMode, EngineBinding};
use super::engine::EngineProvider;
use super::error::PlaybackError;
use super::quality::{QualityLevel, QualityModel, QualitySelection};
use super::source::PlaybackSource;
use super::surface::{MediaSurface, SurfaceEvent};
use super::transport::{TransportController, TransportState};
use crate::config::PlayerConfig;
use crate::utils::time::format_time;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Notices kept for `take_notices`; older ones are dropped first
pub const MAX_PENDING_NOTICES: usize = 32;

/// Which controls a layout exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSet {
    pub quality_selector: bool,
    pub rate_selector: bool,
    pub transport_buttons: bool,
    pub volume_buttons: bool,
    pub skip_buttons: bool,
    pub seek_bar: bool,
    pub time_input: bool,
    pub fullscreen_button: bool,
    /// Surface draws its own native control bar
    pub native_controls: bool,
}

impl ControlSet {
    /// Native controls plus quality and rate selectors
    pub fn minimal() -> Self {
        Self {
            quality_selector: true,
            rate_selector: true,
            transport_buttons: false,
            volume_buttons: false,
            skip_buttons: false,
            seek_bar: false,
            time_input: false,
            fullscreen_button: false,
            native_controls: true,
        }
    }

    /// Every custom control, no native bar
    pub fn full() -> Self {
        Self {
            quality_selector: true,
            rate_selector: true,
            transport_buttons: true,
            volume_buttons: true,
            skip_buttons: true,
            seek_bar: true,
            time_input: true,
            fullscreen_button: true,
            native_controls: false,
        }
    }
}

impl Default for ControlSet {
    fn default() -> Self {
        Self::minimal()
    }
}

/// Kind of user-visible notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    UnsupportedPlatform,
    InvalidInput,
    CommandRejected,
}

/// A message for the user produced by a failed command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl From<&PlaybackError> for Notice {
    fn from(error: &PlaybackError) -> Self {
        let kind = match error {
            PlaybackError::UnsupportedPlatform => NoticeKind::UnsupportedPlatform,
            PlaybackError::InvalidSeekInput(_)
            | PlaybackError::SeekOutOfRange { .. }
            | PlaybackError::UnknownLevel(_)
            | PlaybackError::InvalidSelection(_)
            | PlaybackError::UnsupportedRate(_) => NoticeKind::InvalidInput,
            PlaybackError::Surface(_) => NoticeKind::CommandRejected,
        };

        Self {
            kind,
            message: error.to_string(),
        }
    }
}

/// Events broadcast to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// A source was bound or cleared
    SourceChanged(BindingMode),
    /// The selector entries changed
    LevelsChanged(Vec<QualityLevel>),
    /// The selected entry changed
    SelectionChanged(QualitySelection),
    /// Something the user should be told about
    Notice(Notice),
}

/// Everything the presentation layer needs to render one frame of controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub source: Option<PlaybackSource>,
    pub mode: BindingMode,
    pub levels: Vec<QualityLevel>,
    pub selection: QualitySelection,
    pub transport: TransportState,
    pub controls: ControlSet,
    pub allowed_rates: Vec<f64>,
    pub time_label: String,
    pub duration_label: String,
}

/// Adaptive player bound to one media surface
pub struct Player {
    binding: EngineBinding,
    transport: TransportController,
    controls: ControlSet,
    notices: Vec<Notice>,
    unsupported_reported: bool,
    event_tx: broadcast::Sender<PlayerEvent>,
}

impl Player {
    pub fn new(
        surface: Arc<dyn MediaSurface>,
        provider: Arc<dyn EngineProvider>,
        config: PlayerConfig,
        controls: ControlSet,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let binding = EngineBinding::new(provider, Arc::clone(&surface), config.engine.clone());
        let transport = TransportController::new(surface, config);

        Self {
            binding,
            transport,
            controls,
            notices: Vec::new(),
            unsupported_reported: false,
            event_tx,
        }
    }

    /// Subscribe to player events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.event_tx.subscribe()
    }

    pub fn mode(&self) -> BindingMode {
        self.binding.mode()
    }

    pub fn binding(&self) -> &EngineBinding {
        &self.binding
    }

    pub fn transport(&self) -> &TransportState {
        self.transport.state()
    }

    pub fn controls(&self) -> ControlSet {
        self.controls
    }

    /// Notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, error: &PlaybackError) {
        tracing::warn!("{}", error);
        let notice = Notice::from(error);
        if self.notices.len() == MAX_PENDING_NOTICES {
            self.notices.remove(0);
        }
        self.notices.push(notice.clone());
        let _ = self.event_tx.send(PlayerEvent::Notice(notice));
    }

    /// Convert a command result into a notice. Returns whether it succeeded.
    fn report<T>(&mut self, result: Result<T, PlaybackError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.notify(&error);
                None
            }
        }
    }

    // ---------------------------------------------------------------------
    // Source and quality
    // ---------------------------------------------------------------------

    /// Point the player at a new source, rebuilding the engine
    pub fn set_source(&mut self, source: PlaybackSource) -> BindingMode {
        let mode = self.binding.bind(source);
        self.transport.reset_media();

        if mode == BindingMode::Unsupported && !self.unsupported_reported {
            self.unsupported_reported = true;
            self.notify(&PlaybackError::UnsupportedPlatform);
        }

        let _ = self.event_tx.send(PlayerEvent::SourceChanged(mode));
        let _ = self.event_tx.send(PlayerEvent::LevelsChanged(Vec::new()));
        mode
    }

    /// Unbind the current source
    pub fn clear_source(&mut self) {
        self.binding.unbind();
        self.transport.reset_media();
        let _ = self.event_tx.send(PlayerEvent::SourceChanged(BindingMode::Unbound));
    }

    /// Apply a quality choice from the selector
    pub fn select_quality(&mut self, selection: QualitySelection) -> bool {
        let before = self.binding.quality().selection();
        let result = self.binding.set_manual_level(selection);
        let applied = self.report(result).is_some();

        let after = self.binding.quality().selection();
        if after != before {
            let _ = self.event_tx.send(PlayerEvent::SelectionChanged(after));
        }
        applied
    }

    /// Apply a raw selector value such as `"auto"` or `"1"`
    pub fn select_quality_value(&mut self, value: &str) -> bool {
        match value.parse::<QualitySelection>() {
            Ok(selection) => self.select_quality(selection),
            Err(error) => {
                self.notify(&error);
                false
            }
        }
    }

    /// Apply queued engine events and broadcast what changed
    pub fn pump_engine_events(&mut self) -> usize {
        let before = self.binding.quality().clone();
        let applied = self.binding.pump_events();
        self.broadcast_quality_changes(&before);
        applied
    }

    /// Wait for one engine event, apply it and broadcast what changed
    pub async fn next_engine_event(&mut self) -> bool {
        let before = self.binding.quality().clone();
        let applied = self.binding.next_event().await;
        self.broadcast_quality_changes(&before);
        applied
    }

    fn broadcast_quality_changes(&self, before: &QualityModel) {
        let after = self.binding.quality();
        if after.levels() != before.levels() {
            let _ = self
                .event_tx
                .send(PlayerEvent::LevelsChanged(after.levels().to_vec()));
        }
        if after.selection() != before.selection() {
            let _ = self
                .event_tx
                .send(PlayerEvent::SelectionChanged(after.selection()));
        }
    }

    // ---------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------

    /// Feed an event emitted by the media surface
    pub fn handle_surface_event(&mut self, event: SurfaceEvent) {
        self.transport.handle_event(event);
    }

    pub fn play(&mut self) -> bool {
        let result = self.transport.play();
        self.report(result).is_some()
    }

    pub fn pause(&mut self) {
        self.transport.pause();
    }

    pub fn toggle_play_pause(&mut self) -> bool {
        let result = self.transport.toggle_play_pause();
        self.report(result).is_some()
    }

    pub fn stop(&mut self) {
        self.transport.stop();
    }

    pub fn seek(&mut self, seconds: f64) -> f64 {
        self.transport.seek(seconds)
    }

    pub fn seek_relative(&mut self, delta: f64) -> f64 {
        self.transport.seek_relative(delta)
    }

    pub fn skip_forward(&mut self) -> f64 {
        self.transport.skip_forward()
    }

    pub fn skip_backward(&mut self) -> f64 {
        self.transport.skip_backward()
    }

    pub fn seek_to_fraction(&mut self, fraction: f64) -> Option<f64> {
        self.transport.seek_to_fraction(fraction)
    }

    /// "Seek to time" text box
    pub fn seek_to_input(&mut self, input: &str) -> Option<f64> {
        let result = self.transport.seek_to_input(input);
        self.report(result)
    }

    /// "Jump" text box
    pub fn jump_by_input(&mut self, input: &str) -> Option<f64> {
        let result = self.transport.jump_by_input(input);
        self.report(result)
    }

    pub fn set_volume(&mut self, volume: f64) -> f64 {
        self.transport.set_volume(volume)
    }

    pub fn volume_up(&mut self) -> f64 {
        self.transport.volume_up()
    }

    pub fn volume_down(&mut self) -> f64 {
        self.transport.volume_down()
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.transport.toggle_mute()
    }

    pub fn set_playback_rate(&mut self, rate: f64) -> bool {
        let result = self.transport.set_playback_rate(rate);
        self.report(result).is_some()
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        let result = self.transport.toggle_fullscreen();
        self.report(result).is_some()
    }

    /// Current view of the player for rendering
    pub fn snapshot(&self) -> PlayerSnapshot {
        let transport = self.transport.state().clone();
        let quality = self.binding.quality();

        PlayerSnapshot {
            source: self.binding.source().cloned(),
            mode: self.binding.mode(),
            levels: quality.levels().to_vec(),
            selection: quality.selection(),
            time_label: format_time(transport.current_time),
            duration_label: format_time(transport.duration.unwrap_or(0.0)),
            transport,
            controls: self.controls,
            allowed_rates: self.transport.config().allowed_rates.clone(),
        }
    }
}
