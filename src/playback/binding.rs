//! Adaptive engine binding
//!
//! Owns at most one engine at a time in a single slot. Rebinding always
//! destroys the engine currently in the slot before the replacement is built,
//! and teardown reads the slot at call time rather than a copy taken when the
//! engine was created.

use super::engine::{AdaptiveEngine, EngineEvent, EngineEventSink, EngineId, EngineProvider};
use super::error::{PlaybackError, PlaybackResult};
use super::quality::{QualityModel, QualitySelection};
use super::source::{PlaybackSource, HLS_MIME_TYPE};
use super::surface::MediaSurface;
use crate::config::EngineOptions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

/// How the current source is being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingMode {
    /// No source bound
    Unbound,
    /// An adaptive engine is attached to the surface
    Engine,
    /// The surface plays the manifest itself; no quality control
    Native,
    /// Nothing can play this source
    Unsupported,
}

impl Default for BindingMode {
    fn default() -> Self {
        Self::Unbound
    }
}

struct LiveEngine {
    id: EngineId,
    engine: Box<dyn AdaptiveEngine>,
}

/// Binds one adaptive engine at a time to a media surface
pub struct EngineBinding {
    provider: Arc<dyn EngineProvider>,
    surface: Arc<dyn MediaSurface>,
    options: EngineOptions,

    /// The only place the live engine is stored
    slot: Option<LiveEngine>,

    mode: BindingMode,
    source: Option<PlaybackSource>,
    quality: QualityModel,

    events_tx: mpsc::UnboundedSender<(EngineId, EngineEvent)>,
    events_rx: mpsc::UnboundedReceiver<(EngineId, EngineEvent)>,
}

impl EngineBinding {
    pub fn new(
        provider: Arc<dyn EngineProvider>,
        surface: Arc<dyn MediaSurface>,
        options: EngineOptions,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            provider,
            surface,
            options,
            slot: None,
            mode: BindingMode::Unbound,
            source: None,
            quality: QualityModel::new(),
            events_tx,
            events_rx,
        }
    }

    pub fn mode(&self) -> BindingMode {
        self.mode
    }

    pub fn source(&self) -> Option<&PlaybackSource> {
        self.source.as_ref()
    }

    pub fn quality(&self) -> &QualityModel {
        &self.quality
    }

    /// Id of the engine currently in the slot
    pub fn engine_id(&self) -> Option<EngineId> {
        self.slot.as_ref().map(|live| live.id)
    }

    /// Whether the bound engine reports automatic level selection
    pub fn engine_auto_level(&self) -> Option<bool> {
        self.slot.as_ref().map(|live| live.engine.auto_level_enabled())
    }

    /// Bind a new source, tearing down whatever was bound before
    pub fn bind(&mut self, source: PlaybackSource) -> BindingMode {
        self.unbind();

        tracing::info!("Binding source: {}", source.uri);

        self.mode = if self.provider.is_supported() {
            let id = EngineId::new();
            let sink = EngineEventSink::new(id, self.events_tx.clone());

            let mut engine = self.provider.create(&self.options, sink);
            engine.load_source(&source.uri);
            engine.attach_media(Arc::clone(&self.surface));

            tracing::debug!("Engine {} attached", id);
            self.slot = Some(LiveEngine { id, engine });
            BindingMode::Engine
        } else if self.surface.can_play_type(HLS_MIME_TYPE) {
            tracing::info!("Adaptive engine unavailable, using native playback");
            self.surface.set_src(&source.uri);
            BindingMode::Native
        } else {
            tracing::warn!("No playback path for {}", source.uri);
            self.surface.clear_src();
            BindingMode::Unsupported
        };

        self.source = Some(source);
        self.mode
    }

    /// Tear down the current engine or native source. Safe to call repeatedly.
    pub fn unbind(&mut self) {
        if let Some(mut live) = self.slot.take() {
            tracing::debug!("Destroying engine {}", live.id);
            live.engine.destroy();
        }

        if self.mode == BindingMode::Native {
            self.surface.clear_src();
        }

        if self.mode != BindingMode::Unbound {
            tracing::info!("Unbound source");
        }

        self.quality.reset();
        self.source = None;
        self.mode = BindingMode::Unbound;
    }

    /// Apply a user quality choice
    ///
    /// Without an engine this does nothing. With a parsed manifest, unknown
    /// level ids are rejected and nothing changes.
    pub fn set_manual_level(&mut self, selection: QualitySelection) -> PlaybackResult<()> {
        let Some(live) = self.slot.as_mut() else {
            tracing::debug!("Ignoring quality selection in {:?} mode", self.mode);
            return Ok(());
        };

        if let QualitySelection::Manual(id) = selection {
            if id < 0 || (self.quality.has_levels() && !self.quality.contains(id)) {
                return Err(PlaybackError::UnknownLevel(id));
            }
        }

        live.engine.set_current_level(selection.level_id());
        self.quality.on_user_selection(selection);

        tracing::debug!("User selected quality {:?}", selection);
        Ok(())
    }

    /// Apply one engine event. Events from any engine other than the one in
    /// the slot are dropped and `false` is returned.
    pub fn handle_event(&mut self, source: EngineId, event: EngineEvent) -> bool {
        if self.engine_id() != Some(source) {
            tracing::debug!("Discarding stale event from engine {}", source);
            return false;
        }

        match event {
            EngineEvent::ManifestParsed { levels } => {
                tracing::info!("Manifest parsed with {} levels", levels.len());
                self.quality.on_manifest_parsed(&levels);
            }
            EngineEvent::LevelSwitched { level, auto_mode } => {
                tracing::debug!(level, auto_mode, "Engine switched level");
                self.quality.on_level_switched(level, auto_mode);
            }
        }

        true
    }

    /// Apply every queued engine event. Returns how many were accepted.
    pub fn pump_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((id, event)) = self.events_rx.try_recv() {
            if self.handle_event(id, event) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next engine event and apply it
    ///
    /// Returns whether it came from the live engine. The binding holds a
    /// sender itself, so this never resolves to a closed channel.
    pub async fn next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some((id, event)) => self.handle_event(id, event),
            None => false,
        }
    }
}

impl Drop for EngineBinding {
    fn drop(&mut self) {
        self.unbind();
    }
}
