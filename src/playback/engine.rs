//! Adaptive streaming engine contract
//!
//! Engines are created by an `EngineProvider` and report asynchronous events
//! through an `EngineEventSink`. Every event is tagged with the id of the
//! engine that produced it so the binding can drop events from handles it has
//! already torn down.

use super::quality::EngineLevel;
use super::surface::MediaSurface;
use crate::config::EngineOptions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identity of one engine construction
///
/// Two binds of the same URI produce two different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EngineId(Uuid);

impl EngineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EngineId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Events emitted by an engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineEvent {
    /// The manifest was parsed and the rendition ladder is known
    ManifestParsed { levels: Vec<EngineLevel> },
    /// The engine started presenting a different level
    LevelSwitched { level: i32, auto_mode: bool },
}

/// Sending half handed to each engine on construction
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    id: EngineId,
    tx: mpsc::UnboundedSender<(EngineId, EngineEvent)>,
}

impl EngineEventSink {
    pub(crate) fn new(id: EngineId, tx: mpsc::UnboundedSender<(EngineId, EngineEvent)>) -> Self {
        Self { id, tx }
    }

    pub fn engine_id(&self) -> EngineId {
        self.id
    }

    /// Queue an event for the owning player. Returns false once the player is gone.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx.send((self.id, event)).is_ok()
    }
}

/// One live adaptive streaming engine
pub trait AdaptiveEngine: Send {
    /// Start fetching the manifest at `uri`
    fn load_source(&mut self, uri: &str);

    /// Attach to the surface that will present decoded media
    fn attach_media(&mut self, surface: Arc<dyn MediaSurface>);

    /// Set the control level; `-1` re-enables automatic selection
    fn set_current_level(&mut self, level: i32);

    /// Whether the engine is currently choosing levels itself
    fn auto_level_enabled(&self) -> bool;

    /// Release decode resources, detach from the surface and stop emitting events
    fn destroy(&mut self);
}

/// Factory for engines on the current platform
pub trait EngineProvider: Send + Sync {
    /// Whether engines can run on this platform at all
    fn is_supported(&self) -> bool;

    /// Construct a new engine. The engine must not emit events after `destroy`.
    fn create(&self, options: &EngineOptions, events: EngineEventSink) -> Box<dyn AdaptiveEngine>;
}
