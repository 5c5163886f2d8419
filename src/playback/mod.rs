//! Adaptive playback control
//!
//! This module binds a quality / rate / seek UI to an adaptive streaming
//! engine and a media surface:
//! - `binding`: engine lifecycle, one engine per bound source
//! - `quality`: Auto vs Manual level reconciliation
//! - `transport`: play/pause/seek/volume/rate/fullscreen state
//! - `player`: the single parameterized player built from the above

pub mod binding;
pub mod engine;
pub mod error;
pub mod player;
pub mod quality;
pub mod source;
pub mod surface;
pub mod transport;

pub use binding::{BindingMode, EngineBinding};
pub use engine::{AdaptiveEngine, EngineEvent, EngineEventSink, EngineId, EngineProvider};
pub use error::{PlaybackError, PlaybackResult};
pub use player::{ControlSet, Notice, NoticeKind, Player, PlayerEvent, PlayerSnapshot};
pub use quality::{EngineLevel, QualityLevel, QualityModel, QualitySelection, AUTO_LEVEL_ID};
pub use source::PlaybackSource;
pub use surface::{MediaSurface, SurfaceEvent, SurfaceRejection};
pub use transport::{TransportController, TransportState};
