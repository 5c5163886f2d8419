//! Quality level list and selection reconciliation
//!
//! The selection shown to the user is a fold over three event kinds: the
//! manifest being parsed, the engine reporting a level switch, and the user
//! picking a level. Whichever arrived last wins.

use super::error::PlaybackError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Control level value meaning "let the engine decide"
pub const AUTO_LEVEL_ID: i32 = -1;

/// Label shown for the auto sentinel
pub const AUTO_LABEL: &str = "Auto";

/// A rendition as reported by the engine when the manifest is parsed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineLevel {
    /// Vertical resolution in pixels
    pub height: Option<u32>,

    /// Advertised bandwidth in bits per second
    pub bitrate: Option<u64>,
}

impl EngineLevel {
    pub fn with_height(height: u32) -> Self {
        Self {
            height: Some(height),
            bitrate: None,
        }
    }
}

/// An entry in the quality selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityLevel {
    /// Engine level index, or `AUTO_LEVEL_ID` for the sentinel
    pub id: i32,
    pub label: String,
}

impl QualityLevel {
    /// The synthetic "Auto" entry
    pub fn auto() -> Self {
        Self {
            id: AUTO_LEVEL_ID,
            label: AUTO_LABEL.to_string(),
        }
    }

    pub fn is_auto(&self) -> bool {
        self.id == AUTO_LEVEL_ID
    }

    fn from_engine(index: usize, level: &EngineLevel) -> Self {
        let label = match (level.height, level.bitrate) {
            (Some(height), _) => format!("{}p", height),
            (None, Some(bitrate)) => format!("{} kbps", bitrate / 1000),
            (None, None) => format!("Level {}", index),
        };

        Self {
            id: index as i32,
            label,
        }
    }
}

/// Which level the UI shows as selected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "level", rename_all = "lowercase")]
pub enum QualitySelection {
    /// Engine chooses based on bandwidth and buffer
    #[default]
    Auto,
    /// Pinned to a level index
    Manual(i32),
}

impl QualitySelection {
    /// Build a selection from a raw control level, where -1 means auto
    pub fn from_level_id(id: i32) -> Self {
        if id == AUTO_LEVEL_ID {
            Self::Auto
        } else {
            Self::Manual(id)
        }
    }

    /// Control level value to write into the engine
    pub fn level_id(&self) -> i32 {
        match self {
            Self::Auto => AUTO_LEVEL_ID,
            Self::Manual(id) => *id,
        }
    }
}

impl FromStr for QualitySelection {
    type Err = PlaybackError;

    /// Parse a selector value: `"auto"`, `"-1"` or a level index
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }

        match value.parse::<i32>() {
            Ok(AUTO_LEVEL_ID) => Ok(Self::Auto),
            Ok(id) if id >= 0 => Ok(Self::Manual(id)),
            _ => Err(PlaybackError::InvalidSelection(value.to_string())),
        }
    }
}

/// Level list plus the current selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityModel {
    levels: Vec<QualityLevel>,
    selection: QualitySelection,
}

impl QualityModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector entries; empty until a manifest is parsed, otherwise Auto first
    pub fn levels(&self) -> &[QualityLevel] {
        &self.levels
    }

    pub fn selection(&self) -> QualitySelection {
        self.selection
    }

    /// Whether the manifest has been parsed for the current engine
    pub fn has_levels(&self) -> bool {
        !self.levels.is_empty()
    }

    /// Whether `id` is a selectable engine level
    pub fn contains(&self, id: i32) -> bool {
        self.levels.iter().any(|level| !level.is_auto() && level.id == id)
    }

    /// Forget everything; used when an engine is created or torn down
    pub fn reset(&mut self) {
        self.levels.clear();
        self.selection = QualitySelection::Auto;
    }

    /// Manifest parsed: rebuild the list and fall back to Auto
    pub fn on_manifest_parsed(&mut self, levels: &[EngineLevel]) {
        self.levels = std::iter::once(QualityLevel::auto())
            .chain(
                levels
                    .iter()
                    .enumerate()
                    .map(|(index, level)| QualityLevel::from_engine(index, level)),
            )
            .collect();
        self.selection = QualitySelection::Auto;
    }

    /// Engine switched levels on its own
    pub fn on_level_switched(&mut self, level: i32, auto_mode: bool) {
        self.selection = if auto_mode {
            QualitySelection::Auto
        } else {
            QualitySelection::Manual(level)
        };
    }

    /// User picked a level
    pub fn on_user_selection(&mut self, selection: QualitySelection) {
        self.selection = selection;
    }

    /// Label of the selected entry, if the list is populated
    pub fn selected_label(&self) -> Option<&str> {
        let id = self.selection.level_id();
        self.levels
            .iter()
            .find(|level| level.id == id)
            .map(|level| level.label.as_str())
    }
}
