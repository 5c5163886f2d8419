//! Playback source descriptor

use serde::{Deserialize, Serialize};

/// MIME type a surface must report to play HLS manifests natively
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// The media a player is pointed at
///
/// Immutable once created. Re-targeting a player means building a new source
/// and binding it, which tears down the previous engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSource {
    /// Manifest or media URI
    pub uri: String,

    /// Optional poster image shown before playback
    pub poster: Option<String>,
}

impl PlaybackSource {
    /// Create a source without a poster
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            poster: None,
        }
    }

    /// Attach a poster image
    pub fn with_poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }

    /// URI path without query string or fragment
    fn path(&self) -> &str {
        let end = self
            .uri
            .find(|c: char| c == '?' || c == '#')
            .unwrap_or(self.uri.len());
        &self.uri[..end]
    }

    /// Whether the URI points at an HLS manifest
    pub fn is_adaptive_manifest(&self) -> bool {
        self.path().to_ascii_lowercase().ends_with(".m3u8")
    }

    /// Human readable name: the percent-decoded last path segment
    pub fn display_name(&self) -> String {
        let segment = self
            .path()
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();

        match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        }
    }
}
