//! Recording state management
//!
//! Defines the recording state machine and segment tracking.

use super::device::FacingMode;
use super::engine::{RecordedBlob, RecorderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current state of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No capture stream held
    Idle,
    /// Stream acquired, ready to record
    Armed,
    /// Currently recording
    Recording,
    /// Recording is paused
    Paused,
    /// Recording stopped; output arrives when the recorder finalizes
    Stopped,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

impl RecordingState {
    /// Whether a recorder is live in this state
    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Recording | Self::Paused)
    }
}

/// One continuous stretch of recording
///
/// A new segment is created each time recording starts or resumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSegment {
    /// Segment index (0, 1, 2, ...)
    pub index: usize,

    /// Wall-clock start
    pub started_at: DateTime<Utc>,

    /// Wall-clock end, once the segment is closed
    pub ended_at: Option<DateTime<Utc>>,

    /// Duration in milliseconds, once the segment is closed
    pub duration_ms: i64,
}

impl RecordingSegment {
    /// Create a new segment starting now
    pub fn new(index: usize) -> Self {
        Self {
            index,
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: 0,
        }
    }

    /// Close the segment. Closing twice keeps the first end time.
    pub fn end(&mut self) {
        if self.ended_at.is_some() {
            return;
        }
        let now = Utc::now();
        self.ended_at = Some(now);
        self.duration_ms = (now - self.started_at).num_milliseconds().max(0);
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Result of a finalized recording
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingOutput {
    /// Recorder that produced the blob
    pub recorder_id: RecorderId,

    /// Encoded media; `None` if the engine produced nothing
    pub blob: Option<RecordedBlob>,

    /// Elapsed counter value when recording stopped
    pub elapsed_secs: u64,

    /// Start/resume segments
    pub segments: Vec<RecordingSegment>,

    /// Camera the recording was made with
    pub facing: FacingMode,
}

impl RecordingOutput {
    /// Sum of closed segment durations in milliseconds
    pub fn total_duration_ms(&self) -> i64 {
        self.segments.iter().map(|s| s.duration_ms).sum()
    }
}
