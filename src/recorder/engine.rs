//! Recording engine contract
//!
//! A recording engine encodes a capture stream into a blob. Finalization is
//! asynchronous: the blob only becomes available after the callback passed to
//! `stop` has run.

use super::device::CaptureStream;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Identity of one recorder construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecorderId(Uuid);

impl RecorderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecorderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecorderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Encoded output of a finished recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedBlob {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl RecordedBlob {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Invoked once the engine has finished writing the blob
pub type FinalizeCallback = Box<dyn FnOnce() + Send>;

/// One recorder bound to one capture stream
pub trait RecordingEngine: Send {
    fn start(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);

    /// Stop capturing. `on_finalized` runs when the blob is ready, possibly later.
    fn stop(&mut self, on_finalized: FinalizeCallback);

    /// The encoded blob; `None` before finalization
    fn blob(&self) -> Option<RecordedBlob>;
}

/// Builds recorders for a stream
pub trait RecorderFactory: Send + Sync {
    fn create(&self, stream: Arc<dyn CaptureStream>) -> Box<dyn RecordingEngine>;
}
