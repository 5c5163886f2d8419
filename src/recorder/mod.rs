//! Camera recording module
//!
//! - `device`: capture device and stream contracts
//! - `engine`: recording engine contract and recorder identity
//! - `session`: the recording lifecycle state machine
//! - `clock`: elapsed counter shown while recording

pub mod clock;
pub mod device;
pub mod engine;
pub mod error;
pub mod session;
pub mod state;

pub use device::{CaptureConstraints, CaptureDevices, CaptureError, FacingMode};
pub use engine::{RecordedBlob, RecorderFactory, RecorderId, RecordingEngine};
pub use error::{RecordingError, RecordingResult};
pub use session::{RecorderEvent, RecorderSnapshot, RecordingSession};
pub use state::{RecordingOutput, RecordingSegment, RecordingState};
