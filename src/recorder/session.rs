//! Recording session
//!
//! Owns the capture stream, the recorder and the elapsed counter, and drives
//! them through the recording lifecycle. Resource ordering rules:
//! - the recorder is stopped before the stream it records is released
//! - the stream is released before a replacement is requested
//! - every exit path (stop, switch, retake, close, drop) releases what it holds

use super::clock::ElapsedCounter;
use super::device::{release_stream, CaptureConstraints, CaptureDevices, CaptureStream, FacingMode};
use super::engine::{RecorderFactory, RecorderId, RecordingEngine};
use super::error::{RecordingError, RecordingResult};
use super::state::{RecordingOutput, RecordingSegment, RecordingState};
use crate::config::RecorderConfig;
use crate::utils::time::format_secs;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{timeout_at, Instant};

/// Events emitted during recording
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    /// A capture stream was acquired
    Armed(FacingMode),
    /// Recording started
    Started,
    /// Recording paused
    Paused,
    /// Recording resumed
    Resumed,
    /// Recording stopped; finalization pending
    Stopped,
    /// A recorder delivered its output
    Finalized(RecorderId),
    /// Camera facing changed
    DeviceSwitched(FacingMode),
    /// Elapsed counter advanced (seconds)
    Tick(u64),
    /// Elapsed counter hit the configured limit (seconds)
    LimitReached(u64),
    /// Error occurred
    Error(String),
}

/// Serializable view of the session for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderSnapshot {
    pub state: RecordingState,
    pub facing: FacingMode,
    pub elapsed_secs: u64,
    pub elapsed_label: String,
    pub has_output: bool,
    pub output_size: Option<usize>,
    pub last_error: Option<String>,
}

struct ActiveRecorder {
    id: RecorderId,
    engine: Box<dyn RecordingEngine>,
}

/// A stopped recorder waiting for its finalize callback
struct PendingFinalize {
    id: RecorderId,
    engine: Box<dyn RecordingEngine>,
    elapsed_secs: u64,
    segments: Vec<RecordingSegment>,
    facing: FacingMode,
}

/// Camera recording lifecycle for one recorder widget
pub struct RecordingSession {
    devices: Arc<dyn CaptureDevices>,
    recorders: Arc<dyn RecorderFactory>,
    config: RecorderConfig,

    state: RecordingState,
    facing: FacingMode,

    stream: Option<Arc<dyn CaptureStream>>,
    recorder: Option<ActiveRecorder>,
    pending: Vec<PendingFinalize>,
    segments: Vec<RecordingSegment>,
    counter: ElapsedCounter,

    output: Option<RecordingOutput>,
    last_error: Option<RecordingError>,

    finalize_tx: mpsc::UnboundedSender<RecorderId>,
    finalize_rx: mpsc::UnboundedReceiver<RecorderId>,
    event_tx: broadcast::Sender<RecorderEvent>,
}

impl RecordingSession {
    pub fn new(
        devices: Arc<dyn CaptureDevices>,
        recorders: Arc<dyn RecorderFactory>,
        config: RecorderConfig,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (finalize_tx, finalize_rx) = mpsc::unbounded_channel();
        let counter = ElapsedCounter::new(config.max_duration_secs, event_tx.clone());

        Self {
            devices,
            recorders,
            facing: config.facing,
            config,
            state: RecordingState::Idle,
            stream: None,
            recorder: None,
            pending: Vec::new(),
            segments: Vec::new(),
            counter,
            output: None,
            last_error: None,
            finalize_tx,
            finalize_rx,
            event_tx,
        }
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecorderEvent> {
        self.event_tx.subscribe()
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.counter.elapsed_secs()
    }

    /// Output of the most recent finalized recording
    pub fn output(&self) -> Option<&RecordingOutput> {
        self.output.as_ref()
    }

    pub fn last_error(&self) -> Option<&RecordingError> {
        self.last_error.as_ref()
    }

    /// Whether a stopped recorder has not delivered its output yet
    pub fn is_finalizing(&self) -> bool {
        !self.pending.is_empty()
    }

    fn emit(&self, event: RecorderEvent) {
        let _ = self.event_tx.send(event);
    }

    fn ignore(&self, action: &str) -> bool {
        tracing::debug!("Ignoring {} while {:?}", action, self.state);
        false
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Request a capture stream for `facing`. Only valid from `Idle`.
    ///
    /// On failure the session stays `Idle` and the error is kept for display;
    /// retrying is up to the user.
    pub async fn acquire(&mut self, facing: FacingMode) -> RecordingResult<()> {
        if self.state != RecordingState::Idle {
            return Err(RecordingError::InvalidTransition {
                action: "acquire",
                state: self.state,
            });
        }

        self.facing = facing;
        let constraints = CaptureConstraints::video(facing).with_audio(self.config.capture_audio);

        tracing::info!("Requesting {} camera", facing.as_str());

        match self.devices.get_stream(&constraints).await {
            Ok(stream) => {
                self.stream = Some(stream);
                self.state = RecordingState::Armed;
                self.last_error = None;
                self.emit(RecorderEvent::Armed(facing));
                Ok(())
            }
            Err(error) => {
                let error = RecordingError::from(error);
                tracing::warn!("Camera acquisition failed: {}", error);
                self.last_error = Some(error.clone());
                self.emit(RecorderEvent::Error(error.to_string()));
                Err(error)
            }
        }
    }

    /// Start recording the armed stream
    pub fn start(&mut self) -> bool {
        if self.state != RecordingState::Armed {
            return self.ignore("start");
        }
        let Some(stream) = self.stream.as_ref() else {
            return self.ignore("start");
        };

        let id = RecorderId::new();
        let mut engine = self.recorders.create(Arc::clone(stream));
        engine.start();
        self.recorder = Some(ActiveRecorder { id, engine });

        self.segments.clear();
        self.segments.push(RecordingSegment::new(0));
        self.counter.reset();
        self.counter.start();

        self.state = RecordingState::Recording;
        self.emit(RecorderEvent::Started);

        tracing::info!("Recording started ({})", id);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state != RecordingState::Recording {
            return self.ignore("pause");
        }
        let Some(recorder) = self.recorder.as_mut() else {
            return self.ignore("pause");
        };

        recorder.engine.pause();
        if let Some(segment) = self.segments.last_mut() {
            segment.end();
        }
        self.counter.pause();

        self.state = RecordingState::Paused;
        self.emit(RecorderEvent::Paused);

        tracing::info!("Recording paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != RecordingState::Paused {
            return self.ignore("resume");
        }
        let Some(recorder) = self.recorder.as_mut() else {
            return self.ignore("resume");
        };

        recorder.engine.resume();
        self.segments.push(RecordingSegment::new(self.segments.len()));
        self.counter.start();

        self.state = RecordingState::Recording;
        self.emit(RecorderEvent::Resumed);

        tracing::info!("Recording resumed");
        true
    }

    /// Stop recording, release the camera and wait for finalization
    pub fn stop(&mut self) -> bool {
        if !self.state.is_capturing() {
            return self.ignore("stop");
        }

        self.stop_recorder();
        self.release_stream();
        self.counter.reset();

        self.state = RecordingState::Stopped;
        self.emit(RecorderEvent::Stopped);
        true
    }

    /// Stop if the elapsed counter has reached the configured limit
    pub fn stop_if_limit_reached(&mut self) -> bool {
        self.counter.limit_reached() && self.stop()
    }

    /// Switch to the opposite camera
    ///
    /// An in-flight recording is stopped first; its output is still delivered
    /// through the usual finalize path. Takes stopped earlier that have not
    /// finalized yet are discarded.
    pub async fn switch_device(&mut self) -> RecordingResult<()> {
        self.pending.clear();

        if self.state.is_capturing() {
            self.stop_recorder();
            self.counter.reset();
            self.emit(RecorderEvent::Stopped);
        }

        self.release_stream();
        self.state = RecordingState::Idle;

        let facing = self.facing.opposite();
        tracing::info!("Switching camera to {}", facing.as_str());
        self.emit(RecorderEvent::DeviceSwitched(facing));

        self.acquire(facing).await
    }

    /// Discard the last output and return to `Idle`
    pub fn retake(&mut self) -> bool {
        if self.state != RecordingState::Stopped {
            return self.ignore("retake");
        }

        // A recorder that has not finalized yet belongs to the discarded take
        self.pending.clear();
        self.output = None;
        self.segments.clear();
        self.state = RecordingState::Idle;

        tracing::info!("Retake requested");
        true
    }

    /// Release every resource the session holds and return to `Idle`
    pub fn close(&mut self) {
        self.counter.reset();

        if let Some(mut recorder) = self.recorder.take() {
            tracing::debug!("Stopping recorder {} on close", recorder.id);
            recorder.engine.stop(Box::new(|| {}));
        }
        self.pending.clear();
        self.release_stream();

        self.state = RecordingState::Idle;
    }

    // ---------------------------------------------------------------------
    // Finalization
    // ---------------------------------------------------------------------

    /// Apply any finalize callbacks that have fired. Returns the newest output accepted.
    pub fn poll_finalized(&mut self) -> Option<RecordingOutput> {
        let mut accepted = None;
        while let Ok(id) = self.finalize_rx.try_recv() {
            if let Some(output) = self.accept_finalized(id) {
                accepted = Some(output);
            }
        }
        accepted
    }

    /// Wait up to `timeout` for the pending recorder to finalize
    ///
    /// Returns `None` immediately when nothing is pending, and `None` when the
    /// recorder has not called back in time. The take stays pending in that
    /// case and can still be picked up by `poll_finalized`.
    pub async fn wait_finalized(&mut self, timeout: Duration) -> Option<RecordingOutput> {
        let deadline = Instant::now() + timeout;
        while !self.pending.is_empty() {
            let id = match timeout_at(deadline, self.finalize_rx.recv()).await {
                Ok(Some(id)) => id,
                Ok(None) => return None,
                Err(_) => {
                    tracing::warn!("Recorder did not finalize within {:?}", timeout);
                    return None;
                }
            };
            if let Some(output) = self.accept_finalized(id) {
                return Some(output);
            }
        }
        None
    }

    fn accept_finalized(&mut self, id: RecorderId) -> Option<RecordingOutput> {
        let Some(index) = self.pending.iter().position(|pending| pending.id == id) else {
            tracing::debug!("Discarding stale finalize from recorder {}", id);
            return None;
        };

        let pending = self.pending.remove(index);
        let output = RecordingOutput {
            recorder_id: pending.id,
            blob: pending.engine.blob(),
            elapsed_secs: pending.elapsed_secs,
            segments: pending.segments,
            facing: pending.facing,
        };

        tracing::info!(
            "Recording finalized: {} bytes, {}s",
            output.blob.as_ref().map(|b| b.size()).unwrap_or(0),
            output.elapsed_secs
        );

        self.output = Some(output.clone());
        self.emit(RecorderEvent::Finalized(id));
        Some(output)
    }

    // ---------------------------------------------------------------------
    // Resource helpers
    // ---------------------------------------------------------------------

    /// Stop the active recorder and queue it for finalization
    fn stop_recorder(&mut self) {
        let Some(mut recorder) = self.recorder.take() else {
            return;
        };

        if let Some(segment) = self.segments.last_mut() {
            segment.end();
        }

        let id = recorder.id;
        let finalize_tx = self.finalize_tx.clone();
        recorder.engine.stop(Box::new(move || {
            let _ = finalize_tx.send(id);
        }));

        self.pending.push(PendingFinalize {
            id,
            engine: recorder.engine,
            elapsed_secs: self.counter.elapsed_secs(),
            segments: std::mem::take(&mut self.segments),
            facing: self.facing,
        });

        tracing::info!("Recording stopped ({})", id);
    }

    fn release_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            let stopped = release_stream(stream.as_ref());
            tracing::debug!("Released capture stream ({} tracks)", stopped);
        }
    }

    /// Current view for rendering
    pub fn snapshot(&self) -> RecorderSnapshot {
        let elapsed_secs = self.counter.elapsed_secs();
        RecorderSnapshot {
            state: self.state,
            facing: self.facing,
            elapsed_secs,
            elapsed_label: format_secs(elapsed_secs),
            has_output: self.output.is_some(),
            output_size: self
                .output
                .as_ref()
                .and_then(|o| o.blob.as_ref())
                .map(|b| b.size()),
            last_error: self.last_error.as_ref().map(|e| e.to_string()),
        }
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.close();
    }
}
