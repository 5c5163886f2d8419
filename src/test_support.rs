//! In-memory fakes for the platform contracts
//!
//! Every fake writes to a shared `Journal` so tests can assert on the order in
//! which resources were created and released.

use crate::config::EngineOptions;
use crate::playback::engine::{AdaptiveEngine, EngineEventSink, EngineProvider};
use crate::playback::surface::{MediaSurface, SurfaceRejection};
use crate::recorder::device::{
    CaptureConstraints, CaptureDevices, CaptureError, CaptureStream, CaptureTrack, TrackKind,
};
use crate::recorder::engine::{FinalizeCallback, RecordedBlob, RecorderFactory, RecordingEngine};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

/// Ordered log of side effects
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Entries starting with `prefix`
    pub fn filtered(&self, prefix: &str) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Number of entries containing `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.contains(needle))
            .count()
    }
}

// -------------------------------------------------------------------------
// Media surface
// -------------------------------------------------------------------------

#[derive(Debug)]
struct SurfaceState {
    current_time: f64,
    duration: f64,
    volume: f64,
    muted: bool,
    playback_rate: f64,
    paused: bool,
    src: Option<String>,
    reject_play: bool,
    reject_fullscreen: bool,
}

pub struct FakeSurface {
    journal: Journal,
    native_hls: bool,
    state: Mutex<SurfaceState>,
}

impl FakeSurface {
    pub fn new(journal: &Journal) -> Arc<Self> {
        Self::build(journal, false)
    }

    /// A surface that can play HLS manifests without an engine
    pub fn with_native_hls(journal: &Journal) -> Arc<Self> {
        Self::build(journal, true)
    }

    fn build(journal: &Journal, native_hls: bool) -> Arc<Self> {
        Arc::new(Self {
            journal: journal.clone(),
            native_hls,
            state: Mutex::new(SurfaceState {
                current_time: 0.0,
                duration: f64::NAN,
                volume: 1.0,
                muted: false,
                playback_rate: 1.0,
                paused: true,
                src: None,
                reject_play: false,
                reject_fullscreen: false,
            }),
        })
    }

    pub fn set_duration(&self, duration: f64) {
        self.state.lock().duration = duration;
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn reject_play(&self, reject: bool) {
        self.state.lock().reject_play = reject;
    }

    pub fn reject_fullscreen(&self, reject: bool) {
        self.state.lock().reject_fullscreen = reject;
    }

    pub fn src(&self) -> Option<String> {
        self.state.lock().src.clone()
    }
}

impl MediaSurface for FakeSurface {
    fn current_time(&self) -> f64 {
        self.state.lock().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        self.state.lock().current_time = seconds;
    }

    fn duration(&self) -> f64 {
        self.state.lock().duration
    }

    fn volume(&self) -> f64 {
        self.state.lock().volume
    }

    fn set_volume(&self, volume: f64) {
        self.state.lock().volume = volume;
    }

    fn muted(&self) -> bool {
        self.state.lock().muted
    }

    fn set_muted(&self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn playback_rate(&self) -> f64 {
        self.state.lock().playback_rate
    }

    fn set_playback_rate(&self, rate: f64) {
        self.state.lock().playback_rate = rate;
    }

    fn play(&self) -> Result<(), SurfaceRejection> {
        let mut state = self.state.lock();
        if state.reject_play {
            return Err(SurfaceRejection("play() was rejected".to_string()));
        }
        state.paused = false;
        self.journal.record("surface play");
        Ok(())
    }

    fn pause(&self) {
        self.state.lock().paused = true;
        self.journal.record("surface pause");
    }

    fn request_fullscreen(&self) -> Result<(), SurfaceRejection> {
        if self.state.lock().reject_fullscreen {
            return Err(SurfaceRejection("fullscreen not permitted".to_string()));
        }
        self.journal.record("surface fullscreen enter");
        Ok(())
    }

    fn exit_fullscreen(&self) -> Result<(), SurfaceRejection> {
        self.journal.record("surface fullscreen exit");
        Ok(())
    }

    fn can_play_type(&self, mime: &str) -> bool {
        self.native_hls && mime == crate::playback::source::HLS_MIME_TYPE
    }

    fn set_src(&self, uri: &str) {
        self.state.lock().src = Some(uri.to_string());
        self.journal.record(format!("surface src {}", uri));
    }

    fn clear_src(&self) {
        self.state.lock().src = None;
        self.journal.record("surface src cleared");
    }
}

// -------------------------------------------------------------------------
// Adaptive engine
// -------------------------------------------------------------------------

/// Observable state of one fake engine
#[derive(Debug, Clone, PartialEq)]
pub struct FakeEngineState {
    pub source: Option<String>,
    pub attached: bool,
    pub current_level: i32,
    pub destroyed: bool,
}

struct FakeEngine {
    index: usize,
    journal: Journal,
    state: Arc<Mutex<FakeEngineState>>,
}

impl AdaptiveEngine for FakeEngine {
    fn load_source(&mut self, uri: &str) {
        self.state.lock().source = Some(uri.to_string());
        self.journal.record(format!("engine#{} load {}", self.index, uri));
    }

    fn attach_media(&mut self, _surface: Arc<dyn MediaSurface>) {
        self.state.lock().attached = true;
        self.journal.record(format!("engine#{} attach", self.index));
    }

    fn set_current_level(&mut self, level: i32) {
        self.state.lock().current_level = level;
        self.journal.record(format!("engine#{} level {}", self.index, level));
    }

    fn auto_level_enabled(&self) -> bool {
        self.state.lock().current_level == -1
    }

    fn destroy(&mut self) {
        let mut state = self.state.lock();
        state.destroyed = true;
        state.attached = false;
        self.journal.record(format!("engine#{} destroy", self.index));
    }
}

#[derive(Default)]
struct ProviderState {
    engines: Vec<Arc<Mutex<FakeEngineState>>>,
    sinks: Vec<EngineEventSink>,
}

pub struct FakeEngineProvider {
    journal: Journal,
    supported: bool,
    state: Mutex<ProviderState>,
}

impl FakeEngineProvider {
    pub fn supported(journal: &Journal) -> Arc<Self> {
        Self::build(journal, true)
    }

    pub fn unsupported(journal: &Journal) -> Arc<Self> {
        Self::build(journal, false)
    }

    fn build(journal: &Journal, supported: bool) -> Arc<Self> {
        Arc::new(Self {
            journal: journal.clone(),
            supported,
            state: Mutex::new(ProviderState::default()),
        })
    }

    /// Event sink handed to the `n`th engine
    pub fn sink(&self, n: usize) -> EngineEventSink {
        self.state.lock().sinks[n].clone()
    }

    /// Snapshot of the `n`th engine
    pub fn engine(&self, n: usize) -> FakeEngineState {
        self.state.lock().engines[n].lock().clone()
    }

    pub fn created_count(&self) -> usize {
        self.state.lock().engines.len()
    }

    /// Engines created and not yet destroyed
    pub fn live_count(&self) -> usize {
        self.state
            .lock()
            .engines
            .iter()
            .filter(|engine| !engine.lock().destroyed)
            .count()
    }
}

impl EngineProvider for FakeEngineProvider {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, options: &EngineOptions, events: EngineEventSink) -> Box<dyn AdaptiveEngine> {
        let mut provider = self.state.lock();
        let index = provider.engines.len();

        let state = Arc::new(Mutex::new(FakeEngineState {
            source: None,
            attached: false,
            current_level: options.start_level,
            destroyed: false,
        }));
        provider.engines.push(Arc::clone(&state));
        provider.sinks.push(events);

        self.journal.record(format!("engine#{} create", index));

        Box::new(FakeEngine {
            index,
            journal: self.journal.clone(),
            state,
        })
    }
}

// -------------------------------------------------------------------------
// Capture devices
// -------------------------------------------------------------------------

struct FakeTrack {
    stream_index: usize,
    kind: TrackKind,
    journal: Journal,
    stopped: Mutex<bool>,
}

impl FakeTrack {
    fn is_stopped(&self) -> bool {
        *self.stopped.lock()
    }
}

impl CaptureTrack for FakeTrack {
    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        let mut stopped = self.stopped.lock();
        if *stopped {
            return;
        }
        *stopped = true;

        let kind = match self.kind {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
        };
        self.journal
            .record(format!("stream#{} {} stop", self.stream_index, kind));
    }
}

struct FakeStream {
    tracks: Vec<Arc<FakeTrack>>,
}

impl CaptureStream for FakeStream {
    fn tracks(&self) -> Vec<Arc<dyn CaptureTrack>> {
        self.tracks
            .iter()
            .map(|track| Arc::clone(track) as Arc<dyn CaptureTrack>)
            .collect()
    }
}

#[derive(Default)]
struct DevicesState {
    requests: usize,
    fail_next: Option<CaptureError>,
    streams: Vec<Arc<FakeStream>>,
}

pub struct FakeCaptureDevices {
    journal: Journal,
    state: Mutex<DevicesState>,
}

impl FakeCaptureDevices {
    pub fn new(journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            journal: journal.clone(),
            state: Mutex::new(DevicesState::default()),
        })
    }

    /// Fail the next request with `error`
    pub fn fail_next(&self, error: CaptureError) {
        self.state.lock().fail_next = Some(error);
    }

    pub fn requests(&self) -> usize {
        self.state.lock().requests
    }

    /// Streams with at least one track still running
    pub fn live_streams(&self) -> usize {
        self.state
            .lock()
            .streams
            .iter()
            .filter(|stream| stream.tracks.iter().any(|track| !track.is_stopped()))
            .count()
    }
}

#[async_trait]
impl CaptureDevices for FakeCaptureDevices {
    async fn get_stream(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Arc<dyn CaptureStream>, CaptureError> {
        self.journal
            .record(format!("devices get_stream {}", constraints.facing.as_str()));

        let mut state = self.state.lock();
        state.requests += 1;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }

        let stream_index = state.streams.len();
        let mut kinds = vec![TrackKind::Video];
        if constraints.audio {
            kinds.push(TrackKind::Audio);
        }

        let tracks = kinds
            .into_iter()
            .map(|kind| {
                Arc::new(FakeTrack {
                    stream_index,
                    kind,
                    journal: self.journal.clone(),
                    stopped: Mutex::new(false),
                })
            })
            .collect();

        let stream = Arc::new(FakeStream { tracks });
        state.streams.push(Arc::clone(&stream));
        Ok(stream)
    }
}

// -------------------------------------------------------------------------
// Recording engine
// -------------------------------------------------------------------------

#[derive(Default)]
struct FakeRecorderState {
    blob: Option<RecordedBlob>,
    pending: Option<FinalizeCallback>,
}

struct FakeRecorder {
    index: usize,
    journal: Journal,
    deferred: bool,
    state: Arc<Mutex<FakeRecorderState>>,
}

impl RecordingEngine for FakeRecorder {
    fn start(&mut self) {
        self.journal.record(format!("recorder#{} start", self.index));
    }

    fn pause(&mut self) {
        self.journal.record(format!("recorder#{} pause", self.index));
    }

    fn resume(&mut self) {
        self.journal.record(format!("recorder#{} resume", self.index));
    }

    fn stop(&mut self, on_finalized: FinalizeCallback) {
        self.journal.record(format!("recorder#{} stop", self.index));
        if self.deferred {
            self.state.lock().pending = Some(on_finalized);
        } else {
            finish(self.index, &self.journal, &self.state, on_finalized);
        }
    }

    fn blob(&self) -> Option<RecordedBlob> {
        self.state.lock().blob.clone()
    }
}

fn finish(
    index: usize,
    journal: &Journal,
    state: &Mutex<FakeRecorderState>,
    on_finalized: FinalizeCallback,
) {
    state.lock().blob = Some(RecordedBlob {
        mime_type: "video/webm".to_string(),
        data: vec![0; 1024],
    });
    journal.record(format!("recorder#{} finalized", index));
    on_finalized();
}

pub struct FakeRecorderFactory {
    journal: Journal,
    deferred: bool,
    recorders: Mutex<Vec<Arc<Mutex<FakeRecorderState>>>>,
}

impl FakeRecorderFactory {
    /// Recorders finalize synchronously inside `stop`
    pub fn immediate(journal: &Journal) -> Arc<Self> {
        Self::build(journal, false)
    }

    /// Recorders finalize only when `finalize` is called
    pub fn deferred(journal: &Journal) -> Arc<Self> {
        Self::build(journal, true)
    }

    fn build(journal: &Journal, deferred: bool) -> Arc<Self> {
        Arc::new(Self {
            journal: journal.clone(),
            deferred,
            recorders: Mutex::new(Vec::new()),
        })
    }

    pub fn created_count(&self) -> usize {
        self.recorders.lock().len()
    }

    /// Run the stored finalize callback of the `n`th recorder
    pub fn finalize(&self, n: usize) {
        let state = Arc::clone(&self.recorders.lock()[n]);
        let pending = state.lock().pending.take();
        if let Some(on_finalized) = pending {
            finish(n, &self.journal, &state, on_finalized);
        }
    }
}

impl RecorderFactory for FakeRecorderFactory {
    fn create(&self, _stream: Arc<dyn CaptureStream>) -> Box<dyn RecordingEngine> {
        let mut recorders = self.recorders.lock();
        let index = recorders.len();
        let state = Arc::new(Mutex::new(FakeRecorderState::default()));
        recorders.push(Arc::clone(&state));

        self.journal.record(format!("recorder#{} create", index));

        Box::new(FakeRecorder {
            index,
            journal: self.journal.clone(),
            deferred: self.deferred,
            state,
        })
    }
}
