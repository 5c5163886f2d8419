//! Elapsed-time counter for the recording display
//!
//! The counter is a repeating tokio task owned by the session. Pausing or
//! resetting aborts the task; nothing ticks outside `Recording`.

use super::session::RecorderEvent;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct CounterState {
    elapsed_secs: u64,
    limit_reached: bool,
}

/// Counts whole seconds while recording
pub struct ElapsedCounter {
    shared: Arc<Mutex<CounterState>>,
    limit_secs: Option<u64>,
    event_tx: broadcast::Sender<RecorderEvent>,
    task: Option<JoinHandle<()>>,
}

impl ElapsedCounter {
    pub fn new(limit_secs: Option<u64>, event_tx: broadcast::Sender<RecorderEvent>) -> Self {
        Self {
            shared: Arc::new(Mutex::new(CounterState::default())),
            limit_secs,
            event_tx,
            task: None,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.shared.lock().elapsed_secs
    }

    pub fn limit_reached(&self) -> bool {
        self.shared.lock().limit_reached
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start or continue ticking from the current value
    ///
    /// Without a tokio runtime the counter stays at its current value.
    pub fn start(&mut self) {
        if self.task.is_some() || self.limit_reached() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime, elapsed counter disabled");
            return;
        };

        let shared = Arc::clone(&self.shared);
        let limit = self.limit_secs;
        let event_tx = self.event_tx.clone();

        self.task = Some(runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                ticker.tick().await;

                let (elapsed, reached) = {
                    let mut state = shared.lock();
                    state.elapsed_secs += 1;
                    if limit.is_some_and(|limit| state.elapsed_secs >= limit) {
                        state.limit_reached = true;
                    }
                    (state.elapsed_secs, state.limit_reached)
                };

                let _ = event_tx.send(RecorderEvent::Tick(elapsed));
                if reached {
                    tracing::info!("Recording limit of {}s reached", elapsed);
                    let _ = event_tx.send(RecorderEvent::LimitReached(elapsed));
                    break;
                }
            }
        }));
    }

    /// Stop ticking, keeping the current value
    pub fn pause(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Stop ticking and return to zero
    pub fn reset(&mut self) {
        self.pause();
        *self.shared.lock() = CounterState::default();
    }
}

impl Drop for ElapsedCounter {
    fn drop(&mut self) {
        self.pause();
    }
}
