//! Cosmetic progress phases shown while a document is processed
//!
//! The backend reports no progress. The ticker walks a fixed list of phase
//! labels on a timer and is stopped the moment processing ends, whichever
//! way it ends: dropping the [`ProgressGuard`] aborts the timer task.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const PROCESSING_PHASES: [&str; 6] = [
    "Initializing AI processing...",
    "Uploading PDFs to Gemini...",
    "Analyzing document structure...",
    "Extracting data fields...",
    "Validating extracted data...",
    "Finalizing results...",
];

pub const DEFAULT_PHASE_PERIOD: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    Idle,
    Running { phase: usize, label: &'static str },
}

impl ProgressState {
    fn phase(phase: usize) -> Self {
        ProgressState::Running {
            phase,
            label: PROCESSING_PHASES[phase],
        }
    }

    /// Share of phases reached, `None` when idle.
    pub fn percent(&self) -> Option<u8> {
        match self {
            ProgressState::Idle => None,
            ProgressState::Running { phase, .. } => {
                let reached = (phase + 1).min(PROCESSING_PHASES.len());
                u8::try_from(reached * 100 / PROCESSING_PHASES.len()).ok()
            }
        }
    }
}

/// Publishes [`ProgressState`] updates to any number of subscribers
#[derive(Debug)]
pub struct ProgressTicker {
    tx: Arc<watch::Sender<ProgressState>>,
    period: Duration,
}

impl ProgressTicker {
    pub fn new(period: Duration) -> Self {
        let (tx, _rx) = watch::channel(ProgressState::Idle);
        Self {
            tx: Arc::new(tx),
            period,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.tx.subscribe()
    }

    pub fn state(&self) -> ProgressState {
        *self.tx.borrow()
    }

    /// Start cycling phases. Runs until the returned guard is dropped.
    pub fn start(&self) -> ProgressGuard {
        self.tx.send_replace(ProgressState::phase(0));

        let task = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let tx = Arc::clone(&self.tx);
                let period = self.period;
                Some(handle.spawn(async move {
                    for phase in 1..PROCESSING_PHASES.len() {
                        tokio::time::sleep(period).await;
                        tx.send_replace(ProgressState::phase(phase));
                    }
                }))
            }
            Err(_) => {
                tracing::debug!("No async runtime, progress phases stay on the first label");
                None
            }
        };

        ProgressGuard {
            task,
            tx: Arc::clone(&self.tx),
        }
    }
}

impl Default for ProgressTicker {
    fn default() -> Self {
        Self::new(DEFAULT_PHASE_PERIOD)
    }
}

/// Keeps the ticker running; dropping it cancels the timer and resets to idle.
#[must_use = "the ticker stops as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ProgressGuard {
    task: Option<JoinHandle<()>>,
    tx: Arc<watch::Sender<ProgressState>>,
}

impl Drop for ProgressGuard {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.tx.send_replace(ProgressState::Idle);
    }
}
