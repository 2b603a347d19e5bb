//! Sync scheduler - runs passes on a timer and on demand
//!
//! The [`SyncScheduler`] owns the [`SyncEngine`] and starts passes as
//! independent tokio tasks:
//!
//! ```text
//! interval tick ──┐
//!                 ├──→ spawn_pass ──→ SyncEngine::run_pass ──→ broadcast
//! trigger()    ───┘                                        └──→ JoinHandle
//! ```
//!
//! Passes are not serialized against each other; the processed-key set is
//! what keeps concurrent passes from committing an object twice.

use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ragsync_core::domain::{PassId, PassTrigger, SyncPassResult};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::SyncEngine;

/// Capacity of the pass-result broadcast channel
const RESULT_CHANNEL_CAPACITY: usize = 16;

/// Observable scheduler state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    /// No pass in flight
    Idle,
    /// At least one pass in flight
    Running,
}

impl Display for SchedulerState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "idle"),
            SchedulerState::Running => write!(f, "running"),
        }
    }
}

/// A started pass
#[derive(Debug)]
pub struct PassHandle {
    /// Identifier of the pass, known before it completes
    pub pass_id: PassId,
    /// Resolves to the pass result
    pub handle: JoinHandle<SyncPassResult>,
}

/// Decrements the running counter when a pass task ends, even by panic
struct RunningGuard(Arc<AtomicUsize>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Schedules sync passes
pub struct SyncScheduler {
    engine: Arc<SyncEngine>,
    interval: Duration,
    running: Arc<AtomicUsize>,
    results: broadcast::Sender<SyncPassResult>,
}

impl SyncScheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    /// * `engine` - Engine that runs each pass
    /// * `interval` - Time between timer passes
    pub fn new(engine: Arc<SyncEngine>, interval: Duration) -> Self {
        let (results, _) = broadcast::channel(RESULT_CHANNEL_CAPACITY);
        info!(interval_secs = interval.as_secs_f64(), "Creating sync scheduler");
        Self {
            engine,
            interval,
            running: Arc::new(AtomicUsize::new(0)),
            results,
        }
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Current state derived from the number of passes in flight
    pub fn state(&self) -> SchedulerState {
        if self.running_passes() > 0 {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Number of passes currently in flight
    pub fn running_passes(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    /// Receives the result of every pass that completes after subscribing
    pub fn subscribe(&self) -> broadcast::Receiver<SyncPassResult> {
        self.results.subscribe()
    }

    /// Starts an operator-requested pass immediately
    ///
    /// Returns without waiting for the pass; the scheduler is `Running`
    /// as soon as this returns.
    pub fn trigger(&self) -> PassHandle {
        info!("Manual sync triggered");
        self.spawn_pass(PassTrigger::Manual)
    }

    fn spawn_pass(&self, trigger: PassTrigger) -> PassHandle {
        let pass_id = PassId::new();
        self.running.fetch_add(1, Ordering::AcqRel);
        let guard = RunningGuard(Arc::clone(&self.running));

        let engine = Arc::clone(&self.engine);
        let results = self.results.clone();

        let handle = tokio::spawn(async move {
            let _guard = guard;
            let result = engine.run_pass(pass_id, trigger).await;
            if results.send(result.clone()).is_err() {
                debug!(%pass_id, "No subscribers for pass result");
            }
            result
        });

        debug!(%pass_id, %trigger, "Spawned sync pass");
        PassHandle { pass_id, handle }
    }

    /// Timer loop: one pass immediately, then one per interval
    ///
    /// A timer pass is awaited before the next tick is considered, so timer
    /// passes never overlap each other. The loop ends when `shutdown` is
    /// cancelled; a pass in flight at that moment is left to finish on
    /// its own.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs_f64(),
            "Sync scheduler starting"
        );

        // tokio panics on a zero period
        let mut ticker = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping sync scheduler");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let PassHandle { pass_id, handle } = self.spawn_pass(PassTrigger::Timer);
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!(%pass_id, "Shutdown during timer pass, not waiting for it");
                    break;
                }
                joined = handle => {
                    if let Err(e) = joined {
                        warn!(%pass_id, error = %e, "Timer pass task failed");
                    }
                }
            }
        }

        info!("Sync scheduler stopped");
    }
}
