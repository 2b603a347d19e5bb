//! SyncPassResult domain entity
//!
//! A [`SyncPassResult`] aggregates the outcome of one enumeration-and-transfer
//! pass over the bucket. It is scoped to that pass: it is logged and handed
//! to whoever awaits the pass, then dropped.

use std::fmt::{self, Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a single sync pass, used to correlate log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassId(Uuid);

impl PassId {
    /// Create a new random PassId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PassId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for PassId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What started a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassTrigger {
    /// The periodic timer (including the initial pass at startup)
    Timer,
    /// An operator request through the control surface
    Manual,
}

impl Display for PassTrigger {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PassTrigger::Timer => write!(f, "timer"),
            PassTrigger::Manual => write!(f, "manual"),
        }
    }
}

/// Aggregate statistics of one sync pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPassResult {
    /// Identifier of this pass
    pub pass_id: PassId,
    /// What started the pass
    pub trigger: PassTrigger,
    /// Objects seen in the listing (across all pages fetched)
    pub total_found: u64,
    /// Objects fully transferred and attached during this pass
    pub succeeded: u64,
    /// Objects skipped because they were already processed
    pub skipped: u64,
    /// Objects that failed a transfer step or were rejected by size
    pub failed: u64,
    /// Per-object error messages in the order they occurred
    pub errors: Vec<String>,
    /// Set when the listing failed and the remaining pages were not visited
    pub aborted: Option<String>,
    /// When the pass started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the pass in milliseconds
    pub duration_ms: u64,
}

impl SyncPassResult {
    /// Creates an empty result for a pass that is about to start
    pub fn new(pass_id: PassId, trigger: PassTrigger) -> Self {
        Self {
            pass_id,
            trigger,
            total_found: 0,
            succeeded: 0,
            skipped: 0,
            failed: 0,
            errors: Vec::new(),
            aborted: None,
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    /// Counts one listed object
    pub fn record_found(&mut self) {
        self.total_found += 1;
    }

    /// Counts one object transferred and attached
    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    /// Counts one object skipped as already processed
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Counts one failed object and keeps its message
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failed += 1;
        self.errors.push(message.into());
    }

    /// Marks the pass as aborted by a listing failure
    pub fn abort(&mut self, reason: impl Into<String>) {
        self.aborted = Some(reason.into());
    }

    /// Returns true if the listing completed
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }

    /// Records the final duration
    pub fn finish(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }
}
