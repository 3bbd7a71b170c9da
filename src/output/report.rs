//! Run report types
//!
//! Workers and the collector hand their reports back to the dispatcher when
//! they stop; the dispatcher folds them into a [`RunSummary`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize clean proxy list: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Counters kept by a single worker for its whole life
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// 1-based worker number
    pub worker_id: usize,

    /// Items received from the dispatch channel
    pub handled: usize,

    /// Items whose action succeeded
    pub succeeded: usize,

    /// Items whose action failed
    pub failed: usize,

    /// Success records the collector was gone for
    pub unforwarded: usize,
}

impl WorkerReport {
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Default::default()
        }
    }
}

/// What the collector did with its accumulator at shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorReport {
    /// Where the clean list was written
    pub path: PathBuf,

    /// Number of records accumulated
    pub collected: usize,

    /// Whether the clean list made it to disk
    pub persisted: bool,
}

/// Outcome of a complete run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries considered (from the start offset onward)
    pub total: usize,

    /// Entries handed to a worker
    pub dispatched: usize,

    /// Entries rejected before dispatch
    pub skipped: usize,

    /// Valid entries that could not be handed off because no worker was left
    pub undelivered: usize,

    /// Actions that succeeded
    pub succeeded: usize,

    /// Actions that failed
    pub failed: usize,

    /// Workers that stopped and reported back
    pub workers_joined: usize,

    /// Collector outcome, when collection was enabled
    pub collector: Option<CollectorReport>,
}

impl RunSummary {
    /// Folds one worker's counters into the summary
    pub fn absorb(&mut self, report: &WorkerReport) {
        self.succeeded += report.succeeded;
        self.failed += report.failed;
        self.workers_joined += 1;
    }

    /// Fraction of dispatched items that succeeded, in percent
    pub fn success_rate(&self) -> f64 {
        if self.dispatched > 0 {
            (self.succeeded as f64 / self.dispatched as f64) * 100.0
        } else {
            0.0
        }
    }
}
