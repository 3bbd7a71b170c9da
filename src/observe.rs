//! Run observation
//!
//! Every lifecycle transition of a run is reported to a single
//! [`RunObserver`]. The pool itself never writes logs directly; the
//! production observer, [`TracingObserver`], turns events into `tracing`
//! records, and tests swap in observers that record what happened.

use crate::action::ActionError;
use crate::endpoint::Endpoint;
use crate::output::{CollectorReport, OutputError, RunSummary, WorkerReport};
use crate::EndpointError;
use std::path::Path;

/// Receives lifecycle events from the dispatcher, workers and collector
///
/// Implementations are shared across all pool tasks and must not block.
/// Every method has an empty default so observers only implement what they
/// care about. Positions are 1-based and absolute within the proxy list, so
/// they already include the start offset.
pub trait RunObserver: Send + Sync {
    fn run_started(&self, _total: usize, _offset: usize, _workers: usize, _collecting: bool) {}

    fn collector_started(&self) {}

    fn worker_started(&self, _worker_id: usize) {}

    fn item_skipped(&self, _position: usize, _entry: &str, _error: &EndpointError) {}

    fn item_dispatched(&self, _position: usize, _endpoint: &Endpoint) {}

    fn item_undelivered(&self, _position: usize, _endpoint: &Endpoint) {}

    fn action_succeeded(&self, _worker_id: usize, _endpoint: &Endpoint) {}

    fn action_failed(&self, _worker_id: usize, _endpoint: &Endpoint, _error: &ActionError) {}

    fn success_unforwarded(&self, _worker_id: usize, _endpoint: &Endpoint) {}

    fn draining_workers(&self, _workers: usize) {}

    fn worker_quit_sent(&self, _worker_number: usize) {}

    fn worker_stopped(&self, _report: &WorkerReport) {}

    fn worker_lost(&self, _reason: &str) {}

    fn draining_collector(&self) {}

    fn collector_lost(&self, _reason: &str) {}

    fn collector_flushed(&self, _report: &CollectorReport) {}

    fn collector_flush_failed(&self, _path: &Path, _error: &OutputError) {}

    fn run_finished(&self, _summary: &RunSummary) {}
}

/// Observer that writes every event to the `tracing` log stream
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RunObserver for TracingObserver {
    fn run_started(&self, total: usize, offset: usize, workers: usize, collecting: bool) {
        tracing::info!(
            "Starting run: {} proxies from offset {}, {} workers, collection {}",
            total,
            offset,
            workers,
            if collecting { "enabled" } else { "disabled" }
        );
    }

    fn collector_started(&self) {
        tracing::info!("Created clean proxy collector");
    }

    fn worker_started(&self, worker_id: usize) {
        tracing::debug!("Created worker {}", worker_id);
    }

    fn item_skipped(&self, position: usize, entry: &str, error: &EndpointError) {
        tracing::warn!("Skipping proxy {} ({:?}): {}", position, entry, error);
    }

    fn item_dispatched(&self, position: usize, endpoint: &Endpoint) {
        tracing::info!("Sending submission {} via {}", position, endpoint);
    }

    fn item_undelivered(&self, position: usize, endpoint: &Endpoint) {
        tracing::error!(
            "No worker left to take proxy {} ({}), stopping dispatch",
            position,
            endpoint
        );
    }

    fn action_succeeded(&self, worker_id: usize, endpoint: &Endpoint) {
        tracing::debug!("Worker {}: submission via {} succeeded", worker_id, endpoint);
    }

    fn action_failed(&self, worker_id: usize, endpoint: &Endpoint, error: &ActionError) {
        tracing::warn!("Worker {}: submission via {} failed: {}", worker_id, endpoint, error);
    }

    fn success_unforwarded(&self, worker_id: usize, endpoint: &Endpoint) {
        tracing::error!(
            "Worker {}: collector is gone, {} was not recorded",
            worker_id,
            endpoint
        );
    }

    fn draining_workers(&self, workers: usize) {
        tracing::info!("All proxies dispatched, stopping {} workers", workers);
    }

    fn worker_quit_sent(&self, worker_number: usize) {
        tracing::debug!("Stopping worker {}", worker_number);
    }

    fn worker_stopped(&self, report: &WorkerReport) {
        tracing::debug!(
            "Worker {} stopped after {} submissions ({} ok, {} failed)",
            report.worker_id,
            report.handled,
            report.succeeded,
            report.failed
        );
    }

    fn worker_lost(&self, reason: &str) {
        tracing::error!("Worker terminated abnormally: {}", reason);
    }

    fn draining_collector(&self) {
        tracing::info!("Stopping clean proxy collector");
    }

    fn collector_lost(&self, reason: &str) {
        tracing::error!("Clean proxy collector terminated abnormally: {}", reason);
    }

    fn collector_flushed(&self, report: &CollectorReport) {
        tracing::info!(
            "Saved {} clean proxies to {}",
            report.collected,
            report.path.display()
        );
    }

    fn collector_flush_failed(&self, path: &Path, error: &OutputError) {
        tracing::error!("Failed to save clean proxies to {}: {}", path.display(), error);
    }

    fn run_finished(&self, summary: &RunSummary) {
        tracing::info!(
            "Run complete: {} dispatched, {} skipped, {} succeeded, {} failed",
            summary.dispatched,
            summary.skipped,
            summary.succeeded,
            summary.failed
        );
    }
}
