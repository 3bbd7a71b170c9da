//! Pool worker
//!
//! Each worker is a persistent task that waits on whichever comes first: a
//! quit token or an endpoint to work on. A failed action never stops a
//! worker; only a quit token (or the dispatcher going away) does.

use crate::action::Action;
use crate::endpoint::Endpoint;
use crate::observe::RunObserver;
use crate::output::WorkerReport;
use crate::pool::collector::SuccessRecord;
use crate::pool::handoff::{HandoffReceiver, HandoffSender};
use std::sync::Arc;

/// Everything a worker shares with the rest of the pool
pub struct WorkerContext {
    pub action: Arc<dyn Action>,
    pub work: HandoffReceiver<Endpoint>,
    pub quit: HandoffReceiver<()>,
    pub successes: Option<HandoffSender<SuccessRecord>>,
    pub observer: Arc<dyn RunObserver>,
}

/// Worker loop
///
/// A quit token only takes effect between items: an in-flight action always
/// runs to completion (bounded by its own timeout) before the worker looks
/// at the quit channel again.
pub async fn run_worker(worker_id: usize, ctx: WorkerContext) -> WorkerReport {
    let mut report = WorkerReport::new(worker_id);

    loop {
        tokio::select! {
            _ = ctx.quit.recv() => break,
            item = ctx.work.recv() => {
                let endpoint = match item {
                    Ok(endpoint) => endpoint,
                    Err(_) => break,
                };
                report.handled += 1;

                match ctx.action.perform(&endpoint).await {
                    Ok(()) => {
                        report.succeeded += 1;
                        ctx.observer.action_succeeded(worker_id, &endpoint);

                        if let Some(successes) = &ctx.successes {
                            if successes.send(SuccessRecord::from(&endpoint)).await.is_err() {
                                report.unforwarded += 1;
                                ctx.observer.success_unforwarded(worker_id, &endpoint);
                            }
                        }
                    }
                    Err(e) => {
                        report.failed += 1;
                        ctx.observer.action_failed(worker_id, &endpoint, &e);
                    }
                }
            }
        }
    }

    report
}
