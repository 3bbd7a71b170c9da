//! Dispatcher - run orchestration and shutdown
//!
//! The dispatcher drives a run through its phases:
//! - Init: validate the offset, create the channels, spawn collector and workers
//! - Dispatching: parse each entry and hand valid endpoints to the pool
//! - Draining workers: one quit token per worker, then join them all
//! - Draining collector: one quit token, then wait for its completion token
//!
//! All channels are rendezvous handoffs, so the number of quit tokens sent
//! must match the number of live consumers exactly.

use crate::action::Action;
use crate::endpoint::Endpoint;
use crate::observe::{RunObserver, TracingObserver};
use crate::output::{RunSummary, WorkerReport};
use crate::pool::collector::Collector;
use crate::pool::handoff::handoff;
use crate::pool::worker::{run_worker, WorkerContext};
use crate::source::slice_from;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Owns the configuration of one run and coordinates its tasks
pub struct Dispatcher {
    action: Arc<dyn Action>,
    observer: Arc<dyn RunObserver>,
    workers: usize,
    clean_list: Option<PathBuf>,
}

impl Dispatcher {
    /// Creates a dispatcher running `workers` workers that each perform `action`
    pub fn new(action: Arc<dyn Action>, workers: usize) -> Self {
        Self {
            action,
            observer: Arc::new(TracingObserver),
            workers,
            clean_list: None,
        }
    }

    /// Reports lifecycle events to `observer` instead of the log
    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Enables success collection, writing the clean list to `path`
    pub fn with_clean_list(mut self, path: PathBuf) -> Self {
        self.clean_list = Some(path);
        self
    }

    /// Runs the pool over `entries`, starting at `offset`
    ///
    /// Only an offset past the end of `entries` is an error, and it is
    /// raised before any task is spawned. Unparseable entries, failed
    /// actions and a failed clean-list write are all reported through the
    /// observer and reflected in the returned summary.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use proxy_fanout::{Dispatcher, FormSubmission};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let target = url::Url::parse("https://poll.example.com/17338883")?;
    /// let action = FormSubmission::new(target, "options", "139529712", Duration::from_secs(30));
    ///
    /// let entries = vec!["10.0.0.1:8080".to_string(), "10.0.0.2:3128".to_string()];
    /// let summary = Dispatcher::new(Arc::new(action), 10).run(&entries, 0).await?;
    /// println!("{} succeeded", summary.succeeded);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self, entries: &[String], offset: usize) -> crate::Result<RunSummary> {
        let pending = slice_from(entries, offset)?;
        let observer = &self.observer;

        let mut summary = RunSummary {
            total: pending.len(),
            ..Default::default()
        };
        observer.run_started(pending.len(), offset, self.workers, self.clean_list.is_some());

        // Init
        let (work_tx, work_rx) = handoff::<Endpoint>();
        let (quit_tx, quit_rx) = handoff::<()>();

        let (collector, records_tx) = match &self.clean_list {
            Some(path) => {
                let (collector, records_tx) = Collector::spawn(path.clone(), Arc::clone(observer));
                (Some(collector), Some(records_tx))
            }
            None => (None, None),
        };

        let workers: Vec<JoinHandle<WorkerReport>> = (1..=self.workers)
            .map(|worker_id| {
                observer.worker_started(worker_id);
                let ctx = WorkerContext {
                    action: Arc::clone(&self.action),
                    work: work_rx.clone(),
                    quit: quit_rx.clone(),
                    successes: records_tx.clone(),
                    observer: Arc::clone(observer),
                };
                tokio::spawn(run_worker(worker_id, ctx))
            })
            .collect();

        // Only workers may hold these from here on
        drop(work_rx);
        drop(quit_rx);
        drop(records_tx);

        // Dispatching
        let mut pool_open = true;
        for (index, entry) in pending.iter().enumerate() {
            let position = offset + index + 1;

            let endpoint = match Endpoint::parse(entry) {
                Ok(endpoint) => endpoint,
                Err(e) => {
                    observer.item_skipped(position, entry, &e);
                    summary.skipped += 1;
                    continue;
                }
            };

            if !pool_open {
                summary.undelivered += 1;
                continue;
            }

            match work_tx.send(endpoint.clone()).await {
                Ok(()) => {
                    summary.dispatched += 1;
                    observer.item_dispatched(position, &endpoint);
                }
                Err(_) => {
                    observer.item_undelivered(position, &endpoint);
                    summary.undelivered += 1;
                    pool_open = false;
                }
            }
        }

        // Draining(workers)
        observer.draining_workers(self.workers);
        for worker_number in 1..=self.workers {
            if quit_tx.send(()).await.is_err() {
                // Every worker is already gone; joining below still collects them
                break;
            }
            observer.worker_quit_sent(worker_number);
        }

        for handle in workers {
            match handle.await {
                Ok(report) => {
                    observer.worker_stopped(&report);
                    summary.absorb(&report);
                }
                Err(e) => observer.worker_lost(&e.to_string()),
            }
        }
        drop(work_tx);
        drop(quit_tx);

        // Draining(collector)
        if let Some(collector) = collector {
            summary.collector = collector.shutdown(&**observer).await;
        }

        observer.run_finished(&summary);
        Ok(summary)
    }
}
