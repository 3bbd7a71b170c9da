//! Clean proxy collector
//!
//! A single task owns the list of proxies that worked. Workers hand it
//! records over a handoff channel; nothing else ever reads or writes the
//! list, so it needs no lock. The list is persisted once, when the collector
//! is told to quit.

use crate::endpoint::Endpoint;
use crate::observe::RunObserver;
use crate::output::{write_clean_list, CollectorReport};
use crate::pool::handoff::{handoff, HandoffReceiver, HandoffSender};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Identifies a proxy whose submission succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessRecord {
    /// `host:port` of the proxy
    pub host: String,
}

impl From<&Endpoint> for SuccessRecord {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            host: endpoint.authority().to_string(),
        }
    }
}

/// Dispatcher-side handle on a running collector
pub struct Collector {
    quit: HandoffSender<()>,
    done: oneshot::Receiver<CollectorReport>,
    task: JoinHandle<()>,
}

impl Collector {
    /// Spawns the collector task
    ///
    /// Returns the handle and the sender workers use to forward records.
    pub fn spawn(
        path: PathBuf,
        observer: Arc<dyn RunObserver>,
    ) -> (Self, HandoffSender<SuccessRecord>) {
        let (records_tx, records_rx) = handoff();
        let (quit_tx, quit_rx) = handoff();
        let (done_tx, done_rx) = oneshot::channel();

        observer.collector_started();
        let task = tokio::spawn(run_collector(path, records_rx, quit_rx, done_tx, observer));

        (
            Self {
                quit: quit_tx,
                done: done_rx,
                task,
            },
            records_tx,
        )
    }

    /// Sends the single quit token and waits for the completion token
    ///
    /// Must only be called once every worker has stopped, so no record can
    /// be in flight. Returns `None` if the collector died before reporting.
    pub async fn shutdown(self, observer: &dyn RunObserver) -> Option<CollectorReport> {
        observer.draining_collector();

        if self.quit.send(()).await.is_err() {
            observer.collector_lost("exited before its quit signal");
        }

        let report = self.done.await.ok();

        if let Err(e) = self.task.await {
            observer.collector_lost(&e.to_string());
        }

        report
    }
}

/// Collector loop
///
/// Appends records in arrival order until the quit token arrives, then
/// writes the list and sends exactly one completion token. A failed write is
/// reported but still completes, so the dispatcher never hangs on it.
pub async fn run_collector(
    path: PathBuf,
    records: HandoffReceiver<SuccessRecord>,
    quit: HandoffReceiver<()>,
    done: oneshot::Sender<CollectorReport>,
    observer: Arc<dyn RunObserver>,
) {
    let mut hosts: Vec<String> = Vec::new();
    let mut records_open = true;

    loop {
        tokio::select! {
            _ = quit.recv() => break,
            record = records.recv(), if records_open => match record {
                Ok(record) => hosts.push(record.host),
                // Every worker is gone; keep waiting for the quit token
                Err(_) => records_open = false,
            },
        }
    }

    let persisted = match write_clean_list(&path, &hosts).await {
        Ok(()) => true,
        Err(e) => {
            observer.collector_flush_failed(&path, &e);
            false
        }
    };

    let report = CollectorReport {
        path,
        collected: hosts.len(),
        persisted,
    };

    if persisted {
        observer.collector_flushed(&report);
    }

    let _ = done.send(report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::TracingObserver;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Keeps every abnormal termination it is told about
    #[derive(Default)]
    struct LossObserver {
        workers: Mutex<Vec<String>>,
        collector: Mutex<Vec<String>>,
    }

    impl RunObserver for LossObserver {
        fn worker_lost(&self, reason: &str) {
            self.workers.lock().unwrap().push(reason.to_string());
        }

        fn collector_lost(&self, reason: &str) {
            self.collector.lock().unwrap().push(reason.to_string());
        }
    }

    fn record(host: &str) -> SuccessRecord {
        SuccessRecord {
            host: host.to_string(),
        }
    }

    #[test]
    fn test_record_from_endpoint() {
        let endpoint = Endpoint::parse("10.0.0.1:8080").unwrap();
        assert_eq!(SuccessRecord::from(&endpoint), record("10.0.0.1:8080"));
    }

    #[tokio::test]
    async fn test_collects_in_arrival_order_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clean-proxies.json");

        let (collector, records) = Collector::spawn(path.clone(), Arc::new(TracingObserver));

        records.send(record("b:2")).await.unwrap();
        records.send(record("a:1")).await.unwrap();
        records.send(record("c:3")).await.unwrap();
        drop(records);

        let report = collector.shutdown(&TracingObserver).await.unwrap();
        assert_eq!(report.collected, 3);
        assert!(report.persisted);

        let hosts: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(hosts, vec!["b:2", "a:1", "c:3"]);
    }

    #[tokio::test]
    async fn test_empty_collection_still_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clean-proxies.json");

        let (collector, records) = Collector::spawn(path.clone(), Arc::new(TracingObserver));
        drop(records);

        let report = collector.shutdown(&TracingObserver).await.unwrap();
        assert_eq!(report.collected, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[tokio::test]
    async fn test_write_failure_still_completes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("clean-proxies.json");

        let (collector, records) = Collector::spawn(path.clone(), Arc::new(TracingObserver));
        records.send(record("a:1")).await.unwrap();

        let report = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            collector.shutdown(&TracingObserver),
        )
        .await
        .expect("collector hung after a failed write")
        .unwrap();

        assert_eq!(report.collected, 1);
        assert!(!report.persisted);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_dead_collector_is_reported_as_collector() {
        let (quit, quit_rx) = handoff::<()>();
        let (done_tx, done) = oneshot::channel::<CollectorReport>();
        drop(quit_rx);
        drop(done_tx);

        let collector = Collector {
            quit,
            done,
            task: tokio::spawn(async { panic!("collector task failed") }),
        };

        let observer = LossObserver::default();
        let report = collector.shutdown(&observer).await;

        assert!(report.is_none());
        assert!(observer.workers.lock().unwrap().is_empty());
        assert_eq!(observer.collector.lock().unwrap().len(), 2);
    }
}
