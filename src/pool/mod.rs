//! Worker pool module
//!
//! This module contains the concurrency core:
//! - A rendezvous handoff channel
//! - Persistent workers selecting between work and a quit token
//! - The optional clean proxy collector
//! - The dispatcher that feeds the pool and shuts it down in order

mod collector;
mod dispatcher;
pub mod handoff;
mod worker;

pub use collector::{run_collector, Collector, SuccessRecord};
pub use dispatcher::Dispatcher;
pub use worker::{run_worker, WorkerContext};

use crate::action::FormSubmission;
use crate::config::Config;
use crate::observe::RunObserver;
use crate::output::RunSummary;
use crate::source::load_proxy_list;
use crate::Result;
use std::sync::Arc;

/// Runs a complete submission run from a validated configuration
///
/// This is the main entry point. It will:
/// 1. Load the proxy list (fatal on failure, before anything is spawned)
/// 2. Build the form submission action
/// 3. Run the dispatcher over the list from the configured offset
///
/// # Example
///
/// ```no_run
/// use proxy_fanout::config::load_config;
/// use proxy_fanout::run_from_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("fanout.toml"))?;
/// let summary = run_from_config(&config, None).await?;
/// println!("{} proxies worked", summary.succeeded);
/// # Ok(())
/// # }
/// ```
pub async fn run_from_config(
    config: &Config,
    observer: Option<Arc<dyn RunObserver>>,
) -> Result<RunSummary> {
    let entries = load_proxy_list(&config.proxies.source)?;
    let action = FormSubmission::from_config(config)?;
    tracing::info!("Submitting to {}", action.target());

    let mut dispatcher = Dispatcher::new(Arc::new(action), config.pool.workers);
    if let Some(observer) = observer {
        dispatcher = dispatcher.with_observer(observer);
    }
    if config.proxies.collect_successes {
        dispatcher = dispatcher.with_clean_list(config.proxies.output.clone());
    }

    dispatcher.run(&entries, config.pool.start_offset).await
}
