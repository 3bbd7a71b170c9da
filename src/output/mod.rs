//! Output module for run results
//!
//! This module handles:
//! - Report types workers and the collector hand back at shutdown
//! - Persisting the clean proxy list
//! - Printing the end-of-run summary

mod clean_list;
mod report;
pub mod stats;

pub use clean_list::write_clean_list;
pub use report::{CollectorReport, OutputError, OutputResult, RunSummary, WorkerReport};
pub use stats::print_summary;
