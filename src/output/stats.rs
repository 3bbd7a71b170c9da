//! Run statistics display

use crate::output::report::RunSummary;

/// Prints a run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Run Summary ===\n");

    println!("Proxies:");
    println!("  Considered: {}", summary.total);
    println!("  Dispatched: {}", summary.dispatched);
    println!("  Skipped (unparseable): {}", summary.skipped);
    if summary.undelivered > 0 {
        println!("  Undelivered (pool closed): {}", summary.undelivered);
    }
    println!();

    println!("Submissions:");
    println!("  Succeeded: {}", summary.succeeded);
    println!("  Failed: {}", summary.failed);
    println!(
        "  Success Rate: {:.1}% ({} / {})",
        summary.success_rate(),
        summary.succeeded,
        summary.dispatched
    );
    println!();

    if let Some(collector) = &summary.collector {
        println!("Clean List:");
        println!("  Collected: {}", collector.collected);
        if collector.persisted {
            println!("  Written to: {}", collector.path.display());
        } else {
            println!("  Not written (see log): {}", collector.path.display());
        }
        println!();
    }
}
