//! Proxy-Fanout main entry point
//!
//! This is the command-line interface for the Proxy-Fanout submission pool.

use anyhow::Context;
use clap::Parser;
use proxy_fanout::config::{resolve_config, Config, Overrides};
use proxy_fanout::output::print_summary;
use proxy_fanout::source::{load_proxy_list, slice_from};
use proxy_fanout::{run_from_config, Endpoint};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Proxy-Fanout: one form submission through every proxy on a list
///
/// Proxy-Fanout runs a fixed pool of workers over a list of forward proxies,
/// submits the configured form once through each of them, and can write the
/// proxies that worked to a clean list for the next run.
#[derive(Parser, Debug)]
#[command(name = "proxy-fanout")]
#[command(version = "1.0.0")]
#[command(about = "Bulk form submission through a pool of proxies", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Poll identifier appended to the base URL
    #[arg(long, value_name = "ID")]
    poll: Option<String>,

    /// Option identifier submitted in the form
    #[arg(long, value_name = "ID")]
    options: Option<String>,

    /// Number of workers in the pool
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Index of the first proxy to use
    #[arg(long, value_name = "N")]
    entrance: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Write the proxies that worked to the clean list
    #[arg(long)]
    clean: bool,

    /// Proxy list to read (JSON array or one entry per line)
    #[arg(long, value_name = "FILE")]
    proxies: Option<PathBuf>,

    /// Where to write the clean list
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Base URL of the poll site
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Name of the form field carrying the option identifier
    #[arg(long, value_name = "NAME")]
    form_field: Option<String>,

    /// Count non-2xx responses as failures
    #[arg(long)]
    strict_status: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and proxy list and show what would run without submitting
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            poll_id: self.poll.clone(),
            option_id: self.options.clone(),
            form_field: self.form_field.clone(),
            require_success_status: self.strict_status.then_some(true),
            workers: self.threads,
            start_offset: self.entrance,
            timeout_secs: self.timeout,
            source: self.proxies.clone(),
            collect_successes: self.clean.then_some(true),
            output: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = match resolve_config(cli.config.as_deref(), cli.overrides()) {
        Ok(cfg) => {
            tracing::info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_run(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("proxy_fanout=info,warn"),
            1 => EnvFilter::new("proxy_fanout=debug,info"),
            2 => EnvFilter::new("proxy_fanout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and proxy list, shows what would run
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Proxy-Fanout Dry Run ===\n");

    let target = config.target.submission_url()?;
    println!("Target:");
    println!("  URL: {}", target);
    println!(
        "  Form: {}={}",
        config.target.form_field, config.target.option_id
    );
    if let Some(user_agent) = &config.target.user_agent {
        println!("  User agent: {}", user_agent);
    }
    println!(
        "  Non-2xx counts as failure: {}",
        config.target.require_success_status
    );

    println!("\nPool:");
    println!("  Workers: {}", config.pool.workers);
    println!("  Start offset: {}", config.pool.start_offset);
    println!("  Timeout: {}s", config.pool.timeout_secs);

    println!("\nProxies:");
    println!("  Source: {}", config.proxies.source.display());
    if config.proxies.collect_successes {
        println!("  Clean list: {}", config.proxies.output.display());
    } else {
        println!("  Clean list: disabled");
    }

    let entries = load_proxy_list(&config.proxies.source)
        .with_context(|| format!("Cannot run without {}", config.proxies.source.display()))?;
    let pending = slice_from(&entries, config.pool.start_offset)?;
    let valid = pending
        .iter()
        .filter(|entry| Endpoint::parse(entry).is_ok())
        .count();

    println!("  Entries: {} ({} from offset)", entries.len(), pending.len());
    println!("  Usable: {}", valid);
    println!("  Unparseable: {}", pending.len() - valid);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would submit through {} proxies with {} workers",
        valid, config.pool.workers
    );

    Ok(())
}

/// Handles the main submission run
async fn handle_run(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Workers: {}, start offset: {}, timeout: {}s",
        config.pool.workers,
        config.pool.start_offset,
        config.pool.timeout_secs
    );

    match run_from_config(config, None).await {
        Ok(summary) => {
            tracing::info!("Run completed");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
