//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest image crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_harvest::config::{load_config_with_hash, validate, Config};
use sumi_harvest::crawler::Coordinator;
use sumi_harvest::output::{generate_markdown_summary, print_statistics};
use sumi_harvest::url::{authority, normalize_seed};
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a single-domain image harvester
///
/// Sumi-Harvest crawls every page reachable from the seed URL within the
/// seed's host, breadth-first, and saves every image it finds into the
/// output directory. Each page and each image is fetched at most once.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version)]
#[command(about = "A single-domain image harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL (required without CONFIG; overrides crawler.seed-url)
    #[arg(long, value_name = "URL", required_unless_present = "config")]
    seed: Option<String>,

    /// Image output directory (overrides output.image-dir) [default without CONFIG: images]
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Per-request timeout in seconds (overrides crawler.request-timeout)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Number of concurrent fetch workers (overrides crawler.max-concurrent-fetches)
    #[arg(long, value_name = "N")]
    workers: Option<u32>,

    /// Deepest breadth-first level to fetch (overrides crawler.max-depth)
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Write a markdown report here (overrides output.summary-path)
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
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

/// Loads the config file if given, then applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            let seed = cli
                .seed
                .clone()
                .context("--seed is required when no configuration file is given")?;
            Config::new(seed, "images")
        }
    };

    if let Some(seed) = &cli.seed {
        config.crawler.seed_url = seed.clone();
    }
    if let Some(output) = &cli.output {
        config.output.image_dir = output.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout = timeout;
    }
    if let Some(workers) = cli.workers {
        config.crawler.max_concurrent_fetches = workers;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = Some(max_depth);
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.clone());
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let seed = normalize_seed(&config.crawler.seed_url)?;
    let domain = authority(&seed).unwrap_or_default();

    println!("=== Sumi-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed: {}", seed);
    println!("  Domain: {}", domain);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Workers: {}", config.crawler.max_concurrent_fetches);
    match config.crawler.max_depth {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unlimited"),
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Images: {}", config.output.image_dir.display());
    if let Some(summary) = &config.output.summary_path {
        println!("  Summary: {}", summary.display());
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would harvest images from pages on {}", domain);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    let summary_path = config.output.summary_path.clone();

    let mut coordinator = Coordinator::new(config).context("Failed to start crawl")?;
    let report = coordinator.run().await?;

    if !quiet {
        println!();
        print_statistics(&report.stats);
    }

    if let Some(path) = summary_path {
        match generate_markdown_summary(&report, &path) {
            Ok(()) => tracing::info!("Summary written to: {}", path.display()),
            Err(e) => tracing::error!("Failed to write summary {}: {}", path.display(), e),
        }
    }

    Ok(())
}
