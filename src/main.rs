//! Autoscout-Scraper main entry point
//!
//! This is the command-line interface for the AutoScout24 listing scraper.

use anyhow::Context;
use autoscout_scraper::config::{
    compute_config_hash, parse_config, parse_config_with_overlay, resolve_start_urls, validate,
    Config,
};
use autoscout_scraper::crawler::{classify_seed, Coordinator, ProxyRotator};
use autoscout_scraper::listing::{build_dealer_summary, print_dealer_summary};
use autoscout_scraper::output::{
    export_records, print_statistics, write_fallback_dump, OutputFormat,
};
use autoscout_scraper::ConfigError;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Autoscout-Scraper: a vehicle listing harvester
///
/// Expands AutoScout24 search pages into listing URLs, fetches every listing
/// concurrently, and exports the normalized records as JSON, CSV, XML, RSS
/// or HTML.
#[derive(Parser, Debug)]
#[command(name = "autoscout-scraper")]
#[command(version = "1.0.0")]
#[command(about = "AutoScout24 vehicle listing scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// TOML file deep-merged over the configuration
    #[arg(short, long, value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Maximum number of listings to collect
    #[arg(short = 'm', long, value_name = "N")]
    max_records: Option<usize>,

    /// Export file path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Export format (inferred from --output when omitted)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be scraped without any network access
    #[arg(long, conflicts_with_all = ["dealer_summary", "stats"])]
    dry_run: bool,

    /// Print a per-dealer summary after exporting
    #[arg(long)]
    dealer_summary: bool,

    /// Print crawl statistics after exporting
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match load_settings(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    apply_overrides(&mut config, &cli);
    validate(&config)?;
    let seeds = resolve_start_urls(&config)?;

    if cli.dry_run {
        handle_dry_run(&config, &seeds);
    } else {
        handle_scrape(&config, &seeds, &cli).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("autoscout_scraper=info,warn"),
            1 => EnvFilter::new("autoscout_scraper=debug,info"),
            2 => EnvFilter::new("autoscout_scraper=trace,debug"),
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

/// Loads the configuration file, merging `--input` over it
///
/// A missing configuration file is not an error: defaults are used.
fn load_settings(cli: &Cli) -> Result<Config, ConfigError> {
    let base_exists = cli.config.exists();

    if base_exists {
        tracing::info!("Loading configuration from: {}", cli.config.display());
        let hash = compute_config_hash(&cli.config)?;
        tracing::info!("Configuration hash: {}", hash);
    } else {
        tracing::warn!(
            "Configuration file {} not found, using defaults",
            cli.config.display()
        );
    }

    match (&cli.input, base_exists) {
        (Some(input), true) => {
            tracing::info!("Merging input file: {}", input.display());
            parse_config_with_overlay(&cli.config, input)
        }
        (Some(input), false) => parse_config(input),
        (None, true) => parse_config(&cli.config),
        (None, false) => Ok(Config::default()),
    }
}

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_records) = cli.max_records {
        config.scraper.max_records = max_records;
    }

    if let Some(output) = &cli.output {
        config.output.file = Some(output.display().to_string());
    }

    match (cli.format, &cli.output) {
        (Some(format), _) => config.output.format = format,
        (None, Some(output)) => match OutputFormat::from_path(output) {
            Ok(format) => config.output.format = format,
            Err(e) => tracing::debug!("Keeping configured format: {}", e),
        },
        (None, None) => {}
    }
}

/// Handles the --dry-run mode: shows the resolved settings and seeds
fn handle_dry_run(config: &Config, seeds: &[String]) {
    println!("=== Autoscout-Scraper Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Max records: {}", config.scraper.max_records);
    println!("  Parallel requests: {}", config.scraper.parallel_requests);
    println!("  Timeout: {}s", config.scraper.timeout_seconds);
    println!("  User agent: {}", config.scraper.user_agent);

    let rotator = ProxyRotator::from_env(&config.scraper.proxies.endpoints());
    println!("\nProxies ({}):", rotator.endpoints().len());
    for endpoint in rotator.endpoints() {
        println!("  - {}", endpoint);
    }

    println!("\nOutput:");
    println!("  File: {}", config.output.resolved_path());
    println!("  Format: {}", config.output.format);

    println!("\nSeed URLs ({}):", seeds.len());
    for seed in seeds {
        println!("  - [{:?}] {}", classify_seed(seed), seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main scrape: crawl, export, optional reports
async fn handle_scrape(config: &Config, seeds: &[String], cli: &Cli) -> anyhow::Result<()> {
    tracing::info!(
        "Starting scrape of {} seed URLs (max {} records, {} parallel requests)",
        seeds.len(),
        config.scraper.max_records,
        config.scraper.parallel_requests
    );

    let coordinator = Coordinator::new(config).context("Failed to set up the crawler")?;
    let (records, stats) = coordinator.run_with_stats(seeds).await;
    tracing::info!(
        "Collected {} records from {} listing URLs in {:.2}s",
        stats.records,
        stats.listing_urls,
        stats.elapsed.as_secs_f64()
    );

    let path = PathBuf::from(config.output.resolved_path());
    let format = config.output.format;

    if let Err(e) = export_records(&records, &path, format) {
        tracing::error!("Export to {} failed: {}", path.display(), e);
        match write_fallback_dump(&records) {
            Ok(dump) => tracing::warn!(
                "Saved {} records to fallback file {}",
                records.len(),
                dump.display()
            ),
            Err(dump_err) => tracing::error!("Fallback dump failed: {}", dump_err),
        }
        return Err(e).with_context(|| format!("Failed to export to {}", path.display()));
    }

    let summary = build_dealer_summary(&records);
    tracing::debug!("Listings came from {} dealers", summary.len());
    for dealer in summary.values() {
        tracing::debug!("{}: {} listings", dealer.dealer_name, dealer.listing_count);
    }

    if cli.dealer_summary {
        print_dealer_summary(&summary);
        println!();
    }

    if cli.stats {
        print_statistics(&stats);
        println!();
    }

    println!(
        "Scraped {} listings into {} ({}).",
        records.len(),
        path.display(),
        format
    );

    Ok(())
}
