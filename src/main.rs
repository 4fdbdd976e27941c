//! Gleaner main entry point
//!
//! Command-line interface for the Gleaner web content crawler.

use clap::Parser;
use gleaner::config::load_config_with_hash;
use gleaner::crawler::run_crawl;
use gleaner::GleanerError;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Gleaner: a continuously-running web content crawler
///
/// Gleaner fetches pages from a bounded, randomized frontier, extracts
/// titles, keywords, images, file links, and article blocks, and persists
/// everything as idempotent natural-key upserts.
#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(version = "1.0.0")]
#[command(about = "A continuously-running web content crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Path to a JSON file containing an array of seed URLs
    #[arg(value_name = "SEEDS")]
    seeds: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and seeds, show what would be crawled, and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let seeds = load_seeds(&cli.seeds)?;
    tracing::info!("Loaded {} seed URLs from {}", seeds.len(), cli.seeds.display());

    if cli.dry_run {
        handle_dry_run(&config, &seeds);
        return Ok(());
    }

    match run_crawl(config, &config_hash, seeds).await {
        Ok(()) => {
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gleaner=info,warn"),
            1 => EnvFilter::new("gleaner=debug,info"),
            2 => EnvFilter::new("gleaner=trace,debug"),
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

/// Loads the seed URL array; an unreadable, malformed, or empty file is
/// fatal before any worker is spawned
fn load_seeds(path: &Path) -> Result<Vec<String>, GleanerError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| GleanerError::SeedFile(format!("failed to read {}: {}", path.display(), e)))?;
    let seeds: Vec<String> = serde_json::from_str(&raw).map_err(|e| {
        GleanerError::SeedFile(format!("{} is not a JSON array of URLs: {}", path.display(), e))
    })?;
    if seeds.is_empty() {
        return Err(GleanerError::SeedFile(format!(
            "{} contains no seed URLs",
            path.display()
        )));
    }
    Ok(seeds)
}

/// Handles the --dry-run mode: shows the effective configuration and seeds
fn handle_dry_run(config: &gleaner::Config, seeds: &[String]) {
    println!("=== Gleaner Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Fetch timeout: {}ms", config.crawler.fetch_timeout_ms);
    println!("  Max queue size: {}", config.crawler.max_queue_size);
    println!("  Max visited size: {}", config.crawler.max_visited_size);
    println!("  Max domain visits: {}", config.crawler.max_domain_visits);
    println!("  Reseed sample size: {}", config.crawler.reseed_sample_size);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\nEmbedding:");
    if config.embedding.enabled {
        println!("  Enabled, vectors: {}", config.embedding.vectors_path);
    } else {
        println!("  Disabled");
    }

    println!("\nBlacklist patterns ({}):", config.blacklist.len());
    for pattern in &config.blacklist {
        println!("  - {}", pattern);
    }

    println!("\nSeed URLs ({}):", seeds.len());
    for seed in seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seeds.len());
}
