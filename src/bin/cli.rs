//! paddock CLI
//!
//! Local execution entry point for season collection and cache flattening.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use paddock::{
    error::Result,
    models::Config,
    pipeline,
    services::OpenF1Client,
    storage::{self, SessionCache},
};

/// paddock - OpenF1 race telemetry collector
#[derive(Parser, Debug)]
#[command(
    name = "paddock",
    version,
    about = "Collects OpenF1 race telemetry and flattens it into master datasets"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect a season's races into the raw JSON cache
    Collect {
        /// Season year (overrides the configured year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Flatten the raw cache into the four master CSV datasets
    Flatten {
        /// Output directory (overrides the configured one)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run full pipeline: Collect → Flatten
    Pipeline {
        /// Season year (overrides the configured year)
        #[arg(long)]
        year: Option<i32>,

        /// Output directory (overrides the configured one)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Show cache status
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("paddock starting...");

    let mut config = Config::load_or_default(&cli.config);
    config.validate()?;

    match cli.command {
        Command::Collect { year } => {
            if let Some(year) = year {
                config.collector.year = year;
            }
            run_collect(&config).await?;
        }

        Command::Flatten { out } => {
            run_flatten(&config, out).await?;
        }

        Command::Pipeline { year, out } => {
            if let Some(year) = year {
                config.collector.year = year;
            }

            log::info!("Step 1/2: Collecting season {}...", config.collector.year);
            run_collect(&config).await?;

            log::info!("Step 2/2: Flattening cache...");
            run_flatten(&config, out).await?;

            log::info!("Pipeline complete!");
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            log::info!("✓ Config OK (API, collector, and export sections)");
        }

        Command::Info => {
            info(&config)?;
        }
    }

    log::info!("Done!");

    Ok(())
}

async fn run_collect(config: &Config) -> Result<()> {
    let client = OpenF1Client::new(&config.api)?;
    let cache = SessionCache::new(&config.collector.cache_root);

    let outcome = pipeline::collect_season(&client, &cache, &config.collector).await?;

    log::info!(
        "Season {}: {} of {} sessions collected, {} skipped (no target drivers)",
        config.collector.year,
        outcome.collected,
        outcome.total,
        outcome.skipped
    );
    Ok(())
}

async fn run_flatten(config: &Config, out: Option<PathBuf>) -> Result<()> {
    let cache = SessionCache::new(&config.collector.cache_root);
    let tables = pipeline::flatten(cache.root()).await?;

    let out_dir = out.unwrap_or_else(|| config.export.out_dir.clone());
    let written = storage::export::write_master_tables(&tables, &out_dir)?;

    log::info!("Wrote {} master datasets:", written.len());
    for path in &written {
        log::info!("    {}", path.display());
    }
    Ok(())
}

/// Report cache tree status: years, sessions, driver files.
fn info(config: &Config) -> Result<()> {
    let root = &config.collector.cache_root;
    log::info!("Cache root: {}", root.display());

    if !root.is_dir() {
        log::info!("No cache found yet.");
        return Ok(());
    }

    let mut years = 0usize;
    let mut sessions = 0usize;
    let mut driver_files = 0usize;

    for year_entry in std::fs::read_dir(root)? {
        let year_path = year_entry?.path();
        if !year_path.is_dir() {
            continue;
        }
        years += 1;

        for session_entry in std::fs::read_dir(&year_path)? {
            let session_path = session_entry?.path();
            if !session_path.is_dir() {
                continue;
            }
            sessions += 1;

            for file_entry in std::fs::read_dir(&session_path)? {
                let file_path = file_entry?.path();
                let name = file_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                if file_path.is_file()
                    && name.ends_with(".json")
                    && !storage::RESERVED_FILES.contains(&name)
                {
                    driver_files += 1;
                }
            }
        }
    }

    log::info!("    Years: {}", years);
    log::info!("    Sessions: {}", sessions);
    log::info!("    Driver files: {}", driver_files);
    Ok(())
}
