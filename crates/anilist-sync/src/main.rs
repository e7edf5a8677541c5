//! AniList sync CLI.
//!
//! `season` writes the current-season listing, `database` writes the
//! multi-year catalog. Exit code is non-zero when no snapshot was written.

use anilist_sync::{
    AniListClient, Partition, PartitionPlan, Profile, SnapshotWriter, SyncRunner, SyncSettings,
    TokioSleeper,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::{Config, LogConfig, Season, SnapshotPaths};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
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
    /// Sync one season into the season snapshot
    Season {
        /// WINTER, SPRING, SUMMER or FALL
        #[arg(long)]
        season: Option<Season>,

        #[arg(long)]
        year: Option<i32>,

        /// Override the snapshot path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sync every season of a year range into the database snapshot
    Database {
        #[arg(long)]
        start_year: Option<i32>,

        #[arg(long)]
        end_year: Option<i32>,

        /// Override the snapshot path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

struct Job {
    plan: PartitionPlan,
    profile: Profile,
    output: PathBuf,
}

fn resolve_job(config: &mut Config, command: Command) -> Result<Job> {
    let paths = SnapshotPaths::new(config.output_dir());

    let job = match command {
        Command::Season {
            season,
            year,
            output,
        } => {
            if let Some(season) = season {
                config.season.season = season;
            }
            if let Some(year) = year {
                config.season.year = year;
            }
            Job {
                plan: PartitionPlan::Single(Partition::new(
                    config.season.year,
                    config.season.season,
                )),
                profile: Profile::Season,
                output: output.unwrap_or_else(|| paths.season_snapshot()),
            }
        }
        Command::Database {
            start_year,
            end_year,
            output,
        } => {
            if let Some(start_year) = start_year {
                config.database.start_year = start_year;
            }
            if end_year.is_some() {
                config.database.end_year = end_year;
            }
            let range = config.validate_range().context("Invalid year range")?;
            Job {
                plan: PartitionPlan::Range(range),
                profile: Profile::Database,
                output: output.unwrap_or_else(|| paths.database_snapshot()),
            }
        }
    };

    Ok(job)
}

/// The console layer already reports the failure on stderr; print it by hand
/// only when no console logging came up.
fn needs_plain_error(console_logging: bool) -> bool {
    !console_logging
}

async fn run(args: Args, console_logging: &mut bool) -> Result<()> {
    // Load and check configuration before anything touches the network
    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    config.validate().context("Invalid configuration")?;

    // Initialize logging
    let mut log_config = LogConfig::from_settings(&config.logging, "anilist-sync");
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    let console = log_config.console;
    shared::logging::init(log_config)?;
    *console_logging = console;

    // Apply CLI flags for the chosen job
    let job = resolve_job(&mut config, args.command)?;

    let settings = SyncSettings::from_config(&config);
    info!(
        config_file = %args.config.display(),
        output = %job.output.display(),
        req_delay_ms = config.pacing.req_delay_ms,
        season_delay_ms = config.pacing.season_delay_ms,
        max_retries = config.pacing.max_retries,
        "Loaded configuration"
    );

    // Create the upstream client and snapshot writer
    let client = AniListClient::from_config(&config.upstream, job.profile)
        .context("Failed to create AniList client")?;
    let writer = SnapshotWriter::new(&job.output);

    // Run the sync
    let mut runner = SyncRunner::new(client, TokioSleeper, job.plan, job.profile, settings);
    let report = runner.run(&writer).await.context("Sync failed")?;

    info!(
        items = report.unique_items,
        output = %report.output.display(),
        "Wrote snapshot"
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let mut console_logging = false;

    if let Err(e) = run(args, &mut console_logging).await {
        let message = format!("{:#}", e);
        error!(error = %message, "Sync aborted, no snapshot written");
        if needs_plain_error(console_logging) {
            eprintln!("Error: {}", message);
        }
        std::process::exit(1);
    }
}
