//! Ingest CLI
//!
//! Runs one ingestion pipeline per invocation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ingest::{
    error::{AppError, Result},
    models::{Config, RunStats},
    pipeline,
    services::HttpPageSource,
    storage::Database,
    utils::http,
};

/// Ingest - single-run data ingestion pipelines
#[derive(Parser, Debug)]
#[command(
    name = "ingest",
    version,
    about = "Scrape, parse and load match history, heroes, ticket dumps and word lists"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "ingest.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest match history pages newer than the watermark
    Matches {
        /// Only keep matches with a greater id (default: highest stored id)
        #[arg(long)]
        watermark: Option<u64>,

        /// Oldest page to start from
        #[arg(long)]
        last_page: Option<u32>,
    },

    /// Rebuild the hero lookup table
    Heroes,

    /// Rebuild the ticket table from export dumps
    Tickets {
        /// Directory holding the CSV exports
        #[arg(long)]
        dump_dir: Option<String>,
    },

    /// Filter a tagged word list
    Words {
        /// Tagged word list to read
        #[arg(long)]
        input: Option<String>,

        /// Plain word file to write
        #[arg(long)]
        output: Option<String>,

        /// Maximum number of words to keep
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Fold command-line overrides into the loaded configuration.
fn apply_overrides(config: &mut Config, command: &Command) {
    match command {
        Command::Matches {
            watermark,
            last_page,
        } => {
            if watermark.is_some() {
                config.matches.watermark = *watermark;
            }
            if let Some(last_page) = last_page {
                config.matches.last_page = *last_page;
            }
        }
        Command::Tickets { dump_dir } => {
            if let Some(dir) = dump_dir {
                config.tickets.dump_dir = dir.clone();
            }
        }
        Command::Words {
            input,
            output,
            limit,
        } => {
            if let Some(input) = input {
                config.words.input = input.clone();
            }
            if let Some(output) = output {
                config.words.output = output.clone();
            }
            if limit.is_some() {
                config.words.limit = *limit;
            }
        }
        Command::Heroes | Command::Validate => {}
    }
}

async fn run(config: &Config, command: &Command) -> Result<RunStats> {
    let db = Database::open(&config.database.path)?;
    log::info!("Using database {}", db.location());

    match command {
        Command::Matches { .. } => {
            let client = http::create_client(&config.http)?;
            let source = HttpPageSource::match_history(client, &config.matches)?;
            pipeline::run_matches(&config.matches, &config.http, &db, &source).await
        }
        Command::Heroes => {
            let client = http::create_client(&config.http)?;
            let source = HttpPageSource::hero_index(client, &config.heroes)?;
            pipeline::run_heroes(&config.heroes, &db, &source).await
        }
        Command::Tickets { .. } => pipeline::run_tickets(&config.tickets, &db).await,
        Command::Words { .. } => pipeline::run_words(&config.words, &db).await,
        Command::Validate => Err(AppError::config("validate does not run a pipeline")),
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match cli.command {
        Command::Validate => Config::load(&cli.config)?,
        _ => Config::load_or_default(&cli.config),
    };
    apply_overrides(&mut config, &cli.command);

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    if let Command::Validate = cli.command {
        log::info!("✓ Config OK ({})", cli.config.display());
        return Ok(());
    }

    let stats = match run(&config, &cli.command).await {
        Ok(stats) => stats,
        Err(e) => {
            log::error!("Run failed: {}", e);
            return Err(e);
        }
    };

    pipeline::report(&stats);
    if let Some(path) = &config.output.stats_file {
        pipeline::write_stats(&stats, path)?;
    }

    log::info!("Done!");
    Ok(())
}
