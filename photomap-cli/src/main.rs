//! Photomap CLI - Command-line interface
//!
//! Keeps a country-partitioned map of a geotagged photo stream up to date.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::update::UpdateArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "photomap")]
#[command(version = photomap::VERSION)]
#[command(about = "Country-partitioned map of a geotagged photo stream", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ~/.photomap/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge newly exported photos into the map
    Update {
        /// Exported photo listing (JSON, newest first)
        #[arg(long)]
        photos: PathBuf,

        /// Upstream photo total, if the listing does not carry one
        #[arg(long)]
        total: Option<u64>,

        /// Data directory (defaults to the configured one)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Do not learn grid cells from geocoding answers in this run
        #[arg(long)]
        no_grid_learning: bool,
    },

    /// Show per-country statistics and map totals
    Stats {
        /// Data directory (defaults to the configured one)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Inspect or clear the geocoding caches
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Write a default configuration file
    Init,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        e.exit();
    }
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    if let Commands::Init = cli.command {
        return commands::init::run(cli.config);
    }

    let runner = CliRunner::new(cli.config.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Update {
            photos,
            total,
            data_dir,
            no_grid_learning,
        } => commands::update::run(
            &runner,
            UpdateArgs {
                photos,
                total,
                data_dir,
                no_grid_learning,
            },
        ),
        Commands::Stats { data_dir } => commands::stats::run(&runner, data_dir),
        Commands::Cache { action } => commands::cache::run(&runner, action),
        Commands::Init => commands::init::run(cli.config),
    }
}
