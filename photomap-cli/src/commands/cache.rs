//! Cache management CLI commands.

use std::path::PathBuf;

use clap::Subcommand;
use photomap::cache::CacheStats;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show geocoding cache statistics
    Stats {
        /// Data directory (defaults to the configured one)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Drop both geocoding caches; the map itself is kept
    Clear {
        /// Data directory (defaults to the configured one)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

/// Run a cache subcommand.
pub fn run(runner: &CliRunner, action: CacheAction) -> Result<(), CliError> {
    match action {
        CacheAction::Stats { data_dir } => {
            let data_dir = runner.data_dir(data_dir);
            let grid = data_dir.load_grid(runner.grid_resolution()?);
            let coordinates = data_dir.load_coordinates();
            let stats = CacheStats::collect(&grid, &coordinates);

            println!("Geocoding caches: {}", data_dir.root().display());
            println!(
                "  Coordinates: {} ({} without a country)",
                stats.coordinates, stats.unresolved_coordinates
            );
            println!(
                "  Grid cells:  {} ({} ambiguous, {} per degree)",
                stats.grid_cells, stats.ambiguous_cells, stats.cells_per_degree
            );
            Ok(())
        }
        CacheAction::Clear { data_dir } => {
            let data_dir = runner.data_dir(data_dir);
            println!("Clearing geocoding caches at: {}", data_dir.root().display());

            let removed = data_dir.clear_caches()?;
            println!("Removed {} cache file(s)", removed);
            Ok(())
        }
    }
}
