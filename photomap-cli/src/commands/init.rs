//! Init command - initialize configuration file.

use std::path::PathBuf;

use console::style;
use photomap::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
pub fn run(config_path: Option<PathBuf>) -> Result<(), CliError> {
    let path = config_path.unwrap_or_else(config_file_path);

    if ConfigFile::ensure_exists(&path)? {
        println!(
            "{} Created configuration file: {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    } else {
        println!(
            "{}",
            style("Existing configuration found, left unchanged.").yellow()
        );
        println!("Configuration file: {}", style(path.display()).cyan());
    }

    let config = ConfigFile::load_from(&path)?;
    println!();
    println!("Data directory: {}", config.store.directory.display());
    println!("Geocoder:       {}", config.geocode.endpoint);
    println!();
    println!("Edit this file to customize Photomap settings.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
