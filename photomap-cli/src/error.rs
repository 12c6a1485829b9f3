//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use photomap::config::ConfigFileError;
use photomap::geocode::GeocodeError;
use photomap::persist::PersistError;
use photomap::run::RunError;
use photomap::source::SourceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to set up the geocoding client
    Geocoder(GeocodeError),
    /// The update run failed
    Run(RunError),
    /// Failed to read or write the data directory
    Data(PersistError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Run(RunError::SourceUnavailable(SourceError::Parse { .. })) => {
                eprintln!();
                eprintln!("The photo listing must be a JSON array of photos, or an");
                eprintln!("object with a \"photos\" array and an optional \"total\".");
            }
            CliError::Run(RunError::StoreCorrupt(_)) => {
                eprintln!();
                eprintln!("The saved map could not be read. Nothing was changed.");
                eprintln!("Restore the data directory from a backup, or move it aside");
                eprintln!("to rebuild the map from scratch on the next update.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Geocoder(e) => write!(f, "Failed to set up geocoding: {}", e),
            CliError::Run(e) => write!(f, "Update failed: {}", e),
            CliError::Data(e) => write!(f, "Data directory error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Geocoder(e) => Some(e),
            CliError::Run(e) => Some(e),
            CliError::Data(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<RunError> for CliError {
    fn from(e: RunError) -> Self {
        CliError::Run(e)
    }
}

impl From<PersistError> for CliError {
    fn from(e: PersistError) -> Self {
        CliError::Data(e)
    }
}

impl From<GeocodeError> for CliError {
    fn from(e: GeocodeError) -> Self {
        CliError::Geocoder(e)
    }
}
