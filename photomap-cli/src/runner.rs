//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading, logging initialization and geocoder
//! construction to reduce duplication across command handlers.

use std::path::{Path, PathBuf};

use tracing::info;

use photomap::config::{config_file_path, ConfigFile};
use photomap::coord::GridResolution;
use photomap::geocode::{NominatimAuthority, ReqwestClient, RetryingAuthority};
use photomap::logging::{init_logging, LoggingGuard};
use photomap::persist::DataDir;

use crate::error::CliError;

/// Authority stack used by the CLI: Nominatim over HTTP, with retries.
pub type CliAuthority = RetryingAuthority<NominatimAuthority<ReqwestClient>>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load configuration and initialize logging.
    ///
    /// `config_path` overrides `~/.photomap/config.ini`. `verbose` enables
    /// debug-level logging unless RUST_LOG says otherwise.
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        let config = load_config(config_path)?;

        let logging_guard = init_logging(&config.logging.file, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("Photomap v{}", photomap::VERSION);
        info!("Photomap CLI: {} command", command);
    }

    /// Data directory, preferring the command line override.
    pub fn data_dir(&self, override_dir: Option<PathBuf>) -> DataDir {
        DataDir::new(override_dir.unwrap_or_else(|| self.config.store.directory.clone()))
    }

    /// Grid resolution from configuration.
    pub fn grid_resolution(&self) -> Result<GridResolution, CliError> {
        self.config.geocode.grid_resolution().map_err(|e| {
            CliError::Config(format!("geocode.grid_cells_per_degree: {}", e))
        })
    }

    /// Build the reverse geocoding authority from configuration.
    pub fn create_authority(&self) -> Result<CliAuthority, CliError> {
        let settings = &self.config.geocode;
        let http = ReqwestClient::new(&settings.user_agent, settings.timeout())?;
        let nominatim = NominatimAuthority::new(http)
            .with_endpoint(settings.endpoint.clone())
            .with_min_interval(settings.min_interval());

        info!(
            endpoint = %settings.endpoint,
            max_attempts = settings.max_attempts,
            "Geocoding authority ready"
        );
        Ok(RetryingAuthority::new(nominatim, settings.retry_policy()))
    }
}

/// Load configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load_from(&config_file_path())?,
    };
    Ok(config)
}
