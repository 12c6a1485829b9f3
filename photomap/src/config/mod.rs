//! Configuration for photomap.
//!
//! Settings live in `~/.photomap/config.ini`. A missing file or key falls
//! back to defaults; values that are present but malformed are errors.
//!
//! # Sections
//!
//! - `[store]` data directory
//! - `[geocode]` authority endpoint, retry, throttle and grid cache tuning
//! - `[source]` photo filters and fetch cap
//! - `[logging]` log file

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, GeocodeSettings, LoggingSettings, SourceSettings, StoreSettings,
    DEFAULT_GEOCODE_TIMEOUT_SECS, DEFAULT_GRID_CELLS_PER_DEGREE,
};
