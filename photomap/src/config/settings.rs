//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;
use std::time::Duration;

use super::file::config_directory;
use crate::coord::{CoordError, GridResolution};
use crate::geocode::{ResolverConfig, RetryPolicy, DEFAULT_GRID_MIN_CONFIRMATIONS};
use crate::run::{RunOptions, DEFAULT_MAX_PHOTOS};
use crate::source::{GeoPrivacy, ObservationFilter};

/// Default HTTP timeout for geocoding requests (seconds).
pub const DEFAULT_GEOCODE_TIMEOUT_SECS: u64 = 30;

/// Default grid resolution (cells per degree).
pub const DEFAULT_GRID_CELLS_PER_DEGREE: u32 = GridResolution::DEFAULT_CELLS_PER_DEGREE;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub store: StoreSettings,
    pub geocode: GeocodeSettings,
    pub source: SourceSettings,
    pub logging: LoggingSettings,
}

/// Where map data lives.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSettings {
    /// Data directory holding the persisted documents
    pub directory: PathBuf,
}

/// Reverse geocoding and cache behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeSettings {
    /// Base URL of a Nominatim-compatible service
    pub endpoint: String,
    /// User agent sent with every request
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Attempts per coordinate before giving up
    pub max_attempts: u32,
    /// Minimum spacing between requests in milliseconds
    pub min_interval_ms: u64,
    /// Write authority answers into the grid cache
    pub trust_grid_learning: bool,
    /// Grid cache resolution
    pub grid_cells_per_degree: u32,
    /// Agreeing answers needed before a grid cell is trusted
    pub grid_min_confirmations: u32,
    /// Copy grid hits into the coordinate cache
    pub cache_grid_hits: bool,
}

/// Which upstream photos are mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    /// Required location visibility: 0 any, 1 public, 2 contacts, 3 friends,
    /// 4 family, 5 friends & family, 6 private
    pub geo_privacy: u8,
    /// Photos with this tag are left off the map (empty: none)
    pub exclude_tag: String,
    /// Cap on photos fetched in one run
    pub max_photos: usize,
}

/// Log output.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            directory: config_directory().join("data"),
        }
    }
}

impl Default for GeocodeSettings {
    fn default() -> Self {
        Self {
            endpoint: crate::geocode::DEFAULT_ENDPOINT.to_string(),
            user_agent: format!("photomap/{}", crate::VERSION),
            timeout: DEFAULT_GEOCODE_TIMEOUT_SECS,
            max_attempts: crate::geocode::DEFAULT_MAX_ATTEMPTS,
            min_interval_ms: crate::geocode::DEFAULT_MIN_INTERVAL_MS,
            trust_grid_learning: true,
            grid_cells_per_degree: DEFAULT_GRID_CELLS_PER_DEGREE,
            grid_min_confirmations: DEFAULT_GRID_MIN_CONFIRMATIONS,
            cache_grid_hits: true,
        }
    }
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            geo_privacy: 0,
            exclude_tag: String::new(),
            max_photos: DEFAULT_MAX_PHOTOS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: config_directory().join("photomap.log"),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            store: StoreSettings::default(),
            geocode: GeocodeSettings::default(),
            source: SourceSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl GeocodeSettings {
    /// Resolver configuration for these settings.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::default()
            .with_trust_grid_learning(self.trust_grid_learning)
            .with_cache_grid_hits(self.cache_grid_hits)
            .with_grid_min_confirmations(self.grid_min_confirmations)
    }

    /// Grid resolution for these settings.
    pub fn grid_resolution(&self) -> Result<GridResolution, CoordError> {
        GridResolution::new(self.grid_cells_per_degree)
    }

    /// Retry policy for authority lookups.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(self.max_attempts)
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Minimum spacing between requests.
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl SourceSettings {
    /// Run options for these settings.
    pub fn run_options(&self) -> RunOptions {
        let filter = ObservationFilter::default()
            .with_geo_privacy(GeoPrivacy::from_level(self.geo_privacy))
            .with_exclude_tag(self.exclude_tag.clone());
        RunOptions::default()
            .with_max_photos(self.max_photos)
            .with_filter(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();

        assert!(config.store.directory.ends_with(".photomap/data"));
        assert_eq!(config.geocode.max_attempts, crate::geocode::DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.geocode.grid_cells_per_degree, 10);
        assert!(config.geocode.user_agent.starts_with("photomap/"));
        assert_eq!(config.source.geo_privacy, 0);
        assert_eq!(config.source.max_photos, 100_000);
    }

    #[test]
    fn test_resolver_config_mapping() {
        let settings = GeocodeSettings {
            trust_grid_learning: false,
            grid_min_confirmations: 3,
            ..GeocodeSettings::default()
        };
        let resolver = settings.resolver_config();

        assert!(!resolver.trust_grid_learning);
        assert!(resolver.cache_grid_hits);
        assert_eq!(resolver.grid_min_confirmations, 3);
    }

    #[test]
    fn test_run_options_mapping() {
        let settings = SourceSettings {
            geo_privacy: 1,
            exclude_tag: "nomap".to_string(),
            max_photos: 500,
        };
        let options = settings.run_options();

        assert_eq!(options.max_photos, 500);
        assert_eq!(options.filter.geo_privacy, Some(GeoPrivacy::Public));
        assert_eq!(options.filter.exclude_tag.as_deref(), Some("nomap"));
    }

    #[test]
    fn test_any_privacy_means_no_filter() {
        let options = SourceSettings::default().run_options();
        assert_eq!(options.filter.geo_privacy, None);
        assert_eq!(options.filter.exclude_tag, None);
    }
}
