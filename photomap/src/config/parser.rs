//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use super::file::ConfigFileError;
use crate::coord::GridResolution;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [store] section
    if let Some(section) = ini.section(Some("store")) {
        if let Some(v) = non_empty(section, "directory") {
            config.store.directory = expand_tilde(v);
        }
    }

    // [geocode] section
    if let Some(section) = ini.section(Some("geocode")) {
        if let Some(v) = non_empty(section, "endpoint") {
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid("geocode", "endpoint", v, "must be an http(s) URL"));
            }
            config.geocode.endpoint = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty(section, "user_agent") {
            config.geocode.user_agent = v.to_string();
        }
        if let Some(v) = section.get("timeout") {
            config.geocode.timeout =
                parse_positive(v, "geocode", "timeout", "must be a positive integer (seconds)")?;
        }
        if let Some(v) = section.get("max_attempts") {
            config.geocode.max_attempts =
                parse_positive(v, "geocode", "max_attempts", "must be a positive integer")?;
        }
        if let Some(v) = section.get("min_interval_ms") {
            config.geocode.min_interval_ms = parse_number(
                v,
                "geocode",
                "min_interval_ms",
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = section.get("trust_grid_learning") {
            config.geocode.trust_grid_learning = parse_flag(v, "geocode", "trust_grid_learning")?;
        }
        if let Some(v) = section.get("grid_cells_per_degree") {
            let cells: u32 = parse_number(
                v,
                "geocode",
                "grid_cells_per_degree",
                "must be a positive integer",
            )?;
            GridResolution::new(cells)
                .map_err(|e| invalid("geocode", "grid_cells_per_degree", v, &e.to_string()))?;
            config.geocode.grid_cells_per_degree = cells;
        }
        if let Some(v) = section.get("grid_min_confirmations") {
            config.geocode.grid_min_confirmations = parse_positive(
                v,
                "geocode",
                "grid_min_confirmations",
                "must be a positive integer",
            )?;
        }
        if let Some(v) = section.get("cache_grid_hits") {
            config.geocode.cache_grid_hits = parse_flag(v, "geocode", "cache_grid_hits")?;
        }
    }

    // [source] section
    if let Some(section) = ini.section(Some("source")) {
        if let Some(v) = section.get("geo_privacy") {
            let level: u8 = parse_number(v, "source", "geo_privacy", "must be between 0 and 6")?;
            if level > 6 {
                return Err(invalid("source", "geo_privacy", v, "must be between 0 and 6"));
            }
            config.source.geo_privacy = level;
        }
        if let Some(v) = section.get("exclude_tag") {
            config.source.exclude_tag = v.trim().to_string();
        }
        if let Some(v) = section.get("max_photos") {
            config.source.max_photos =
                parse_positive(v, "source", "max_photos", "must be a positive integer")?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "file") {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: FromStr>(
    value: &str,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_positive<T: FromStr + PartialOrd + Default>(
    value: &str,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    let parsed: T = parse_number(value, section, key, reason)?;
    if parsed <= T::default() {
        return Err(invalid(section, key, value, reason));
    }
    Ok(parsed)
}

/// Parse a boolean value from a config string.
///
/// Returns `None` for anything but true/false, 1/0, yes/no or on/off.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_flag(value: &str, section: &str, key: &str) -> Result<bool, ConfigFileError> {
    parse_bool(value).ok_or_else(|| {
        invalid(section, key, value, "must be true/false, yes/no, on/off or 1/0")
    })
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_is_default() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_overlays_values() {
        let config = parse(
            "[store]\ndirectory = /srv/map\n\
             [geocode]\nendpoint = http://localhost:8080/\ntimeout = 5\n\
             trust_grid_learning = no\ngrid_cells_per_degree = 4\n\
             [source]\ngeo_privacy = 1\nexclude_tag = NoMap\nmax_photos = 5000\n",
        )
        .unwrap();

        assert_eq!(config.store.directory, PathBuf::from("/srv/map"));
        assert_eq!(config.geocode.endpoint, "http://localhost:8080");
        assert_eq!(config.geocode.timeout, 5);
        assert!(!config.geocode.trust_grid_learning);
        assert_eq!(config.geocode.grid_cells_per_degree, 4);
        assert_eq!(config.source.geo_privacy, 1);
        assert_eq!(config.source.exclude_tag, "NoMap");
        assert_eq!(config.source.max_photos, 5000);
    }

    #[test]
    fn test_rejects_out_of_range_privacy() {
        let err = parse("[source]\ngeo_privacy = 9\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { ref key, .. } if key == "geo_privacy"));
    }

    #[test]
    fn test_rejects_zero_resolution() {
        assert!(parse("[geocode]\ngrid_cells_per_degree = 0\n").is_err());
    }

    #[test]
    fn test_rejects_non_url_endpoint() {
        assert!(parse("[geocode]\nendpoint = nominatim.local\n").is_err());
    }

    #[test]
    fn test_rejects_resolution_beyond_index_range() {
        let err = parse("[geocode]\ngrid_cells_per_degree = 100000000\n").unwrap_err();
        assert!(
            matches!(err, ConfigFileError::InvalidValue { ref key, .. } if key == "grid_cells_per_degree")
        );
        assert!(parse("[geocode]\ngrid_cells_per_degree = 10000000\n").is_ok());
    }

    #[test]
    fn test_rejects_misspelled_flag() {
        let err = parse("[geocode]\ntrust_grid_learning = ture\n").unwrap_err();
        assert!(
            matches!(err, ConfigFileError::InvalidValue { ref key, .. } if key == "trust_grid_learning")
        );
        assert!(parse("[geocode]\ncache_grid_hits = maybe\n").is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool(" 1 "), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("Off"), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_bool("ture"), None);
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/maps"), home.join("maps"));
        }
    }
}
