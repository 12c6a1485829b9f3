//! Serialization of `ConfigFile` back to commented INI text.

use super::settings::ConfigFile;

/// Render a configuration as an INI document with explanatory comments.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"; Photomap configuration
; Missing keys fall back to their defaults.

[store]
; Directory holding locations, countries, caches and the run summary
directory = {directory}

[geocode]
; Nominatim-compatible reverse geocoding service
endpoint = {endpoint}
; User agent sent with every request (public Nominatim requires one)
user_agent = {user_agent}
; Request timeout in seconds
timeout = {timeout}
; Attempts per coordinate before the marker is left unresolved
max_attempts = {max_attempts}
; Minimum spacing between requests in milliseconds
min_interval_ms = {min_interval_ms}
; Learn grid cells from authority answers
trust_grid_learning = {trust_grid_learning}
; Grid cells per degree (1 to 10000000); changing this discards the learned grid
grid_cells_per_degree = {grid_cells_per_degree}
; Agreeing answers needed before a grid cell is trusted
grid_min_confirmations = {grid_min_confirmations}
; Copy grid hits into the exact coordinate cache
cache_grid_hits = {cache_grid_hits}

[source]
; Required location visibility
; 0 any, 1 public, 2 contacts, 3 friends, 4 family, 5 friends & family, 6 private
geo_privacy = {geo_privacy}
; Photos carrying this tag are left off the map (empty: none)
exclude_tag = {exclude_tag}
; Cap on photos fetched in one run
max_photos = {max_photos}

[logging]
; Log file, truncated at the start of each session
file = {log_file}
"#,
        directory = config.store.directory.display(),
        endpoint = config.geocode.endpoint,
        user_agent = config.geocode.user_agent,
        timeout = config.geocode.timeout,
        max_attempts = config.geocode.max_attempts,
        min_interval_ms = config.geocode.min_interval_ms,
        trust_grid_learning = config.geocode.trust_grid_learning,
        grid_cells_per_degree = config.geocode.grid_cells_per_degree,
        grid_min_confirmations = config.geocode.grid_min_confirmations,
        cache_grid_hits = config.geocode.cache_grid_hits,
        geo_privacy = config.source.geo_privacy,
        exclude_tag = config.source.exclude_tag,
        max_photos = config.source.max_photos,
        log_file = config.logging.file.display(),
    )
}
