//! Map-wide totals written after each flush.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::location::LocationStore;

/// Totals describing the whole map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSummary {
    /// Countries holding at least one marker.
    pub countries: usize,
    pub markers: usize,
    pub photos: usize,
    /// Markers kept without a country.
    pub unresolved_markers: usize,
    /// Upstream photo total the map was built from.
    pub source_total: u64,
    /// RFC 3339 time of the flush.
    pub updated_at: String,
}

impl MapSummary {
    /// Summarize `store` as of now.
    pub fn new(store: &LocationStore, source_total: u64) -> Self {
        Self {
            countries: store.country_count(),
            markers: store.marker_count(),
            photos: store.photo_count(),
            unresolved_markers: store.unresolved_marker_count(),
            source_total,
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}
