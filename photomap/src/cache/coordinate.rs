//! Exact-coordinate cache.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::coord::Coordinate;
use crate::geocode::CountryCode;

/// Exact-match cache: coordinate → resolved country code.
///
/// Entries may hold the unresolved code, recording that the authority
/// answered "no country" for that point so it is not asked again.
///
/// Serializes as a `"lon,lat" → code` object with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, CountryCode>", into = "BTreeMap<String, CountryCode>")]
pub struct CoordinateCache {
    entries: HashMap<Coordinate, CountryCode>,
}

impl CoordinateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached country for `coordinate`, if any.
    pub fn get(&self, coordinate: &Coordinate) -> Option<&CountryCode> {
        self.entries.get(coordinate)
    }

    /// Record the country for `coordinate`, replacing any previous entry.
    pub fn insert(&mut self, coordinate: Coordinate, code: CountryCode) {
        self.entries.insert(coordinate, code);
    }

    /// Returns true if `coordinate` has an entry.
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        self.entries.contains_key(coordinate)
    }

    /// Number of cached coordinates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries recording an unresolved lookup.
    pub fn unresolved_count(&self) -> usize {
        self.entries.values().filter(|c| c.is_unresolved()).count()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl From<BTreeMap<String, CountryCode>> for CoordinateCache {
    fn from(raw: BTreeMap<String, CountryCode>) -> Self {
        let mut entries = HashMap::with_capacity(raw.len());
        for (key, code) in raw {
            match key.parse::<Coordinate>() {
                Ok(coordinate) => {
                    entries.insert(coordinate, code);
                }
                Err(e) => warn!(key = %key, error = %e, "Skipping malformed coordinate cache entry"),
            }
        }
        Self { entries }
    }
}

impl From<CoordinateCache> for BTreeMap<String, CountryCode> {
    fn from(cache: CoordinateCache) -> Self {
        cache
            .entries
            .into_iter()
            .map(|(coordinate, code)| (coordinate.key(), code))
            .collect()
    }
}
