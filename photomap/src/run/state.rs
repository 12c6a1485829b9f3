//! Everything a run reads and produces.

use crate::cache::{CoordinateCache, GridCache};
use crate::coord::GridResolution;
use crate::store::{CountryTable, LocationStore};

/// Map state carried from one run to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapState {
    pub store: LocationStore,
    pub countries: CountryTable,
    pub grid: GridCache,
    pub coordinates: CoordinateCache,
    /// Upstream total seen by the last successful run.
    pub last_total: Option<u64>,
}

impl MapState {
    /// Empty state with a grid at `resolution`.
    pub fn new(resolution: GridResolution) -> Self {
        Self {
            grid: GridCache::new(resolution),
            ..Self::default()
        }
    }
}
