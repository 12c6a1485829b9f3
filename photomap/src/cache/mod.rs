//! Advisory country caches.
//!
//! Two side tables sit in front of the geocoding authority:
//!
//! - [`CoordinateCache`]: exact coordinate → country, for photos taken at the
//!   same spot;
//! - [`GridCache`]: coarse cell → country classification, for photos taken
//!   near each other.
//!
//! Neither is authoritative over marker existence. Losing either only costs
//! extra authority lookups.

mod coordinate;
mod grid;

pub use coordinate::CoordinateCache;
pub use grid::{GridCache, GridClassification, LearnOutcome};

/// Size summary of both caches, for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Cached exact coordinates.
    pub coordinates: usize,
    /// Cached coordinates that resolved to no country.
    pub unresolved_coordinates: usize,
    /// Classified grid cells.
    pub grid_cells: usize,
    /// Grid cells marked ambiguous.
    pub ambiguous_cells: usize,
    /// Grid resolution in cells per degree.
    pub cells_per_degree: u32,
}

impl CacheStats {
    /// Collect statistics from both caches.
    pub fn collect(grid: &GridCache, coordinates: &CoordinateCache) -> Self {
        Self {
            coordinates: coordinates.len(),
            unresolved_coordinates: coordinates.unresolved_count(),
            grid_cells: grid.len(),
            ambiguous_cells: grid.ambiguous_count(),
            cells_per_degree: grid.resolution().cells_per_degree(),
        }
    }
}
