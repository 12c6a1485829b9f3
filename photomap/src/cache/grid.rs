//! Coarse grid-cell cache.
//!
//! Nearby coordinates usually share a country, so the authority's answers are
//! remembered per grid cell. A cell's classification is an approximation: a
//! cell straddling a border would answer wrongly for part of its area. Two
//! safeguards keep that from poisoning the cache:
//!
//! - a cell is only trusted after the same country has been confirmed a
//!   minimum number of times;
//! - the first disagreement marks the cell [`GridClassification::Ambiguous`]
//!   for good, and ambiguous cells always defer to the authority.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::coord::{to_grid_cell, Coordinate, GridCell, GridResolution};
use crate::geocode::CountryCode;

/// What a grid cell is known to contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GridClassification {
    /// Every lookup in the cell so far agreed on one country.
    Country {
        code: CountryCode,
        /// Number of authority answers that agreed.
        confirmations: u32,
    },
    /// Lookups in the cell disagreed; the cell crosses a border.
    Ambiguous,
}

impl GridClassification {
    /// The country, if it has been confirmed at least `min_confirmations` times.
    pub fn trusted_country(&self, min_confirmations: u32) -> Option<&CountryCode> {
        match self {
            Self::Country {
                code,
                confirmations,
            } if *confirmations >= min_confirmations => Some(code),
            _ => None,
        }
    }

    /// Returns true for an ambiguous cell.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous)
    }
}

/// Result of teaching the grid one authority answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnOutcome {
    /// First answer for the cell.
    Created,
    /// Answer agreed with the cell's country.
    Confirmed,
    /// Answer disagreed; the cell is now ambiguous.
    MarkedAmbiguous,
    /// The cell was already ambiguous.
    AlreadyAmbiguous,
    /// Unresolved answers carry no spatial information and are not learned.
    Ignored,
}

/// Spatial cache: grid cell → [`GridClassification`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GridSnapshot", into = "GridSnapshot")]
pub struct GridCache {
    resolution: GridResolution,
    cells: HashMap<GridCell, GridClassification>,
}

impl GridCache {
    /// Create an empty grid at `resolution`.
    pub fn new(resolution: GridResolution) -> Self {
        Self {
            resolution,
            cells: HashMap::new(),
        }
    }

    /// Quantization used for every cell in this grid.
    pub fn resolution(&self) -> GridResolution {
        self.resolution
    }

    /// The cell containing `coordinate`.
    pub fn cell_for(&self, coordinate: &Coordinate) -> GridCell {
        to_grid_cell(coordinate, self.resolution)
    }

    /// Classification of the cell containing `coordinate`.
    pub fn classify(&self, coordinate: &Coordinate) -> Option<&GridClassification> {
        self.cells.get(&self.cell_for(coordinate))
    }

    /// Classification of `cell`.
    pub fn get(&self, cell: &GridCell) -> Option<&GridClassification> {
        self.cells.get(cell)
    }

    /// Record that the authority placed `coordinate` in `code`.
    pub fn learn(&mut self, coordinate: &Coordinate, code: &CountryCode) -> LearnOutcome {
        if code.is_unresolved() {
            return LearnOutcome::Ignored;
        }

        let cell = self.cell_for(coordinate);
        match self.cells.get_mut(&cell) {
            None => {
                self.cells.insert(
                    cell,
                    GridClassification::Country {
                        code: code.clone(),
                        confirmations: 1,
                    },
                );
                debug!(%cell, country = %code, "Grid cell learned");
                LearnOutcome::Created
            }
            Some(GridClassification::Ambiguous) => LearnOutcome::AlreadyAmbiguous,
            Some(GridClassification::Country {
                code: known,
                confirmations,
            }) => {
                if known == code {
                    *confirmations = confirmations.saturating_add(1);
                    LearnOutcome::Confirmed
                } else {
                    warn!(
                        %cell,
                        known = %known,
                        observed = %code,
                        "Grid cell straddles a border, marking ambiguous"
                    );
                    self.cells.insert(cell, GridClassification::Ambiguous);
                    LearnOutcome::MarkedAmbiguous
                }
            }
        }
    }

    /// Number of classified cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if no cell is classified.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of ambiguous cells.
    pub fn ambiguous_count(&self) -> usize {
        self.cells.values().filter(|c| c.is_ambiguous()).count()
    }

    /// Drop every cell, keeping the resolution.
    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Persisted form of a [`GridCache`]: `"row:col"` keys, sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GridSnapshot {
    cells_per_degree: GridResolution,
    cells: BTreeMap<String, GridClassification>,
}

impl From<GridSnapshot> for GridCache {
    fn from(snapshot: GridSnapshot) -> Self {
        let mut cells = HashMap::with_capacity(snapshot.cells.len());
        for (key, classification) in snapshot.cells {
            match key.parse::<GridCell>() {
                Ok(cell) => {
                    cells.insert(cell, classification);
                }
                Err(e) => warn!(key = %key, error = %e, "Skipping malformed grid cache entry"),
            }
        }
        Self {
            resolution: snapshot.cells_per_degree,
            cells,
        }
    }
}

impl From<GridCache> for GridSnapshot {
    fn from(grid: GridCache) -> Self {
        Self {
            cells_per_degree: grid.resolution,
            cells: grid
                .cells
                .into_iter()
                .map(|(cell, classification)| (cell.key(), classification))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lon: f64, lat: f64) -> Coordinate {
        Coordinate::new(lon, lat).unwrap()
    }

    fn fr() -> CountryCode {
        CountryCode::new("FR")
    }

    #[test]
    fn test_learn_then_confirm() {
        let mut grid = GridCache::default();

        assert_eq!(grid.learn(&at(2.35, 48.85), &fr()), LearnOutcome::Created);
        assert_eq!(grid.learn(&at(2.36, 48.86), &fr()), LearnOutcome::Confirmed);

        let classification = grid.classify(&at(2.31, 48.81)).unwrap();
        assert_eq!(classification.trusted_country(2), Some(&fr()));
        assert_eq!(classification.trusted_country(3), None);
    }

    #[test]
    fn test_disagreement_marks_cell_ambiguous_for_good() {
        let mut grid = GridCache::default();
        let point = at(7.55, 47.55);

        grid.learn(&point, &CountryCode::new("CH"));
        assert_eq!(
            grid.learn(&point, &CountryCode::new("DE")),
            LearnOutcome::MarkedAmbiguous
        );
        assert_eq!(
            grid.learn(&point, &CountryCode::new("CH")),
            LearnOutcome::AlreadyAmbiguous
        );

        let classification = grid.classify(&point).unwrap();
        assert!(classification.is_ambiguous());
        assert_eq!(classification.trusted_country(1), None);
        assert_eq!(grid.ambiguous_count(), 1);
    }

    #[test]
    fn test_unresolved_is_not_learned() {
        let mut grid = GridCache::default();
        assert_eq!(
            grid.learn(&at(-30.0, 0.5), &CountryCode::unresolved()),
            LearnOutcome::Ignored
        );
        assert!(grid.is_empty());
    }

    #[test]
    fn test_cells_are_independent() {
        let mut grid = GridCache::new(GridResolution::new(1).unwrap());
        grid.learn(&at(2.35, 48.85), &fr());

        assert!(grid.classify(&at(3.5, 48.85)).is_none());
        assert!(grid.classify(&at(2.99, 48.01)).is_some());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut grid = GridCache::new(GridResolution::new(4).unwrap());
        grid.learn(&at(2.35, 48.85), &fr());
        grid.learn(&at(7.55, 47.55), &CountryCode::new("CH"));
        grid.learn(&at(7.55, 47.55), &CountryCode::new("DE"));

        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["cells_per_degree"], 4);
        assert_eq!(json["cells"]["195:9"]["state"], "country");
        assert_eq!(json["cells"]["195:9"]["code"], "FR");
        assert_eq!(json["cells"]["190:30"]["state"], "ambiguous");

        let back: GridCache = serde_json::from_value(json).unwrap();
        assert_eq!(back, grid);
    }
}
