//! The on-disk data directory.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::document::{read_document, write_document, DocumentKind};
use super::error::PersistError;
use crate::cache::{CoordinateCache, GridCache};
use crate::coord::GridResolution;
use crate::run::MapState;
use crate::store::{CountryTable, LocationStore, MapSummary};

/// Directory holding one map's persisted documents.
///
/// The location store and country table are loaded strictly: a corrupt copy
/// is an error, since guessing would risk losing photos. The caches, the
/// summary and the last total are disposable and load as empty (with a
/// warning) when unreadable.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Use `root` as the data directory. Nothing is created until a save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document of `kind`.
    pub fn path(&self, kind: DocumentKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    /// Load the location store; empty if absent.
    pub fn load_store(&self) -> Result<LocationStore, PersistError> {
        let path = self.path(DocumentKind::Locations);
        let store = read_document::<LocationStore>(&path, DocumentKind::Locations)?
            .map(|d| d.data)
            .unwrap_or_default();
        info!(
            path = %path.display(),
            markers = store.marker_count(),
            photos = store.photo_count(),
            "Loaded location store"
        );
        Ok(store)
    }

    /// Load the country table; empty if absent.
    pub fn load_countries(&self) -> Result<CountryTable, PersistError> {
        let path = self.path(DocumentKind::Countries);
        Ok(read_document::<CountryTable>(&path, DocumentKind::Countries)?
            .map(|d| d.data)
            .unwrap_or_default())
    }

    /// Load the grid cache.
    ///
    /// A grid saved at a different resolution is discarded, since its cells
    /// would not line up.
    pub fn load_grid(&self, resolution: GridResolution) -> GridCache {
        match self.load_disposable::<GridCache>(DocumentKind::Grid) {
            Some(grid) if grid.resolution() == resolution => {
                debug!(cells = grid.len(), "Loaded grid cache");
                grid
            }
            Some(grid) => {
                warn!(
                    saved = grid.resolution().cells_per_degree(),
                    configured = resolution.cells_per_degree(),
                    "Grid cache resolution changed, starting with an empty grid"
                );
                GridCache::new(resolution)
            }
            None => GridCache::new(resolution),
        }
    }

    /// Load the coordinate cache.
    pub fn load_coordinates(&self) -> CoordinateCache {
        let cache = self
            .load_disposable::<CoordinateCache>(DocumentKind::Coordinates)
            .unwrap_or_default();
        debug!(entries = cache.len(), "Loaded coordinate cache");
        cache
    }

    /// Load the upstream total recorded by the last successful run.
    pub fn load_last_total(&self) -> Option<u64> {
        self.load_disposable(DocumentKind::LastTotal)
    }

    /// Load the summary written by the last successful run.
    pub fn load_summary(&self) -> Option<MapSummary> {
        self.load_disposable(DocumentKind::Summary)
    }

    /// Load everything a run needs.
    pub fn load_state(&self, resolution: GridResolution) -> Result<MapState, PersistError> {
        Ok(MapState {
            store: self.load_store()?,
            countries: self.load_countries()?,
            grid: self.load_grid(resolution),
            coordinates: self.load_coordinates(),
            last_total: self.load_last_total(),
        })
    }

    /// Persist a run's resulting state.
    ///
    /// The last total is written last, so an interrupted save makes the next
    /// run redo the work rather than skip it.
    pub fn save_state(
        &self,
        state: &MapState,
        summary: Option<&MapSummary>,
    ) -> Result<(), PersistError> {
        write_document(
            &self.path(DocumentKind::Locations),
            DocumentKind::Locations,
            &state.store,
        )?;
        write_document(
            &self.path(DocumentKind::Countries),
            DocumentKind::Countries,
            &state.countries,
        )?;
        self.save_caches(&state.grid, &state.coordinates)?;
        if let Some(summary) = summary {
            write_document(
                &self.path(DocumentKind::Summary),
                DocumentKind::Summary,
                summary,
            )?;
        }
        if let Some(total) = state.last_total {
            write_document(
                &self.path(DocumentKind::LastTotal),
                DocumentKind::LastTotal,
                &total,
            )?;
        }

        info!(
            path = %self.root.display(),
            markers = state.store.marker_count(),
            photos = state.store.photo_count(),
            "Saved map state"
        );
        Ok(())
    }

    /// Persist both caches.
    pub fn save_caches(
        &self,
        grid: &GridCache,
        coordinates: &CoordinateCache,
    ) -> Result<(), PersistError> {
        write_document(&self.path(DocumentKind::Grid), DocumentKind::Grid, grid)?;
        write_document(
            &self.path(DocumentKind::Coordinates),
            DocumentKind::Coordinates,
            coordinates,
        )
    }

    /// Delete both cache documents. Returns how many files were removed.
    pub fn clear_caches(&self) -> Result<usize, PersistError> {
        let mut removed = 0;
        for kind in [DocumentKind::Grid, DocumentKind::Coordinates] {
            let path = self.path(kind);
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(PersistError::io(&path, e)),
            }
        }
        info!(removed, "Cleared geocoding caches");
        Ok(removed)
    }

    fn load_disposable<T: DeserializeOwned>(&self, kind: DocumentKind) -> Option<T> {
        let path = self.path(kind);
        match read_document::<T>(&path, kind) {
            Ok(document) => document.map(|d| d.data),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable {} document", kind);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::geocode::CountryCode;
    use crate::marker::{Marker, PhotoRef};
    use tempfile::TempDir;

    fn sample_state() -> MapState {
        let paris = Coordinate::new(2.35, 48.85).unwrap();
        let mut state = MapState::new(GridResolution::default());
        state.store.insert_marker(
            CountryCode::new("FR"),
            Marker::with_photos(paris, [PhotoRef::new("1", "a")]),
        );
        state.countries.register(&CountryCode::new("FR"), Some("France"));
        state.countries.refresh_counts(&state.store);
        state.grid.learn(&paris, &CountryCode::new("FR"));
        state.coordinates.insert(paris, CountryCode::new("FR"));
        state.last_total = Some(10);
        state
    }

    #[test]
    fn test_empty_directory_loads_empty_state() {
        let temp = TempDir::new().unwrap();
        let dir = DataDir::new(temp.path().join("map"));

        let state = dir.load_state(GridResolution::default()).unwrap();

        assert!(state.store.is_empty());
        assert!(state.countries.is_empty());
        assert!(state.grid.is_empty());
        assert!(state.coordinates.is_empty());
        assert_eq!(state.last_total, None);
    }

    #[test]
    fn test_save_and_load_state() {
        let temp = TempDir::new().unwrap();
        let dir = DataDir::new(temp.path());
        let state = sample_state();
        let summary = MapSummary::new(&state.store, 10);

        dir.save_state(&state, Some(&summary)).unwrap();
        let loaded = dir.load_state(GridResolution::default()).unwrap();

        assert_eq!(loaded, state);
        assert_eq!(dir.load_summary().unwrap().photos, 1);
    }

    #[test]
    fn test_corrupt_store_fails_fast() {
        let temp = TempDir::new().unwrap();
        let dir = DataDir::new(temp.path());
        std::fs::write(dir.path(DocumentKind::Locations), "not json").unwrap();

        let err = dir.load_state(GridResolution::default()).unwrap_err();
        assert!(matches!(err, PersistError::Corrupt { .. }));
    }

    #[test]
    fn test_corrupt_caches_degrade_to_empty() {
        let temp = TempDir::new().unwrap();
        let dir = DataDir::new(temp.path());
        dir.save_state(&sample_state(), None).unwrap();
        std::fs::write(dir.path(DocumentKind::Grid), "{").unwrap();
        std::fs::write(dir.path(DocumentKind::Coordinates), "[1, 2").unwrap();

        let loaded = dir.load_state(GridResolution::default()).unwrap();

        assert!(loaded.grid.is_empty());
        assert!(loaded.coordinates.is_empty());
        assert_eq!(loaded.store.photo_count(), 1);
    }

    #[test]
    fn test_grid_with_other_resolution_is_discarded() {
        let temp = TempDir::new().unwrap();
        let dir = DataDir::new(temp.path());
        dir.save_state(&sample_state(), None).unwrap();

        let grid = dir.load_grid(GridResolution::new(4).unwrap());

        assert!(grid.is_empty());
        assert_eq!(grid.resolution().cells_per_degree(), 4);
    }

    #[test]
    fn test_clear_caches() {
        let temp = TempDir::new().unwrap();
        let dir = DataDir::new(temp.path());
        dir.save_state(&sample_state(), None).unwrap();

        assert_eq!(dir.clear_caches().unwrap(), 2);
        assert_eq!(dir.clear_caches().unwrap(), 0);
        assert!(dir.path(DocumentKind::Locations).exists());
    }
}
