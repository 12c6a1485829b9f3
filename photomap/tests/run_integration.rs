//! Integration tests for the update run.
//!
//! These tests drive the complete flow through the public API:
//! - source → marker index → merge → country resolution → store flush
//! - incremental, no-op and full reset runs
//! - persistence of state through a data directory
//!
//! Run with: `cargo test --test run_integration`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use photomap::coord::{Coordinate, GridResolution};
use photomap::geocode::{
    Country, CountryCode, CountryResolver, GeocodeError, GeocodingAuthority, ResolverConfig,
};
use photomap::marker::{Marker, PhotoRef};
use photomap::persist::{DataDir, DocumentKind};
use photomap::run::{run, update, MapState, RunError, RunOptions, RunOutcome};
use photomap::source::{MemorySource, PhotoRecord};

// ============================================================================
// Helper Functions
// ============================================================================

/// Authority answering from a fixed table and recording every call.
struct RecordingAuthority {
    table: Vec<(Coordinate, Country)>,
    calls: AtomicUsize,
    asked: Mutex<Vec<Coordinate>>,
}

impl RecordingAuthority {
    fn new(table: Vec<(Coordinate, Country)>) -> Self {
        Self {
            table,
            calls: AtomicUsize::new(0),
            asked: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeocodingAuthority for RecordingAuthority {
    fn name(&self) -> &str {
        "recording"
    }

    fn lookup(&self, coordinate: Coordinate) -> Result<Option<Country>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.asked.lock().unwrap().push(coordinate);
        Ok(self
            .table
            .iter()
            .find(|(c, _)| *c == coordinate)
            .map(|(_, country)| country.clone()))
    }
}

fn coord(lon: f64, lat: f64) -> Coordinate {
    Coordinate::new(lon, lat).unwrap()
}

fn resolver(authority: &RecordingAuthority) -> CountryResolver<&RecordingAuthority> {
    CountryResolver::new(authority, ResolverConfig::default())
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

const PARIS: (f64, f64) = (2.35, 48.85);
const SAN_FRANCISCO: (f64, f64) = (-122.4, 37.8);

fn france() -> RecordingAuthority {
    RecordingAuthority::new(vec![(
        coord(PARIS.0, PARIS.1),
        Country::new("FR", "France"),
    )])
}

// ============================================================================
// Merge Scenarios
// ============================================================================

/// A known coordinate only gains photos and never reaches the authority.
#[test]
fn test_existing_marker_absorbs_batch_without_resolution() {
    let us = CountryCode::new("US");
    let mut state = MapState::new(GridResolution::default());
    state.store.insert_marker(
        us.clone(),
        Marker::with_photos(
            coord(SAN_FRANCISCO.0, SAN_FRANCISCO.1),
            [PhotoRef::new("111", "url1")],
        ),
    );
    state.countries.register(&us, Some("United States"));
    state.last_total = Some(1);

    // Newest first; window of two covers both records
    let source = MemorySource::new(vec![
        PhotoRecord::new("222", "url2", SAN_FRANCISCO.0, SAN_FRANCISCO.1),
        PhotoRecord::new("111", "url1", SAN_FRANCISCO.0, SAN_FRANCISCO.1),
    ])
    .with_total(3);
    let authority = RecordingAuthority::new(Vec::new());

    let result = run(
        &source,
        state,
        &mut resolver(&authority),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap();

    assert_eq!(result.stats.outcome(), RunOutcome::Incremental);
    assert_eq!(result.stats.new_markers, 0);
    assert_eq!(result.stats.appended_photos, 1);
    assert_eq!(result.stats.duplicate_photos, 1);
    assert_eq!(authority.calls(), 0);

    let partition = result.state.store.partition(&us).unwrap();
    assert_eq!(partition.len(), 1);
    let ids: Vec<&str> = partition[0].photos().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["111", "222"]);

    let record = result.state.countries.get(&us).unwrap();
    assert_eq!(record.markers, 1);
    assert_eq!(record.photos, 2);
}

/// A first sighting is resolved once and remembered.
#[test]
fn test_new_marker_is_resolved_and_cached() {
    let source = MemorySource::new(vec![PhotoRecord::new("1", "url", PARIS.0, PARIS.1)]);
    let authority = france();

    let result = run(
        &source,
        MapState::new(GridResolution::default()),
        &mut resolver(&authority),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap();

    let fr = CountryCode::new("FR");
    let store = &result.state.store;
    assert_eq!(store.country_count(), 1);
    assert_eq!(store.partition(&fr).unwrap().len(), 1);
    assert_eq!(store.photo_count(), 1);
    assert_eq!(
        result.state.coordinates.get(&coord(PARIS.0, PARIS.1)),
        Some(&fr)
    );
    assert_eq!(result.state.countries.get(&fr).unwrap().name, "France");
    assert_eq!(authority.calls(), 1);
    assert_eq!(
        *authority.asked.lock().unwrap(),
        vec![coord(PARIS.0, PARIS.1)]
    );
}

/// A coordinate cache hit answers without the authority.
#[test]
fn test_cached_coordinate_skips_authority() {
    let mut state = MapState::new(GridResolution::default());
    state
        .coordinates
        .insert(coord(PARIS.0, PARIS.1), CountryCode::new("FR"));
    let source = MemorySource::new(vec![PhotoRecord::new("1", "url", PARIS.0, PARIS.1)]);
    let authority = RecordingAuthority::new(Vec::new());

    let result = run(
        &source,
        state,
        &mut resolver(&authority),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap();

    assert_eq!(authority.calls(), 0);
    assert_eq!(result.stats.resolver.coordinate_hits, 1);
    assert!(result
        .state
        .store
        .partition(&CountryCode::new("FR"))
        .is_some());
}

// ============================================================================
// Run Outcomes
// ============================================================================

#[test]
fn test_unchanged_total_is_noop() {
    let mut state = MapState::new(GridResolution::default());
    state.last_total = Some(1);
    let source = MemorySource::new(vec![PhotoRecord::new("1", "url", PARIS.0, PARIS.1)]);
    let authority = france();

    let result = run(
        &source,
        state.clone(),
        &mut resolver(&authority),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap();

    assert_eq!(result.stats.outcome(), RunOutcome::NoOp);
    assert_eq!(result.state, state);
    assert_eq!(authority.calls(), 0);
}

/// Deleting photos upstream rebuilds the store from scratch.
#[test]
fn test_shrinking_total_resets_store() {
    let mut state = MapState::new(GridResolution::default());
    state.store.insert_marker(
        CountryCode::new("US"),
        Marker::with_photos(
            coord(SAN_FRANCISCO.0, SAN_FRANCISCO.1),
            [PhotoRef::new("111", "url1")],
        ),
    );
    state.coordinates.insert(
        coord(SAN_FRANCISCO.0, SAN_FRANCISCO.1),
        CountryCode::new("US"),
    );
    state.last_total = Some(5);
    let authority = france();

    let result = run(
        &MemorySource::new(Vec::new()),
        state,
        &mut resolver(&authority),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap();

    assert_eq!(result.stats.outcome(), RunOutcome::FullReset);
    assert!(result.state.store.is_empty());
    assert_eq!(result.state.countries.populated_count(), 0);
    assert_eq!(result.state.last_total, Some(0));
    // Caches survive
    assert_eq!(result.state.coordinates.len(), 1);
}

#[test]
fn test_reset_keeps_only_current_photos() {
    let mut state = MapState::new(GridResolution::default());
    state.store.insert_marker(
        CountryCode::new("US"),
        Marker::with_photos(
            coord(SAN_FRANCISCO.0, SAN_FRANCISCO.1),
            [PhotoRef::new("111", "url1")],
        ),
    );
    state.last_total = Some(3);
    let source = MemorySource::new(vec![
        PhotoRecord::new("2", "b", PARIS.0, PARIS.1),
        PhotoRecord::new("1", "a", PARIS.0, PARIS.1),
    ]);
    let authority = france();

    let result = run(
        &source,
        state,
        &mut resolver(&authority),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap();

    let store = &result.state.store;
    assert_eq!(store.marker_count(), 1);
    assert_eq!(store.photo_count(), 2);
    assert!(store.partition(&CountryCode::new("US")).is_none());
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_update_persists_and_reloads() {
    let temp = TempDir::new().unwrap();
    let data_dir = DataDir::new(temp.path());
    let resolution = GridResolution::default();
    let source = MemorySource::new(vec![
        PhotoRecord::new("2", "b", PARIS.0, PARIS.1),
        PhotoRecord::new("1", "a", -30.0, 0.5),
    ]);
    let authority = france();

    let result = update(
        &data_dir,
        resolution,
        &source,
        &mut resolver(&authority),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap();

    let reloaded = data_dir.load_state(resolution).unwrap();
    assert_eq!(reloaded, result.state);
    assert_eq!(reloaded.last_total, Some(2));
    assert_eq!(reloaded.store.unresolved_marker_count(), 1);

    let summary = data_dir.load_summary().unwrap();
    assert_eq!(summary.markers, 2);
    assert_eq!(summary.countries, 1);
    assert_eq!(summary.source_total, 2);

    // Same total again: nothing fetched, nothing resolved
    let second = update(
        &data_dir,
        resolution,
        &source,
        &mut resolver(&authority),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap();
    assert_eq!(second.stats.outcome(), RunOutcome::NoOp);
    assert_eq!(authority.calls(), 2);
}

#[test]
fn test_source_failure_leaves_disk_untouched() {
    let temp = TempDir::new().unwrap();
    let data_dir = DataDir::new(temp.path());
    let resolution = GridResolution::default();
    let authority = france();

    update(
        &data_dir,
        resolution,
        &MemorySource::new(vec![PhotoRecord::new("1", "a", PARIS.0, PARIS.1)]),
        &mut resolver(&authority),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap();
    let before: Vec<Option<Vec<u8>>> = DocumentKind::ALL
        .iter()
        .map(|kind| std::fs::read(data_dir.path(*kind)).ok())
        .collect();

    let err = update(
        &data_dir,
        resolution,
        &MemorySource::unavailable(),
        &mut resolver(&authority),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap_err();

    assert!(matches!(err, RunError::SourceUnavailable(_)));
    let after: Vec<Option<Vec<u8>>> = DocumentKind::ALL
        .iter()
        .map(|kind| std::fs::read(data_dir.path(*kind)).ok())
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_corrupt_store_fails_fast() {
    let temp = TempDir::new().unwrap();
    let data_dir = DataDir::new(temp.path());
    std::fs::write(data_dir.path(DocumentKind::Locations), "{ not json").unwrap();
    let authority = france();

    let err = update(
        &data_dir,
        GridResolution::default(),
        &MemorySource::new(vec![PhotoRecord::new("1", "a", PARIS.0, PARIS.1)]),
        &mut resolver(&authority),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap_err();

    assert!(matches!(err, RunError::StoreCorrupt(_)));
    assert_eq!(authority.calls(), 0);
}
