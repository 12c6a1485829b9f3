//! One update of the map.

use rand::Rng;
use tracing::{debug, info, warn};

use super::error::RunError;
use super::plan::{RunOutcome, RunPlan, DEFAULT_MAX_PHOTOS};
use super::state::MapState;
use crate::coord::GridResolution;
use crate::geocode::{CountryResolver, GeocodingAuthority, ResolverStats};
use crate::marker::{MarkerIndex, MarkerMerger};
use crate::persist::DataDir;
use crate::source::{FilterReport, ObservationFilter, ObservationSource};
use crate::store::{CountryTable, LocationStore, MapSummary};

/// Options for [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Cap on records fetched in one run.
    pub max_photos: usize,
    /// Which records are mapped.
    pub filter: ObservationFilter,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_photos: DEFAULT_MAX_PHOTOS,
            filter: ObservationFilter::default(),
        }
    }
}

impl RunOptions {
    /// Set the fetch cap.
    pub fn with_max_photos(mut self, max_photos: usize) -> Self {
        self.max_photos = max_photos;
        self
    }

    /// Set the record filter.
    pub fn with_filter(mut self, filter: ObservationFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub plan: RunPlan,
    /// Records returned by the source.
    pub fetched: usize,
    pub filter: FilterReport,
    /// Photo ids seen more than once in this batch.
    pub repeated_photos: usize,
    /// Markers with no coordinate match in the store.
    pub new_markers: usize,
    /// Photos on the new markers.
    pub new_photos: usize,
    /// Photos added to markers already in the store.
    pub appended_photos: usize,
    pub duplicate_photos: usize,
    pub relocated_photos: usize,
    /// New markers kept without a country.
    pub unresolved_markers: usize,
    pub total_countries: usize,
    pub total_markers: usize,
    pub total_photos: usize,
    pub resolver: ResolverStats,
}

impl RunStats {
    fn new(plan: RunPlan, store: &LocationStore) -> Self {
        Self {
            plan,
            fetched: 0,
            filter: FilterReport::default(),
            repeated_photos: 0,
            new_markers: 0,
            new_photos: 0,
            appended_photos: 0,
            duplicate_photos: 0,
            relocated_photos: 0,
            unresolved_markers: 0,
            total_countries: store.country_count(),
            total_markers: store.marker_count(),
            total_photos: store.photo_count(),
            resolver: ResolverStats::default(),
        }
    }

    /// The run's outcome.
    pub fn outcome(&self) -> RunOutcome {
        self.plan.outcome
    }

    /// Photos this run put on the map.
    pub fn added_photos(&self) -> usize {
        self.new_photos + self.appended_photos
    }
}

/// Result of a run: the next state and what happened.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub state: MapState,
    pub stats: RunStats,
    /// Written after a flush; `None` for a no-op run.
    pub summary: Option<MapSummary>,
}

/// Update `state` from `source`.
///
/// The state is taken by value and only returned on success, so a failed run
/// leaves the caller's persisted copy authoritative. The source is fully read
/// before anything changes; after that the run cannot fail, since geocoding
/// failures only leave markers unresolved.
pub fn run<S, A, R>(
    source: &S,
    mut state: MapState,
    resolver: &mut CountryResolver<A>,
    options: &RunOptions,
    rng: &mut R,
) -> Result<RunResult, RunError>
where
    S: ObservationSource + ?Sized,
    A: GeocodingAuthority,
    R: Rng + ?Sized,
{
    let current_total = source.total()?;
    let plan = RunPlan::decide(state.last_total, current_total, options.max_photos);
    let mut stats = RunStats::new(plan, &state.store);

    if plan.outcome == RunOutcome::NoOp {
        info!(total = current_total, "Photo total unchanged, nothing to do");
        return Ok(RunResult {
            state,
            stats,
            summary: None,
        });
    }

    let records = source.fetch(plan.fetch_limit)?;
    stats.fetched = records.len();
    info!(
        outcome = %plan.outcome,
        previous = plan.previous_total,
        current = current_total,
        fetched = records.len(),
        "Fetched photos"
    );

    if plan.outcome == RunOutcome::FullReset {
        warn!(
            previous = plan.previous_total,
            current = current_total,
            "Photos were deleted upstream, rebuilding the whole map"
        );
        state.store = LocationStore::new();
        state.countries = CountryTable::new();
    }

    let (observations, filter_report) = options.filter.apply(&records);
    stats.filter = filter_report;

    let index = MarkerIndex::from_observations(observations);
    stats.repeated_photos = index.repeated_count();

    // Sources yield newest first; newest markers go last
    let mut markers = index.into_markers();
    markers.reverse();

    let report = MarkerMerger::new().merge(&mut state.store, markers);
    stats.appended_photos = report.appended_photos;
    stats.duplicate_photos = report.duplicate_photos;
    stats.relocated_photos = report.relocated_photos;
    stats.new_markers = report.new_markers.len();
    stats.new_photos = report.new_photo_count();

    for marker in report.new_markers {
        let resolution = resolver.resolve(
            marker.coordinate(),
            &mut state.grid,
            &mut state.coordinates,
        );
        if resolution.is_unresolved() {
            stats.unresolved_markers += 1;
        }
        state
            .countries
            .register(&resolution.code, resolution.name.as_deref());
        debug!(
            coordinate = %marker.coordinate(),
            country = %resolution.code,
            photos = marker.len(),
            "Placed new marker"
        );
        state.store.insert_marker(resolution.code, marker);
    }

    // Flush
    state.store.shuffle(rng);
    state.countries.refresh_counts(&state.store);
    state.last_total = Some(current_total);
    let summary = MapSummary::new(&state.store, current_total);

    stats.total_countries = summary.countries;
    stats.total_markers = summary.markers;
    stats.total_photos = summary.photos;
    stats.resolver = resolver.stats();

    info!(
        new_markers = stats.new_markers,
        new_photos = stats.new_photos,
        appended = stats.appended_photos,
        unresolved = stats.unresolved_markers,
        markers = stats.total_markers,
        photos = stats.total_photos,
        countries = stats.total_countries,
        "Map updated"
    );

    Ok(RunResult {
        state,
        stats,
        summary: Some(summary),
    })
}

/// Load state from `data_dir`, [`run`], and save the result.
///
/// Nothing is written for a no-op run.
pub fn update<S, A, R>(
    data_dir: &DataDir,
    resolution: GridResolution,
    source: &S,
    resolver: &mut CountryResolver<A>,
    options: &RunOptions,
    rng: &mut R,
) -> Result<RunResult, RunError>
where
    S: ObservationSource + ?Sized,
    A: GeocodingAuthority,
    R: Rng + ?Sized,
{
    let state = data_dir
        .load_state(resolution)
        .map_err(RunError::StoreCorrupt)?;

    let result = run(source, state, resolver, options, rng)?;

    if result.stats.outcome() != RunOutcome::NoOp {
        data_dir
            .save_state(&result.state, result.summary.as_ref())
            .map_err(RunError::SaveFailed)?;
    }
    Ok(result)
}
