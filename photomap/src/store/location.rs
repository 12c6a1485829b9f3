//! Country-partitioned marker store.

use std::collections::{BTreeMap, HashMap};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;
use crate::geocode::CountryCode;
use crate::marker::Marker;

/// Marker and photo totals for one country, derived from store contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountryAggregate {
    pub markers: usize,
    pub photos: usize,
}

/// Mapping from country code to that country's ordered markers.
///
/// The unresolved code holds markers whose country could not be determined.
/// Serializes as a `code → [marker]` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationStore {
    partitions: BTreeMap<CountryCode, Vec<Marker>>,
}

impl LocationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the store holds no markers.
    pub fn is_empty(&self) -> bool {
        self.partitions.values().all(Vec::is_empty)
    }

    /// Append `marker` to the end of `code`'s partition.
    pub fn insert_marker(&mut self, code: CountryCode, marker: Marker) {
        self.partitions.entry(code).or_default().push(marker);
    }

    /// Markers stored under `code`.
    pub fn partition(&self, code: &CountryCode) -> Option<&[Marker]> {
        self.partitions.get(code).map(Vec::as_slice)
    }

    /// Every partition in code order.
    pub fn partitions(&self) -> impl Iterator<Item = (&CountryCode, &[Marker])> {
        self.partitions
            .iter()
            .map(|(code, markers)| (code, markers.as_slice()))
    }

    /// Mutable access to every stored marker.
    pub fn markers_mut(&mut self) -> impl Iterator<Item = &mut Marker> {
        self.partitions.values_mut().flat_map(|markers| markers.iter_mut())
    }

    /// Every stored photo id with the coordinate it is recorded at.
    pub fn photo_locations(&self) -> HashMap<String, Coordinate> {
        let mut locations = HashMap::with_capacity(self.photo_count());
        for marker in self.partitions.values().flatten() {
            for photo in marker.photos() {
                locations.insert(photo.id.clone(), marker.coordinate());
            }
        }
        locations
    }

    /// Total markers across all partitions.
    pub fn marker_count(&self) -> usize {
        self.partitions.values().map(Vec::len).sum()
    }

    /// Total photos across all partitions.
    pub fn photo_count(&self) -> usize {
        self.partitions
            .values()
            .flatten()
            .map(Marker::len)
            .sum()
    }

    /// Number of resolved countries holding at least one marker.
    pub fn country_count(&self) -> usize {
        self.partitions
            .iter()
            .filter(|(code, markers)| !code.is_unresolved() && !markers.is_empty())
            .count()
    }

    /// Markers in the unresolved partition.
    pub fn unresolved_marker_count(&self) -> usize {
        self.partitions
            .get(&CountryCode::unresolved())
            .map_or(0, Vec::len)
    }

    /// Per-country totals computed by a full scan.
    ///
    /// Empty partitions are omitted.
    pub fn recompute_aggregates(&self) -> BTreeMap<CountryCode, CountryAggregate> {
        self.partitions
            .iter()
            .filter(|(_, markers)| !markers.is_empty())
            .map(|(code, markers)| {
                let aggregate = CountryAggregate {
                    markers: markers.len(),
                    photos: markers.iter().map(Marker::len).sum(),
                };
                (code.clone(), aggregate)
            })
            .collect()
    }

    /// Randomize marker order within each partition.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for markers in self.partitions.values_mut() {
            markers.shuffle(rng);
        }
    }
}
