//! Per-run grouping of observations into markers.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::types::{Marker, Observation};
use crate::coord::Coordinate;

/// Groups a run's observations into markers by exact coordinate.
///
/// Markers come out in the order their coordinate was first seen, and photos
/// within a marker in the order they were observed. A photo id seen more than
/// once in the same run is kept only at its first occurrence.
#[derive(Debug, Default)]
pub struct MarkerIndex {
    markers: Vec<Marker>,
    by_coordinate: HashMap<Coordinate, usize>,
    seen_ids: HashSet<String>,
    photos: usize,
    repeated: usize,
}

impl MarkerIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a sequence of observations.
    pub fn from_observations(observations: impl IntoIterator<Item = Observation>) -> Self {
        let mut index = Self::new();
        for observation in observations {
            index.add(observation);
        }
        debug!(
            photos = index.photos,
            markers = index.markers.len(),
            repeated = index.repeated,
            "Indexed observations into markers"
        );
        index
    }

    /// Add one observation.
    ///
    /// Returns false if the photo id was already indexed in this run.
    pub fn add(&mut self, observation: Observation) -> bool {
        if !self.seen_ids.insert(observation.photo.id.clone()) {
            trace!(id = %observation.photo.id, "Skipping repeated photo in run");
            self.repeated += 1;
            return false;
        }

        let Observation { photo, coordinate } = observation;
        match self.by_coordinate.get(&coordinate) {
            Some(&slot) => {
                self.markers[slot].push(photo);
            }
            None => {
                self.by_coordinate.insert(coordinate, self.markers.len());
                self.markers.push(Marker::with_photos(coordinate, [photo]));
            }
        }
        self.photos += 1;
        true
    }

    /// Number of distinct coordinates seen.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Number of photos indexed (repeats excluded).
    pub fn photo_count(&self) -> usize {
        self.photos
    }

    /// Number of observations dropped because their id was already indexed.
    pub fn repeated_count(&self) -> usize {
        self.repeated
    }

    /// Markers in first-seen order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Consume the index, returning markers in first-seen order.
    pub fn into_markers(self) -> Vec<Marker> {
        self.markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lon: f64, lat: f64) -> Coordinate {
        Coordinate::new(lon, lat).unwrap()
    }

    #[test]
    fn test_groups_by_exact_coordinate_in_first_seen_order() {
        let observations = vec![
            Observation::new("1", "u1", at(2.35, 48.85)),
            Observation::new("2", "u2", at(-122.4, 37.8)),
            Observation::new("3", "u3", at(2.35, 48.85)),
            Observation::new("4", "u4", at(13.4, 52.5)),
        ];

        let index = MarkerIndex::from_observations(observations);
        let markers = index.markers();

        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].coordinate(), at(2.35, 48.85));
        assert_eq!(markers[1].coordinate(), at(-122.4, 37.8));
        assert_eq!(markers[2].coordinate(), at(13.4, 52.5));

        let ids: Vec<&str> = markers[0].photos().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(index.photo_count(), 4);
    }

    #[test]
    fn test_near_but_unequal_coordinates_stay_apart() {
        let observations = vec![
            Observation::new("1", "u1", at(2.35, 48.85)),
            Observation::new("2", "u2", at(2.350001, 48.85)),
        ];
        let index = MarkerIndex::from_observations(observations);
        assert_eq!(index.marker_count(), 2);
    }

    #[test]
    fn test_repeated_id_kept_at_first_occurrence() {
        let observations = vec![
            Observation::new("1", "u1", at(2.35, 48.85)),
            Observation::new("1", "u1", at(2.35, 48.85)),
            Observation::new("1", "u1", at(13.4, 52.5)),
        ];
        let index = MarkerIndex::from_observations(observations);

        assert_eq!(index.marker_count(), 1);
        assert_eq!(index.photo_count(), 1);
        assert_eq!(index.repeated_count(), 2);
    }

    #[test]
    fn test_empty_input() {
        let index = MarkerIndex::from_observations(Vec::new());
        assert_eq!(index.marker_count(), 0);
        assert!(index.into_markers().is_empty());
    }
}
