//! Observation and marker data types.

use serde::{Deserialize, Serialize};

use crate::coord::Coordinate;

/// A photo as attached to a marker: identifier plus thumbnail reference.
///
/// Identity is the `id` alone. Two references with the same id but a
/// different thumbnail URL are the same photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    /// Upstream photo identifier.
    pub id: String,
    /// Thumbnail URL shown in the rendered map.
    pub thumbnail: String,
}

impl PhotoRef {
    /// Create a new photo reference.
    pub fn new(id: impl Into<String>, thumbnail: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            thumbnail: thumbnail.into(),
        }
    }
}

/// One photo observed in the current run, with the coordinate it was taken at.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// The photo itself.
    pub photo: PhotoRef,
    /// Exact coordinate stored upstream for the photo.
    pub coordinate: Coordinate,
}

impl Observation {
    /// Create a new observation.
    pub fn new(id: impl Into<String>, thumbnail: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            photo: PhotoRef::new(id, thumbnail),
            coordinate,
        }
    }

    /// The observation's photo identifier.
    pub fn id(&self) -> &str {
        &self.photo.id
    }
}

/// All photos sharing one exact coordinate.
///
/// Photos are kept in insertion order and are unique by id within the marker.
/// Once stored, a marker only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    coordinate: Coordinate,
    photos: Vec<PhotoRef>,
}

impl Marker {
    /// Create an empty marker at a coordinate.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            photos: Vec::new(),
        }
    }

    /// Create a marker from a coordinate and photos, dropping repeated ids.
    pub fn with_photos(coordinate: Coordinate, photos: impl IntoIterator<Item = PhotoRef>) -> Self {
        let mut marker = Self::new(coordinate);
        for photo in photos {
            marker.push(photo);
        }
        marker
    }

    /// The marker's exact coordinate.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Photos attached to this marker, oldest first.
    pub fn photos(&self) -> &[PhotoRef] {
        &self.photos
    }

    /// Number of photos on the marker.
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Returns true if the marker holds no photos.
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Returns true if a photo with this id is attached.
    pub fn contains(&self, id: &str) -> bool {
        self.photos.iter().any(|p| p.id == id)
    }

    /// Append a photo unless one with the same id is already attached.
    ///
    /// Returns true if the photo was appended.
    pub fn push(&mut self, photo: PhotoRef) -> bool {
        if self.contains(&photo.id) {
            return false;
        }
        self.photos.push(photo);
        true
    }

    /// Keep only the photos matching the predicate.
    pub(crate) fn retain_photos(&mut self, keep: impl FnMut(&PhotoRef) -> bool) {
        self.photos.retain(keep);
    }

    /// Consume the marker, returning its photos.
    pub fn into_photos(self) -> Vec<PhotoRef> {
        self.photos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> Coordinate {
        Coordinate::new(-122.4, 37.8).unwrap()
    }

    #[test]
    fn test_push_dedups_by_id() {
        let mut marker = Marker::new(here());
        assert!(marker.push(PhotoRef::new("111", "url1")));
        assert!(!marker.push(PhotoRef::new("111", "url1")));
        // Same id, different thumbnail is still the same photo
        assert!(!marker.push(PhotoRef::new("111", "url1-edited")));
        assert!(marker.push(PhotoRef::new("222", "url2")));

        assert_eq!(marker.len(), 2);
        assert_eq!(marker.photos()[0].thumbnail, "url1");
    }

    #[test]
    fn test_with_photos_preserves_order() {
        let marker = Marker::with_photos(
            here(),
            vec![
                PhotoRef::new("3", "c"),
                PhotoRef::new("1", "a"),
                PhotoRef::new("3", "c"),
                PhotoRef::new("2", "b"),
            ],
        );
        let ids: Vec<&str> = marker.photos().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_marker_serde_shape() {
        let marker = Marker::with_photos(here(), vec![PhotoRef::new("111", "url1")]);
        let json = serde_json::to_value(&marker).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "coordinate": [-122.4, 37.8],
                "photos": [{"id": "111", "thumbnail": "url1"}]
            })
        );
    }

    #[test]
    fn test_observation_accessors() {
        let obs = Observation::new("42", "thumb", here());
        assert_eq!(obs.id(), "42");
        assert_eq!(obs.coordinate, here());
    }
}
