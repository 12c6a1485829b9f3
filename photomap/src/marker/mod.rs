//! Location markers.
//!
//! A marker is every photo sharing one exact coordinate. This module groups a
//! run's observations into markers ([`MarkerIndex`]) and reconciles them with
//! the persisted store ([`MarkerMerger`]).
//!
//! # Example
//!
//! ```
//! use photomap::coord::Coordinate;
//! use photomap::marker::{MarkerIndex, MarkerMerger, Observation};
//! use photomap::store::LocationStore;
//!
//! let here = Coordinate::new(2.35, 48.85).unwrap();
//! let index = MarkerIndex::from_observations(vec![
//!     Observation::new("1", "https://example.com/1_s.jpg", here),
//!     Observation::new("2", "https://example.com/2_s.jpg", here),
//! ]);
//!
//! let mut store = LocationStore::new();
//! let report = MarkerMerger::new().merge(&mut store, index.into_markers());
//! assert_eq!(report.new_markers.len(), 1);
//! assert_eq!(report.new_markers[0].len(), 2);
//! ```

mod index;
mod merge;
mod types;

pub use index::MarkerIndex;
pub use merge::{MarkerMerger, MergeReport};
pub use types::{Marker, Observation, PhotoRef};
