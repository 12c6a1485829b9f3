//! Reconciliation of a run's markers against the persisted store.
//!
//! Incoming markers whose coordinate already exists in the store donate their
//! photos to the stored marker; the rest are returned as genuinely new and go
//! on to country resolution.
//!
//! # Photo identity
//!
//! A photo id may appear at most once in the whole store. When an incoming
//! photo id is already stored:
//!
//! - at the same coordinate, it is a duplicate and is skipped;
//! - at a different coordinate (the photo was re-located upstream), the stored
//!   copy wins and the incoming one is skipped and counted as relocated.
//!   Stored markers never shrink; a full reset is what picks up moves.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::types::Marker;
use crate::coord::Coordinate;
use crate::store::LocationStore;

/// Outcome of merging one run's markers into the store.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Markers with no coordinate match in the store, in incoming order.
    pub new_markers: Vec<Marker>,
    /// Stored markers that received at least one incoming marker.
    pub matched_markers: usize,
    /// Photos appended to stored markers.
    pub appended_photos: usize,
    /// Incoming photos already present at the same coordinate.
    pub duplicate_photos: usize,
    /// Incoming photos already stored under a different coordinate.
    pub relocated_photos: usize,
}

impl MergeReport {
    /// Number of photos carried by the genuinely new markers.
    pub fn new_photo_count(&self) -> usize {
        self.new_markers.iter().map(Marker::len).sum()
    }
}

/// Merges incoming markers into a [`LocationStore`].
///
/// Incoming markers are indexed by coordinate so each stored marker is matched
/// with one hash lookup.
#[derive(Debug, Default)]
pub struct MarkerMerger;

impl MarkerMerger {
    /// Create a new merger.
    pub fn new() -> Self {
        Self
    }

    /// Merge `incoming` into `store`.
    ///
    /// Stored markers gain any photos not yet recorded; the returned report
    /// holds the markers that matched nothing. Merging the same batch twice
    /// leaves the store unchanged the second time.
    pub fn merge(&self, store: &mut LocationStore, incoming: Vec<Marker>) -> MergeReport {
        let mut report = MergeReport::default();
        let mut known: HashMap<String, Coordinate> = store.photo_locations();

        // Fold repeated coordinates into the first marker carrying them
        let mut pending: HashMap<Coordinate, usize> = HashMap::with_capacity(incoming.len());
        let mut slots: Vec<Option<Marker>> = Vec::with_capacity(incoming.len());
        for marker in incoming {
            match pending.get(&marker.coordinate()) {
                Some(&slot) => {
                    if let Some(target) = slots[slot].as_mut() {
                        for photo in marker.into_photos() {
                            target.push(photo);
                        }
                    }
                }
                None => {
                    pending.insert(marker.coordinate(), slots.len());
                    slots.push(Some(marker));
                }
            }
        }

        for stored in store.markers_mut() {
            let Some(slot) = pending.remove(&stored.coordinate()) else {
                continue;
            };
            let Some(candidate) = slots[slot].take() else {
                continue;
            };
            report.matched_markers += 1;

            let here = stored.coordinate();
            for photo in candidate.into_photos() {
                if place(&mut known, &mut report, &photo.id, here) == Placement::Fresh {
                    stored.push(photo);
                    report.appended_photos += 1;
                }
            }
        }

        for mut marker in slots.into_iter().flatten() {
            let here = marker.coordinate();
            marker.retain_photos(|photo| {
                place(&mut known, &mut report, &photo.id, here) == Placement::Fresh
            });

            if !marker.is_empty() {
                report.new_markers.push(marker);
            }
        }

        if report.appended_photos > 0 {
            info!(
                photos = report.appended_photos,
                markers = report.matched_markers,
                "Added new photos to existing markers"
            );
        }
        debug!(
            new_markers = report.new_markers.len(),
            duplicates = report.duplicate_photos,
            relocated = report.relocated_photos,
            "Merged run markers into store"
        );

        report
    }
}

/// Where an incoming photo ends up relative to what is already stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Already stored at this coordinate.
    Duplicate,
    /// Already stored at another coordinate; the stored copy wins.
    Relocated,
    /// Not stored anywhere yet; now recorded at `here`.
    Fresh,
}

/// Classify one incoming photo id at `here`, counting skips in `report`.
fn place(
    known: &mut HashMap<String, Coordinate>,
    report: &mut MergeReport,
    id: &str,
    here: Coordinate,
) -> Placement {
    match known.get(id) {
        Some(at) if *at == here => {
            report.duplicate_photos += 1;
            Placement::Duplicate
        }
        Some(at) => {
            warn!(
                id = %id,
                stored = %at,
                incoming = %here,
                "Photo already mapped elsewhere, keeping stored location"
            );
            report.relocated_photos += 1;
            Placement::Relocated
        }
        None => {
            known.insert(id.to_string(), here);
            Placement::Fresh
        }
    }
}
