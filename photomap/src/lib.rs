//! Photomap - country-partitioned location map for a geotagged photo stream
//!
//! This library groups photo observations into location markers keyed by exact
//! coordinate and merges them, run after run, into a persistent database
//! partitioned by country. Country resolution is backed by a two-tier cache
//! (exact coordinate + coarse grid cell) in front of a rate-limited reverse
//! geocoding authority.
//!
//! # Data Flow
//!
//! ```text
//! ObservationSource ──► MarkerIndex ──► MarkerMerger ──► CountryResolver ──► LocationStore
//!                                          │                  │                  │
//!                                    (existing store)  CoordinateCache     flush: shuffle,
//!                                                       GridCache          recompute counts
//!                                                       GeocodingAuthority
//! ```
//!
//! The entry point is [`run::run`], which takes the previous [`run::MapState`]
//! by value and returns the next one. Nothing is written to disk by the core;
//! persistence lives in [`persist`] and is driven by the caller after a
//! successful run.

pub mod cache;
pub mod config;
pub mod coord;
pub mod geocode;
pub mod logging;
pub mod marker;
pub mod persist;
pub mod run;
pub mod source;
pub mod store;

/// Library version, stamped into persisted documents and log output.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
