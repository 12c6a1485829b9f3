//! Photo sources.
//!
//! A source reports the upstream photo total and yields photo records newest
//! first. Paging, credentials and retries are the source's concern; the run
//! only sees a finished batch or a [`SourceError`].

mod export;
mod record;

use std::path::PathBuf;

use thiserror::Error;

pub use export::{JsonExportSource, MemorySource};
pub use record::{FilterReport, GeoPrivacy, ObservationFilter, PhotoRecord};

/// Errors raised by an [`ObservationSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source could not be read.
    #[error("Failed to read photo source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source was read but is not a photo listing.
    #[error("Invalid photo listing in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// The source gave up (network, credentials, exhausted retries).
    #[error("Photo source unavailable: {0}")]
    Unavailable(String),
}

/// Where photo records come from.
pub trait ObservationSource {
    /// Number of photos currently upstream, mappable or not.
    fn total(&self) -> Result<u64, SourceError>;

    /// Up to `limit` records, newest first.
    fn fetch(&self, limit: usize) -> Result<Vec<PhotoRecord>, SourceError>;
}

impl<S: ObservationSource + ?Sized> ObservationSource for &S {
    fn total(&self) -> Result<u64, SourceError> {
        (**self).total()
    }

    fn fetch(&self, limit: usize) -> Result<Vec<PhotoRecord>, SourceError> {
        (**self).fetch(limit)
    }
}
