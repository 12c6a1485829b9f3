//! Run errors.

use thiserror::Error;

use crate::persist::PersistError;
use crate::source::SourceError;

/// Fatal run errors. Each one leaves the persisted state untouched.
///
/// Per-marker geocoding failures are not errors: those markers are kept
/// under the unresolved country and counted in the run statistics.
#[derive(Debug, Error)]
pub enum RunError {
    /// The photo source failed before any change was made.
    #[error("Photo source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    /// The persisted store or country table cannot be read.
    #[error("Persisted map is unreadable: {0}")]
    StoreCorrupt(#[source] PersistError),

    /// The new state could not be written.
    #[error("Failed to save map: {0}")]
    SaveFailed(#[source] PersistError),
}
