//! Persistence errors.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::document::DocumentKind;

/// Errors from loading or saving persisted documents.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem failure.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document exists but cannot be understood.
    #[error("{kind} document at {path} is corrupt: {reason}")]
    Corrupt {
        path: PathBuf,
        kind: DocumentKind,
        reason: String,
    },

    /// The document was written by a newer schema.
    #[error("{kind} document at {path} has version {found}, newest supported is {supported}")]
    UnsupportedVersion {
        path: PathBuf,
        kind: DocumentKind,
        found: u32,
        supported: u32,
    },

    /// Serialization failed.
    #[error("Failed to serialize {kind} document: {reason}")]
    Serialize { kind: DocumentKind, reason: String },
}

impl PersistError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupt(path: &Path, kind: DocumentKind, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            kind,
            reason: reason.into(),
        }
    }
}
