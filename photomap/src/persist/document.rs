//! Versioned JSON documents.
//!
//! Every persisted artifact is wrapped in an envelope:
//!
//! ```json
//! { "kind": "locations", "version": 1, "saved_at": "2024-05-01T12:00:00Z", "data": { ... } }
//! ```
//!
//! Writes go to a temporary sibling file which is then renamed over the
//! target, so a crash mid-write leaves the previous document intact.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::PersistError;

/// Current on-disk schema version, shared by all document kinds.
pub const SCHEMA_VERSION: u32 = 1;

/// The independently persisted artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Locations,
    Countries,
    Grid,
    Coordinates,
    LastTotal,
    Summary,
}

impl DocumentKind {
    /// All kinds, in the order they are written.
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::Locations,
        DocumentKind::Countries,
        DocumentKind::Grid,
        DocumentKind::Coordinates,
        DocumentKind::Summary,
        DocumentKind::LastTotal,
    ];

    /// File name inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Locations => "locations.json",
            Self::Countries => "countries.json",
            Self::Grid => "grid.json",
            Self::Coordinates => "coordinates.json",
            Self::LastTotal => "last_total.json",
            Self::Summary => "summary.json",
        }
    }

    /// Short name for logs and envelopes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locations => "locations",
            Self::Countries => "countries",
            Self::Grid => "grid",
            Self::Coordinates => "coordinates",
            Self::LastTotal => "last_total",
            Self::Summary => "summary",
        }
    }

    /// Whether an unreadable copy may be replaced by an empty one.
    pub fn is_disposable(&self) -> bool {
        matches!(self, Self::Grid | Self::Coordinates | Self::Summary)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope around a persisted payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document<T> {
    pub kind: DocumentKind,
    pub version: u32,
    /// RFC 3339 time of the write.
    pub saved_at: String,
    pub data: T,
}

impl<T> Document<T> {
    /// Wrap `data` at the current schema version, stamped now.
    pub fn new(kind: DocumentKind, data: T) -> Self {
        Self {
            kind,
            version: SCHEMA_VERSION,
            saved_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            data,
        }
    }
}

/// Read a document of `kind` from `path`.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn read_document<T: DeserializeOwned>(
    path: &Path,
    kind: DocumentKind,
) -> Result<Option<Document<T>>, PersistError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PersistError::io(path, e)),
    };

    let document: Document<T> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| PersistError::corrupt(path, kind, e.to_string()))?;

    if document.kind != kind {
        return Err(PersistError::corrupt(
            path,
            kind,
            format!("holds a {} document", document.kind),
        ));
    }
    if document.version > SCHEMA_VERSION {
        return Err(PersistError::UnsupportedVersion {
            path: path.to_path_buf(),
            kind,
            found: document.version,
            supported: SCHEMA_VERSION,
        });
    }

    Ok(Some(document))
}

/// Atomically write `data` as a document of `kind` to `path`.
pub fn write_document<T: Serialize>(
    path: &Path,
    kind: DocumentKind,
    data: &T,
) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let file = File::create(&temp_path).map_err(|e| PersistError::io(&temp_path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &Document::new(kind, data)).map_err(|e| {
        PersistError::Serialize {
            kind,
            reason: e.to_string(),
        }
    })?;
    writer
        .flush()
        .map_err(|e| PersistError::io(&temp_path, e))?;
    drop(writer);

    std::fs::rename(&temp_path, path).map_err(|e| PersistError::io(path, e))?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}
