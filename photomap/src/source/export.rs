//! File-backed and in-memory sources.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::record::PhotoRecord;
use super::{ObservationSource, SourceError};

#[derive(Deserialize)]
#[serde(untagged)]
enum ExportFile {
    Listing {
        #[serde(default)]
        total: Option<u64>,
        photos: Vec<PhotoRecord>,
    },
    Bare(Vec<PhotoRecord>),
}

/// Reads an exported photo listing (JSON).
///
/// Accepted shapes are `{"total": 123, "photos": [...]}` or a bare array of
/// photos, newest first. Without a `total` the array length is used.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    path: PathBuf,
    total_override: Option<u64>,
}

impl JsonExportSource {
    /// Source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            total_override: None,
        }
    }

    /// Report `total` instead of the value stored in the file.
    pub fn with_total(mut self, total: Option<u64>) -> Self {
        self.total_override = total;
        self
    }

    /// The listing path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<(Option<u64>, Vec<PhotoRecord>), SourceError> {
        let bytes = std::fs::read(&self.path).map_err(|e| SourceError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        let export: ExportFile =
            serde_json::from_slice(&bytes).map_err(|e| SourceError::Parse {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        Ok(match export {
            ExportFile::Listing { total, photos } => (total, photos),
            ExportFile::Bare(photos) => (None, photos),
        })
    }
}

impl ObservationSource for JsonExportSource {
    fn total(&self) -> Result<u64, SourceError> {
        if let Some(total) = self.total_override {
            return Ok(total);
        }
        let (total, photos) = self.read()?;
        Ok(total.unwrap_or(photos.len() as u64))
    }

    fn fetch(&self, limit: usize) -> Result<Vec<PhotoRecord>, SourceError> {
        let (_, mut photos) = self.read()?;
        photos.truncate(limit);
        debug!(path = %self.path.display(), records = photos.len(), "Read photo listing");
        Ok(photos)
    }
}

/// In-memory source, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<PhotoRecord>,
    total: Option<u64>,
    unavailable: bool,
}

impl MemorySource {
    /// Source holding `records`, newest first.
    pub fn new(records: Vec<PhotoRecord>) -> Self {
        Self {
            records,
            total: None,
            unavailable: false,
        }
    }

    /// Report `total` instead of the record count.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// A source whose every call fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), SourceError> {
        if self.unavailable {
            return Err(SourceError::Unavailable("source marked unavailable".into()));
        }
        Ok(())
    }
}

impl ObservationSource for MemorySource {
    fn total(&self) -> Result<u64, SourceError> {
        self.check()?;
        Ok(self.total.unwrap_or(self.records.len() as u64))
    }

    fn fetch(&self, limit: usize) -> Result<Vec<PhotoRecord>, SourceError> {
        self.check()?;
        Ok(self.records.iter().take(limit).cloned().collect())
    }
}
