//! Persistence of map state as versioned JSON documents.
//!
//! Each artifact (location store, country table, grid cache, coordinate
//! cache, summary, last total) is an independent document in a
//! [`DataDir`], so losing one never takes the others with it.

mod data_dir;
mod document;
mod error;

pub use data_dir::DataDir;
pub use document::{read_document, write_document, Document, DocumentKind, SCHEMA_VERSION};
pub use error::PersistError;
