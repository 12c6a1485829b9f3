//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`cache`] - Geocoding cache management (stats, clear)
//! - [`init`] - Configuration initialization
//! - [`stats`] - Per-country map statistics
//! - [`update`] - Merge new photos into the map

pub mod cache;
pub mod init;
pub mod stats;
pub mod update;
