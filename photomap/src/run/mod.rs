//! The update run.
//!
//! A run compares the upstream photo total against the last recorded one
//! and then does one of three things:
//!
//! - **no-op**: the total is unchanged;
//! - **incremental**: fetch the newest `current - last` photos and merge them;
//! - **full reset**: the total shrank, so the store is discarded and rebuilt
//!   from the whole stream. Caches survive a reset.
//!
//! Geocoding failures never fail a run. Source failures fail it before any
//! change is made, and nothing is persisted unless the run completes.

mod engine;
mod error;
mod plan;
mod state;

pub use engine::{run, update, RunOptions, RunResult, RunStats};
pub use error::RunError;
pub use plan::{RunOutcome, RunPlan, DEFAULT_MAX_PHOTOS};
pub use state::MapState;
