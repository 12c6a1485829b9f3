//! Persistent map contents.
//!
//! [`LocationStore`] owns every marker, partitioned by country.
//! [`CountryTable`] holds display names and counts, where counts are always
//! recomputed from the store at flush time and never trusted across runs.

mod countries;
mod location;
mod summary;

pub use countries::{CountryRecord, CountryTable};
pub use location::{CountryAggregate, LocationStore};
pub use summary::MapSummary;
