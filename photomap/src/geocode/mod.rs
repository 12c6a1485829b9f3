//! Reverse geocoding: coordinate → country.
//!
//! The [`GeocodingAuthority`] trait is the seam to the outside world; the
//! shipped implementation is [`NominatimAuthority`] over an [`HttpClient`].
//! [`RetryingAuthority`] adds bounded retries, and [`CountryResolver`] puts
//! the caches from [`crate::cache`] in front of it all.

mod http;
mod nominatim;
mod resolver;
mod retry;
mod types;

pub use http::{HttpClient, ReqwestClient};
pub use nominatim::{NominatimAuthority, DEFAULT_ENDPOINT, DEFAULT_MIN_INTERVAL_MS};
pub use resolver::{
    CountryResolver, Resolution, ResolutionSource, ResolverConfig, ResolverStats,
    DEFAULT_GRID_MIN_CONFIRMATIONS,
};
pub use retry::{RetryPolicy, RetryingAuthority, DEFAULT_MAX_ATTEMPTS};
pub use types::{Country, CountryCode, GeocodeError, GeocodingAuthority};
