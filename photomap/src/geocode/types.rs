//! Country identity types and the geocoding authority contract.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::Coordinate;

/// Normalized country code (upper-case, trimmed).
///
/// The empty code is the "unresolved" partition: markers whose country could
/// not be determined are stored under it rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Normalize and wrap a raw code.
    ///
    /// `"fr "` becomes `"FR"`. The ambiguous-cell sentinel `"*"` is not a
    /// country and normalizes to unresolved.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let code = raw.as_ref().trim().to_ascii_uppercase();
        if code == "*" {
            return Self::unresolved();
        }
        Self(code)
    }

    /// The unresolved placeholder code.
    pub fn unresolved() -> Self {
        Self(String::new())
    }

    /// Returns true for the unresolved placeholder.
    pub fn is_unresolved(&self) -> bool {
        self.0.is_empty()
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unresolved() {
            write!(f, "<unresolved>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<String> for CountryCode {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for CountryCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

/// A country as reported by the geocoding authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Country {
    /// Normalized code.
    pub code: CountryCode,
    /// Display name (trimmed, may be empty if the authority gave none).
    pub name: String,
}

impl Country {
    /// Create a country, normalizing the code and trimming the name.
    pub fn new(code: impl AsRef<str>, name: impl AsRef<str>) -> Self {
        Self {
            code: CountryCode::new(code),
            name: name.as_ref().trim().to_string(),
        }
    }
}

/// Errors returned by a geocoding authority.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    /// Network or transport failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The authority refused the request because of its rate limit.
    #[error("Rate limited by geocoding service")]
    RateLimited,

    /// Unexpected HTTP status.
    #[error("HTTP {status} from geocoding service")]
    Http { status: u16 },

    /// The response could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Every allowed attempt failed.
    #[error("Geocoding unavailable after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<GeocodeError>,
    },
}

impl GeocodeError {
    /// Returns true if a retry may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::RateLimited => true,
            Self::Http { status } => *status >= 500,
            Self::InvalidResponse(_) | Self::Exhausted { .. } => false,
        }
    }
}

/// Reverse geocoding authority: resolves a coordinate to a country.
///
/// Calls are expected to be slow, rate limited and fallible. `Ok(None)`
/// means the authority answered but the point lies in no country (open
/// water, for example).
pub trait GeocodingAuthority: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Look up the country containing `coordinate`.
    fn lookup(&self, coordinate: Coordinate) -> Result<Option<Country>, GeocodeError>;
}

impl<A: GeocodingAuthority + ?Sized> GeocodingAuthority for &A {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn lookup(&self, coordinate: Coordinate) -> Result<Option<Country>, GeocodeError> {
        (**self).lookup(coordinate)
    }
}

impl<A: GeocodingAuthority + ?Sized> GeocodingAuthority for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn lookup(&self, coordinate: Coordinate) -> Result<Option<Country>, GeocodeError> {
        (**self).lookup(coordinate)
    }
}
