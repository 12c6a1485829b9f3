//! Core coordinate types.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors that can occur when building or parsing coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude outside [-90, 90] or not finite.
    #[error("Invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] or not finite.
    #[error("Invalid longitude: {0}")]
    InvalidLongitude(f64),

    /// Grid resolution of zero, or too fine for cell indices to fit in `i32`.
    #[error(
        "Invalid grid resolution: {0} cells per degree (must be 1 to {max})",
        max = GridResolution::MAX_CELLS_PER_DEGREE
    )]
    InvalidResolution(u32),

    /// A persisted key could not be parsed.
    #[error("Malformed key '{0}'")]
    MalformedKey(String),
}

/// An exact (longitude, latitude) pair.
///
/// Equality and hashing are exact on the bit pattern of both components: two
/// photos belong to the same marker only if their stored coordinates are
/// identical. Negative zero is folded into positive zero on construction so
/// that `0.0` and `-0.0` compare equal, as they do under `==`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    lon: f64,
    lat: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lon: f64, lat: f64) -> Result<Self, CoordError> {
        if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }

        // -0.0 + 0.0 == +0.0
        Ok(Self {
            lon: lon + 0.0,
            lat: lat + 0.0,
        })
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Stable string key (`"lon,lat"`) used by persisted tables.
    ///
    /// Uses the shortest representation that parses back to the same bits,
    /// so `key().parse()` always yields an equal coordinate.
    pub fn key(&self) -> String {
        format!("{},{}", self.lon, self.lat)
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.lon.to_bits() == other.lon.to_bits() && self.lat.to_bits() == other.lat.to_bits()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lon.to_bits().hash(state);
        self.lat.to_bits().hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lon, self.lat)
    }
}

impl FromStr for Coordinate {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lon, lat) = s
            .split_once(',')
            .ok_or_else(|| CoordError::MalformedKey(s.to_string()))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| CoordError::MalformedKey(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| CoordError::MalformedKey(s.to_string()))?;
        Self::new(lon, lat)
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = CoordError;

    fn try_from((lon, lat): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lon, lat)
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(coord: Coordinate) -> Self {
        (coord.lon, coord.lat)
    }
}

/// Grid quantization resolution, expressed in cells per degree.
///
/// The default of 10 gives cells of 0.1° (roughly 11 km of latitude), coarse
/// enough to produce frequent hits for photos taken around the same place
/// while keeping border-straddling cells rare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct GridResolution(u32);

impl GridResolution {
    /// Default cells per degree.
    pub const DEFAULT_CELLS_PER_DEGREE: u32 = 10;

    /// Finest resolution whose cell indices stay within `i32` at ±180°.
    pub const MAX_CELLS_PER_DEGREE: u32 = 10_000_000;

    /// Create a resolution of 1 to [`Self::MAX_CELLS_PER_DEGREE`] cells per degree.
    pub fn new(cells_per_degree: u32) -> Result<Self, CoordError> {
        if cells_per_degree == 0 || cells_per_degree > Self::MAX_CELLS_PER_DEGREE {
            return Err(CoordError::InvalidResolution(cells_per_degree));
        }
        Ok(Self(cells_per_degree))
    }

    /// Number of cells per degree along each axis.
    pub fn cells_per_degree(&self) -> u32 {
        self.0
    }

    /// Edge length of a cell in degrees.
    pub fn cell_size_degrees(&self) -> f64 {
        1.0 / self.0 as f64
    }
}

impl Default for GridResolution {
    fn default() -> Self {
        Self(Self::DEFAULT_CELLS_PER_DEGREE)
    }
}

impl TryFrom<u32> for GridResolution {
    type Error = CoordError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GridResolution> for u32 {
    fn from(resolution: GridResolution) -> Self {
        resolution.0
    }
}

/// A quantized grid cell (derived from a coordinate, never observed directly).
///
/// Rows index latitude and columns index longitude, both as the floor of the
/// component multiplied by the resolution's cells per degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    /// Floor of latitude × cells per degree.
    pub row: i32,
    /// Floor of longitude × cells per degree.
    pub col: i32,
}

impl GridCell {
    /// Create a new grid cell.
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Stable string key (`"row:col"`) used by the persisted grid table.
    pub fn key(&self) -> String {
        format!("{}:{}", self.row, self.col)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell[{}:{}]", self.row, self.col)
    }
}

impl FromStr for GridCell {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once(':')
            .ok_or_else(|| CoordError::MalformedKey(s.to_string()))?;
        let row = row
            .trim()
            .parse()
            .map_err(|_| CoordError::MalformedKey(s.to_string()))?;
        let col = col
            .trim()
            .parse()
            .map_err(|_| CoordError::MalformedKey(s.to_string()))?;
        Ok(Self { row, col })
    }
}
