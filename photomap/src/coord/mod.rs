//! Coordinate types module
//!
//! Provides the exact-match [`Coordinate`] used to key markers and the
//! coordinate cache, and the coarse [`GridCell`] quantization used by the
//! grid cache.

mod types;

pub use types::{Coordinate, CoordError, GridCell, GridResolution, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

/// Quantizes a coordinate into its grid cell at the given resolution.
///
/// Cells are half-open: a cell covers `[row / cpd, (row + 1) / cpd)` degrees
/// of latitude and likewise for longitude, so points on a cell's southern or
/// western edge belong to that cell.
#[inline]
pub fn to_grid_cell(coord: &Coordinate, resolution: GridResolution) -> GridCell {
    let cpd = resolution.cells_per_degree() as f64;
    GridCell {
        row: (coord.lat() * cpd).floor() as i32,
        col: (coord.lon() * cpd).floor() as i32,
    }
}

/// Returns the (latitude, longitude) of a grid cell's center.
#[inline]
pub fn grid_cell_center(cell: &GridCell, resolution: GridResolution) -> (f64, f64) {
    let size = resolution.cell_size_degrees();
    (
        (cell.row as f64 + 0.5) * size,
        (cell.col as f64 + 0.5) * size,
    )
}
