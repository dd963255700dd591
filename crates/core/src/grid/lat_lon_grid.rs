//! Regular latitude/longitude study grid
//!
//! The grid is the cartesian product of two strictly increasing coordinate
//! axes. Matrices over the grid are `rows × cols = len(lat) × len(lon)`:
//! row `i` samples latitude `lat[i]`, column `j` samples longitude `lon[j]`.

use super::geo::{BoundingBox, GeoPoint};
use crate::error::GridError;
use nalgebra::DMatrix;
use serde::Serialize;

/// Immutable latitude/longitude sampling grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    longitudes: Vec<f64>,
    latitudes: Vec<f64>,
}

impl Grid {
    /// Build a grid from explicit axes
    ///
    /// Both axes must be non-empty, finite and strictly increasing.
    pub fn new(longitudes: Vec<f64>, latitudes: Vec<f64>) -> Result<Self, GridError> {
        validate_axis("longitude", &longitudes)?;
        validate_axis("latitude", &latitudes)?;
        Ok(Self {
            longitudes,
            latitudes,
        })
    }

    /// Build a grid of evenly spaced axes, endpoints included
    pub fn linspace(
        lon_min: f64,
        lon_max: f64,
        n_lon: usize,
        lat_min: f64,
        lat_max: f64,
        n_lat: usize,
    ) -> Result<Self, GridError> {
        let longitudes = linspace("longitude", lon_min, lon_max, n_lon)?;
        let latitudes = linspace("latitude", lat_min, lat_max, n_lat)?;
        Self::new(longitudes, latitudes)
    }

    /// `(rows, cols)` = `(len(lat), len(lon))`
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.latitudes.len(), self.longitudes.len())
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.latitudes.len()
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.longitudes.len()
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.rows() * self.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn longitude_axis(&self) -> &[f64] {
        &self.longitudes
    }

    pub fn latitude_axis(&self) -> &[f64] {
        &self.latitudes
    }

    /// Sample coordinate of a cell
    #[inline]
    pub fn point(&self, row: usize, col: usize) -> GeoPoint {
        GeoPoint::new(self.latitudes[row], self.longitudes[col])
    }

    /// Meshgrid of longitudes (every row repeats the longitude axis)
    pub fn longitudes(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.rows(), self.cols(), |_, col| self.longitudes[col])
    }

    /// Meshgrid of latitudes (every column repeats the latitude axis)
    pub fn latitudes(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.rows(), self.cols(), |row, _| self.latitudes[row])
    }

    /// Mean latitude spacing in degrees (0 for a single-row grid)
    pub fn lat_step(&self) -> f64 {
        mean_step(&self.latitudes)
    }

    /// Mean longitude spacing in degrees (0 for a single-column grid)
    pub fn lon_step(&self) -> f64 {
        mean_step(&self.longitudes)
    }

    /// Box spanned by the sample points
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.latitudes[0],
            self.latitudes[self.rows() - 1],
            self.longitudes[0],
            self.longitudes[self.cols() - 1],
        )
    }

    /// Sample latitude furthest from the equator
    ///
    /// A degree of longitude is shortest there, so an extent converted at this
    /// latitude covers at least as many meters anywhere else on the grid.
    pub fn poleward_latitude(&self) -> f64 {
        let first = self.latitudes[0];
        let last = self.latitudes[self.rows() - 1];
        if last.abs() > first.abs() {
            last
        } else {
            first
        }
    }

    /// Cell whose sample point is closest to `point` along each axis
    pub fn nearest_cell(&self, point: &GeoPoint) -> (usize, usize) {
        (
            nearest_index(&self.latitudes, point.lat),
            nearest_index(&self.longitudes, point.lon),
        )
    }

    /// Geographic extent of a block of cells
    ///
    /// Rows `row_start..row_end` and columns `col_start..col_end` (end
    /// exclusive). Each cell stands for the whole spacing interval around its
    /// sample point, so half a step is added on every side.
    pub fn block_bounds(
        &self,
        row_start: usize,
        row_end: usize,
        col_start: usize,
        col_end: usize,
    ) -> BoundingBox {
        let half_lat = self.lat_step() / 2.0;
        let half_lon = self.lon_step() / 2.0;
        BoundingBox::new(
            self.latitudes[row_start] - half_lat,
            self.latitudes[row_end - 1] + half_lat,
            self.longitudes[col_start] - half_lon,
            self.longitudes[col_end - 1] + half_lon,
        )
    }
}

fn validate_axis(axis: &'static str, values: &[f64]) -> Result<(), GridError> {
    if values.is_empty() {
        return Err(GridError::EmptyAxis { axis });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(GridError::NonFinite { axis, index });
    }
    if let Some(index) = values.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(GridError::NotIncreasing {
            axis,
            index: index + 1,
        });
    }
    Ok(())
}

fn linspace(axis: &'static str, min: f64, max: f64, points: usize) -> Result<Vec<f64>, GridError> {
    let invalid = GridError::InvalidRange {
        axis,
        min,
        max,
        points,
    };
    if points == 0 || !min.is_finite() || !max.is_finite() {
        return Err(invalid);
    }
    if points == 1 {
        return Ok(vec![min]);
    }
    if max <= min {
        return Err(invalid);
    }
    let step = (max - min) / (points - 1) as f64;
    Ok((0..points)
        .map(|i| if i == points - 1 { max } else { min + step * i as f64 })
        .collect())
}

fn mean_step(axis: &[f64]) -> f64 {
    if axis.len() < 2 {
        0.0
    } else {
        (axis[axis.len() - 1] - axis[0]) / (axis.len() - 1) as f64
    }
}

fn nearest_index(axis: &[f64], value: f64) -> usize {
    let upper = axis.partition_point(|&v| v < value);
    if upper == 0 {
        0
    } else if upper == axis.len() {
        axis.len() - 1
    } else if (value - axis[upper - 1]) <= (axis[upper] - value) {
        upper - 1
    } else {
        upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_shape_and_endpoints() {
        let grid = Grid::linspace(-123.5, -122.5, 5, 48.0, 49.0, 3).unwrap();
        assert_eq!(grid.shape(), (3, 5));
        assert_eq!(grid.longitude_axis()[0], -123.5);
        assert_eq!(grid.longitude_axis()[4], -122.5);
        assert!((grid.lon_step() - 0.25).abs() < 1e-12);
        assert!((grid.lat_step() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_increasing_axis() {
        let err = Grid::new(vec![0.0, 1.0, 1.0], vec![0.0]).unwrap_err();
        assert_eq!(
            err,
            GridError::NotIncreasing {
                axis: "longitude",
                index: 2
            }
        );
        assert!(matches!(
            Grid::new(vec![], vec![0.0]),
            Err(GridError::EmptyAxis { axis: "longitude" })
        ));
        assert!(Grid::linspace(1.0, 0.0, 3, 0.0, 1.0, 3).is_err());
    }

    #[test]
    fn test_meshgrid_orientation() {
        let grid = Grid::new(vec![10.0, 11.0, 12.0], vec![40.0, 41.0]).unwrap();
        let lons = grid.longitudes();
        let lats = grid.latitudes();
        assert_eq!(lons.shape(), (2, 3));
        assert_eq!(lons[(1, 2)], 12.0);
        assert_eq!(lats[(1, 2)], 41.0);
        assert_eq!(grid.point(1, 0), GeoPoint::new(41.0, 10.0));
    }

    #[test]
    fn test_nearest_cell() {
        let grid = Grid::linspace(0.0, 4.0, 5, 0.0, 2.0, 3).unwrap();
        assert_eq!(grid.nearest_cell(&GeoPoint::new(1.4, 2.6)), (1, 3));
        assert_eq!(grid.nearest_cell(&GeoPoint::new(-5.0, 99.0)), (0, 4));
    }

    #[test]
    fn test_block_bounds_include_half_cell_margin() {
        let grid = Grid::linspace(0.0, 3.0, 4, 10.0, 13.0, 4).unwrap();
        let bbox = grid.block_bounds(1, 3, 0, 2);
        assert!((bbox.lat_min - 10.5).abs() < 1e-12);
        assert!((bbox.lat_max - 12.5).abs() < 1e-12);
        assert!((bbox.lon_min + 0.5).abs() < 1e-12);
        assert!((bbox.lon_max - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_poleward_latitude() {
        let north = Grid::linspace(0.0, 1.0, 2, 10.0, 13.0, 4).unwrap();
        assert_eq!(north.poleward_latitude(), 13.0);

        let south = Grid::linspace(0.0, 1.0, 2, -60.0, -10.0, 6).unwrap();
        assert_eq!(south.poleward_latitude(), -60.0);

        let straddling = Grid::linspace(0.0, 1.0, 2, -20.0, 50.0, 8).unwrap();
        assert_eq!(straddling.poleward_latitude(), 50.0);
    }
}
