//! Inverse-distance-weighted interpolation of station readings
//!
//! Weights follow the inverse square of the distance in degree space:
//!
//! ```text
//! w_k = 1 / ||p - k||²
//! U(p) = Σ w_k·v_k / Σ w_k
//! ```
//!
//! A reference located exactly at the query point takes the whole weight, so
//! the interpolated value is that reading (or the mean of all readings that
//! share the location).

use crate::grid::{GeoPoint, Grid};
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A wind reading contributed by one station at one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationReading {
    /// Wind speed (m/s)
    pub wind_speed: f64,
    pub location: GeoPoint,
}

impl StationReading {
    pub fn new(wind_speed: f64, lon: f64, lat: f64) -> Self {
        Self {
            wind_speed,
            location: GeoPoint::new(lat, lon),
        }
    }
}

/// Interpolate the readings at a single point
///
/// Returns `None` when `references` is empty.
pub fn interpolate(point: &GeoPoint, references: &[StationReading]) -> Option<f64> {
    if references.is_empty() {
        return None;
    }

    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut colocated_sum = 0.0;
    let mut colocated_count = 0usize;

    for reference in references {
        let sq_distance = point.squared_distance(&reference.location);
        if sq_distance == 0.0 {
            colocated_sum += reference.wind_speed;
            colocated_count += 1;
        } else if colocated_count == 0 {
            let weight = 1.0 / sq_distance;
            weighted_sum += weight * reference.wind_speed;
            weight_sum += weight;
        }
    }

    if colocated_count > 0 {
        Some(colocated_sum / colocated_count as f64)
    } else {
        Some(weighted_sum / weight_sum)
    }
}

/// Interpolate the readings over every grid point
///
/// Rows are computed in parallel. Returns `None` when `references` is empty.
pub fn interpolate_grid(grid: &Grid, references: &[StationReading]) -> Option<DMatrix<f64>> {
    if references.is_empty() {
        return None;
    }

    let (rows, cols) = grid.shape();
    let row_values: Vec<Vec<f64>> = (0..rows)
        .into_par_iter()
        .map(|row| {
            (0..cols)
                .map(|col| interpolate(&grid.point(row, col), references).unwrap_or(0.0))
                .collect()
        })
        .collect();

    Some(DMatrix::from_fn(rows, cols, |row, col| row_values[row][col]))
}
