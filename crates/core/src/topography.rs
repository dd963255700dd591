//! Terrain flatness of candidate areas
//!
//! Elevation retrieval is an external collaborator behind [`ElevationSource`].
//! The flatness score maps the standard deviation of the sampled elevation to
//! 0-100, with 1000 m (a high mountain range) as the reference deviation:
//!
//! ```text
//! score = (1 − σ / 1000) × 100
//! ```

use crate::error::ElevationError;
use crate::grid::{BoundingBox, GeoPoint};
use nalgebra::DMatrix;
use serde::Serialize;
use tracing::debug;

/// Reference elevation standard deviation for a score of zero (m)
pub const REFERENCE_STD_DEV_M: f64 = 1000.0;

/// Source of ground elevation above sea level
pub trait ElevationSource: Send + Sync {
    /// Elevation at a coordinate (m)
    fn elevation(&self, location: &GeoPoint) -> Result<f64, ElevationError>;
}

impl<F> ElevationSource for F
where
    F: Fn(&GeoPoint) -> f64 + Send + Sync,
{
    fn elevation(&self, location: &GeoPoint) -> Result<f64, ElevationError> {
        Ok(self(location))
    }
}

/// Sample elevation on an evenly spaced `n_lat × n_lon` lattice over `bounds`
///
/// Rows follow latitude and columns longitude. A single point on an axis
/// samples the lower bound.
pub fn sample_elevation<S: ElevationSource + ?Sized>(
    bounds: &BoundingBox,
    n_lat: usize,
    n_lon: usize,
    source: &S,
) -> Result<DMatrix<f64>, ElevationError> {
    if n_lat == 0 || n_lon == 0 {
        return Err(ElevationError::EmptySampling);
    }
    let step = |span: f64, points: usize| {
        if points > 1 {
            span / (points - 1) as f64
        } else {
            0.0
        }
    };
    let lat_step = step(bounds.lat_span(), n_lat);
    let lon_step = step(bounds.lon_span(), n_lon);

    let mut elevation = DMatrix::zeros(n_lat, n_lon);
    for row in 0..n_lat {
        for col in 0..n_lon {
            let location = GeoPoint::new(
                bounds.lat_min + row as f64 * lat_step,
                bounds.lon_min + col as f64 * lon_step,
            );
            elevation[(row, col)] = source.elevation(&location)?;
        }
    }
    Ok(elevation)
}

/// Population standard deviation of a matrix
fn std_dev(values: &DMatrix<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.mean();
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Flatness score of an elevation matrix, higher is flatter
///
/// Perfectly flat terrain scores 100; the score turns negative beyond the
/// reference deviation.
pub fn flatness_score(elevation: &DMatrix<f64>) -> f64 {
    let sigma = std_dev(elevation);
    if sigma == 0.0 {
        100.0
    } else {
        (1.0 - sigma / REFERENCE_STD_DEV_M) * 100.0
    }
}

/// Flatness of one candidate area
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AreaFlatness {
    /// Index of the area in the input list
    pub index: usize,
    pub score: f64,
}

/// Flattest of `areas`, `None` when the list is empty
pub fn flattest_area<S: ElevationSource + ?Sized>(
    areas: &[BoundingBox],
    source: &S,
    n_lat: usize,
    n_lon: usize,
) -> Result<Option<AreaFlatness>, ElevationError> {
    let mut best: Option<AreaFlatness> = None;
    for (index, area) in areas.iter().enumerate() {
        let score = flatness_score(&sample_elevation(area, n_lat, n_lon, source)?);
        debug!("Area {} flatness {:.1}", index, score);
        let better = match best {
            Some(current) => score > current.score,
            None => true,
        };
        if better {
            best = Some(AreaFlatness { index, score });
        }
    }
    Ok(best)
}
