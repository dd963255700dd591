//! Square-spiral turbine layout inside a candidate area
//!
//! Positions start at the area center and walk outward on a lattice of the
//! required spacing: right 1, up 1, left 2, down 2, right 3, ... Lattice
//! nodes are distinct, so two turbines never come closer than one spacing.

use crate::error::TurbineError;
use crate::grid::{meters_to_degrees, BoundingBox, GeoPoint};
use crate::turbine::{WindFarm, Windmill};
use tracing::{debug, warn};

/// East/north lattice steps of the first `count` spiral positions
pub fn spiral_offsets(count: usize) -> Vec<(i64, i64)> {
    const DIRECTIONS: [(i64, i64); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

    let mut offsets = Vec::with_capacity(count);
    if count == 0 {
        return offsets;
    }
    offsets.push((0, 0));

    let (mut east, mut north) = (0i64, 0i64);
    let mut leg = 0usize;
    while offsets.len() < count {
        let (de, dn) = DIRECTIONS[leg % 4];
        let length = leg / 2 + 1;
        for _ in 0..length {
            east += de;
            north += dn;
            offsets.push((east, north));
            if offsets.len() == count {
                break;
            }
        }
        leg += 1;
    }
    offsets
}

/// Assign spiral coordinates to `windmills` inside `bounds`
///
/// The spacing is `spacing_factor` times the largest rotor diameter among the
/// turbines. Position `i` goes to the `i`-th turbine, whose coordinates are
/// updated. Returns the assigned coordinates in turbine order.
pub fn place(
    bounds: &BoundingBox,
    windmills: &mut [Windmill],
    spacing_factor: f64,
) -> Result<Vec<GeoPoint>, TurbineError> {
    if !spacing_factor.is_finite() || spacing_factor <= 0.0 {
        return Err(TurbineError::InvalidSpacing(spacing_factor));
    }
    let largest_diameter = windmills
        .iter()
        .map(Windmill::diameter)
        .fold(0.0, f64::max);
    let spacing_m = spacing_factor * largest_diameter;

    let center = bounds.center();
    let (lat_step, lon_step) = meters_to_degrees(spacing_m, center.lat);

    let positions: Vec<GeoPoint> = spiral_offsets(windmills.len())
        .into_iter()
        .map(|(east, north)| {
            GeoPoint::new(
                center.lat + north as f64 * lat_step,
                center.lon + east as f64 * lon_step,
            )
        })
        .collect();

    for (windmill, position) in windmills.iter_mut().zip(&positions) {
        windmill.set_coordinates(position.lat, position.lon);
    }

    let outside = positions.iter().filter(|p| !bounds.contains(p)).count();
    if outside > 0 {
        warn!(
            "{} of {} turbines fall outside the candidate area at {:.0} m spacing",
            outside,
            positions.len(),
            spacing_m
        );
    }
    debug!(
        "Placed {} turbines around ({:.4}, {:.4})",
        positions.len(),
        center.lat,
        center.lon
    );
    Ok(positions)
}

impl WindFarm {
    /// Lay the farm's turbines out in a spiral inside `bounds`
    pub fn place_in(
        &mut self,
        bounds: &BoundingBox,
        spacing_factor: f64,
    ) -> Result<Vec<GeoPoint>, TurbineError> {
        place(bounds, self.windmills_mut(), spacing_factor)
    }
}
