//! A set of turbines evaluated together over the grid

use super::windmill::Windmill;
use crate::error::TurbineError;
use crate::grid::{meters_to_degrees, Grid, METERS_PER_DEGREE};
use crate::weibull::WeibullFactors;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Turbines of a planned farm and the power the farm must deliver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindFarm {
    /// Power a candidate cell must exceed (W)
    target_power: f64,
    windmills: Vec<Windmill>,
}

impl WindFarm {
    pub fn new(target_power: f64) -> Self {
        Self {
            target_power,
            windmills: Vec::new(),
        }
    }

    /// Farm of `count` identical turbines
    pub fn uniform(target_power: f64, windmill: &Windmill, count: usize) -> Self {
        Self {
            target_power,
            windmills: vec![windmill.clone(); count],
        }
    }

    pub fn target_power(&self) -> f64 {
        self.target_power
    }

    pub fn add_windmill(&mut self, windmill: Windmill) {
        self.windmills.push(windmill);
    }

    pub fn windmills(&self) -> &[Windmill] {
        &self.windmills
    }

    pub fn windmills_mut(&mut self) -> &mut [Windmill] {
        &mut self.windmills
    }

    pub fn len(&self) -> usize {
        self.windmills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windmills.is_empty()
    }

    /// Largest rotor diameter in the farm (m), 0 for an empty farm
    pub fn largest_diameter(&self) -> f64 {
        self.windmills
            .iter()
            .map(Windmill::diameter)
            .fold(0.0, f64::max)
    }

    /// Minimum distance between two turbines (m)
    pub fn spacing_m(&self, spacing_factor: f64) -> Result<f64, TurbineError> {
        if !spacing_factor.is_finite() || spacing_factor <= 0.0 {
            return Err(TurbineError::InvalidSpacing(spacing_factor));
        }
        Ok(spacing_factor * self.largest_diameter())
    }

    /// Maximum turbines per cell on a lattice of the required spacing
    ///
    /// A cell covers one grid step in each direction around its sample point;
    /// its width in meters uses the cell's own latitude. An axis with a single
    /// sample has no extent and does not constrain the count; a grid with a
    /// single cell is unconstrained.
    pub fn cell_capacity(
        &self,
        grid: &Grid,
        spacing_factor: f64,
    ) -> Result<DMatrix<usize>, TurbineError> {
        let spacing = self.spacing_m(spacing_factor)?;
        let (rows, cols) = grid.shape();
        if spacing <= 0.0 {
            return Ok(DMatrix::from_element(rows, cols, usize::MAX));
        }

        let cell_height_m = grid.lat_step() * METERS_PER_DEGREE;
        let latitudes = grid.latitude_axis();
        let lon_step = grid.lon_step();

        let capacity = DMatrix::from_fn(rows, cols, |row, _| {
            let (_, lon_deg_per_m) = meters_to_degrees(1.0, latitudes[row]);
            let cell_width_m = lon_step / lon_deg_per_m;
            let along = |extent_m: f64| -> Option<usize> {
                (extent_m > 0.0).then(|| (extent_m / spacing).floor() as usize)
            };
            match (along(cell_height_m), along(cell_width_m)) {
                (Some(north), Some(east)) => north * east,
                (Some(count), None) | (None, Some(count)) => count,
                (None, None) => usize::MAX,
            }
        });
        Ok(capacity)
    }

    /// Expected farm power per cell (W)
    ///
    /// Without a capacity every turbine contributes to every cell. With one,
    /// turbines are allocated greedily by descending blade length and a cell
    /// stops accumulating once its capacity is used up.
    pub fn theoretical_power(
        &self,
        weibull: &WeibullFactors,
        capacity: Option<&DMatrix<usize>>,
    ) -> DMatrix<f64> {
        let (rows, cols) = weibull.dims();
        let mut total = DMatrix::zeros(rows, cols);
        let mut remaining = capacity.cloned();

        // Identical rotors share one power matrix
        for (windmill, count) in self.rotor_groups() {
            let power = windmill.theoretical_power(weibull);
            match remaining.as_mut() {
                None => total += &power * count as f64,
                Some(remaining) => {
                    for row in 0..rows {
                        for col in 0..cols {
                            let placed = count.min(remaining[(row, col)]);
                            remaining[(row, col)] -= placed;
                            total[(row, col)] += power[(row, col)] * placed as f64;
                        }
                    }
                }
            }
            debug!(
                "Rotor {} m x{}: peak cell power {:.0} W",
                windmill.blade_length(),
                count,
                power.max()
            );
        }
        total
    }

    /// Instantaneous power of the placed turbines in one wind field (W)
    ///
    /// Each turbine reads the field at its nearest cell; unplaced turbines
    /// produce nothing.
    pub fn total_produced_power(&self, wind_field: &DMatrix<f64>, grid: &Grid) -> f64 {
        self.windmills
            .iter()
            .filter_map(|windmill| {
                windmill.coordinates().map(|location| {
                    let cell = grid.nearest_cell(&location);
                    windmill.produced_power(wind_field[cell])
                })
            })
            .sum()
    }

    /// Expected power of the placed turbines (W)
    pub fn placed_power(&self, weibull: &WeibullFactors, grid: &Grid) -> f64 {
        self.windmills
            .iter()
            .filter_map(|windmill| {
                windmill.coordinates().map(|location| {
                    let (row, col) = grid.nearest_cell(&location);
                    windmill.power_for_fit(weibull.get(row, col))
                })
            })
            .sum()
    }

    /// Distinct rotors by descending blade length with their counts
    fn rotor_groups(&self) -> Vec<(&Windmill, usize)> {
        let mut sorted: Vec<&Windmill> = self.windmills.iter().collect();
        sorted.sort_by(|a, b| b.blade_length().total_cmp(&a.blade_length()));

        let mut groups: Vec<(&Windmill, usize)> = Vec::new();
        for windmill in sorted {
            match groups.last_mut() {
                Some((first, count)) if first.blade_length() == windmill.blade_length() => {
                    *count += 1;
                }
                _ => groups.push((windmill, 1)),
            }
        }
        groups
    }
}
