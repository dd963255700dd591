//! Engine configuration
//!
//! All tunables are plain serde structs with defaults so they can be embedded
//! in a study description file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Height at which stations measure wind (m)
pub const MEASUREMENT_HEIGHT_M: f64 = 10.0;

/// Roughness length of flat open terrain: grass, a few isolated obstacles (m)
pub const ROUGHNESS_LENGTH_M: f64 = 0.03;

/// Configuration of the historical aggregation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// A timestamp is interpolated only when strictly more readings than this are present
    pub min_references: usize,

    /// Height of the station anemometers (m)
    pub measurement_height_m: f64,

    /// Terrain roughness length for the logarithmic wind profile (m)
    pub roughness_length_m: f64,

    /// Maximum time to wait for all month workers of one request (s)
    pub worker_timeout_secs: u64,

    /// Worker pool size, 0 lets rayon decide
    pub worker_threads: usize,

    /// Process all years of a period at once; otherwise year by year
    pub parallel_years: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            min_references: 4,
            measurement_height_m: MEASUREMENT_HEIGHT_M,
            roughness_length_m: ROUGHNESS_LENGTH_M,
            worker_timeout_secs: 600,
            worker_threads: 0,
            parallel_years: true,
        }
    }
}

impl AggregationConfig {
    pub fn worker_timeout(&self) -> Duration {
        Duration::from_secs(self.worker_timeout_secs)
    }
}

/// Aggregate used to rank candidate areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ranking {
    /// Mean power over the covered cells
    #[default]
    Mean,
    /// Best single covered cell
    Max,
}

/// Weibull estimation method applied to every cell histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMethod {
    /// Maximum likelihood over the binned sample
    #[default]
    Mle,
    /// Method of moments
    Moments,
}

/// Configuration of site selection and turbine placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Maximum number of candidate areas returned
    pub max_results: usize,

    pub ranking: Ranking,

    /// Turbine spacing as a multiple of the largest rotor diameter
    pub spacing_factor: f64,

    /// Limit every cell to the turbines that fit in it at the required spacing
    pub cap_cell_capacity: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            ranking: Ranking::Mean,
            spacing_factor: 5.0,
            cap_cell_capacity: false,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub aggregation: AggregationConfig,
    pub fit_method: FitMethod,
    pub selection: SelectionConfig,
}
