//! Study description loaded from YAML

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::path::Path;
use wind_site_core::{AggregationConfig, EngineConfig, Grid, SelectionConfig, WindFarm, Windmill};

/// One site study: area, years, turbines and the synthetic archive to use
#[derive(Debug, Clone, Deserialize)]
pub struct Study {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
    /// Grid points along longitude
    pub precision_lon: usize,
    /// Grid points along latitude
    pub precision_lat: usize,

    /// Hub altitude of the study (m), station height when absent
    #[serde(default)]
    pub study_alt: Option<f64>,
    pub study_years: Vec<i32>,
    #[serde(default = "default_true")]
    pub activate_multi_process: bool,

    /// Power a candidate area must exceed (W)
    pub target_power: f64,
    pub num_windmills: usize,
    pub turb_height: f64,
    pub blade_length: f64,
    #[serde(default = "default_cut_in")]
    pub cut_in_speed: f64,
    #[serde(default = "default_cut_out")]
    pub cut_out_speed: f64,
    /// Spacing as a multiple of the rotor diameter
    #[serde(default = "default_spacing")]
    pub turbine_spacing: f64,
    #[serde(default = "default_areas")]
    pub num_areas_interest: usize,

    #[serde(default = "default_elevation_points")]
    pub precision_lon_elevation: usize,
    #[serde(default = "default_elevation_points")]
    pub precision_lat_elevation: usize,

    #[serde(default)]
    pub synthetic: SyntheticArchive,
}

/// Weibull-distributed stations scattered around the study area
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyntheticArchive {
    pub stations: usize,
    /// Margin around the study area where stations may sit (°)
    pub margin_deg: f64,
    pub shape: f64,
    /// Weibull scale at the western edge (m/s)
    pub scale_west: f64,
    /// Weibull scale at the eastern edge (m/s)
    pub scale_east: f64,
    /// Months generated per year
    pub months: Vec<u8>,
    /// Hourly probability of a missing reading
    pub gap_probability: f64,
    /// Amplitude of the synthetic terrain (m)
    pub relief_m: f64,
}

impl Default for SyntheticArchive {
    fn default() -> Self {
        Self {
            stations: 24,
            margin_deg: 0.25,
            shape: 2.0,
            scale_west: 5.0,
            scale_east: 9.0,
            months: (1..=12).collect(),
            gap_probability: 0.02,
            relief_m: 150.0,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cut_in() -> f64 {
    3.0
}

fn default_cut_out() -> f64 {
    25.0
}

fn default_spacing() -> f64 {
    5.0
}

fn default_areas() -> usize {
    5
}

fn default_elevation_points() -> usize {
    10
}

impl Study {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading study file {}", path.display()))?;
        let study: Study = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing study file {}", path.display()))?;
        ensure!(!study.study_years.is_empty(), "study_years is empty");
        ensure!(study.num_windmills > 0, "num_windmills must be at least 1");
        Ok(study)
    }

    pub fn grid(&self) -> Result<Grid> {
        Grid::linspace(
            self.lon_min,
            self.lon_max,
            self.precision_lon,
            self.lat_min,
            self.lat_max,
            self.precision_lat,
        )
        .context("building the study grid")
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            aggregation: AggregationConfig {
                parallel_years: self.activate_multi_process,
                ..AggregationConfig::default()
            },
            selection: SelectionConfig {
                max_results: self.num_areas_interest,
                spacing_factor: self.turbine_spacing,
                ..SelectionConfig::default()
            },
            ..EngineConfig::default()
        }
    }

    pub fn wind_farm(&self) -> Result<WindFarm> {
        let windmill = Windmill::new(
            self.turb_height,
            self.blade_length,
            self.cut_in_speed,
            self.cut_out_speed,
        )
        .context("invalid turbine parameters")?;
        Ok(WindFarm::uniform(self.target_power, &windmill, self.num_windmills))
    }
}
