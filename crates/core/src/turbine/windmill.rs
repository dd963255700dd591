//! Single wind turbine power model
//!
//! Instantaneous power of a horizontal-axis rotor:
//!
//! ```text
//! P = ½·ρ·A·v³ × 16/27 × η
//! ```
//!
//! with ρ from a fixed standard atmosphere, A = π·r² the swept area, 16/27 the
//! Betz limit and η = 0.7 the transmission and generation efficiency.
//!
//! # References
//! - Betz, A. (1920). "Das Maximum der theoretisch möglichen Ausnützung des
//!   Windes durch Windmotoren" Zeitschrift für das gesamte Turbinenwesen, 26

use crate::error::TurbineError;
use crate::grid::GeoPoint;
use crate::weibull::{WeibullFactors, WeibullFit};
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Sea-level standard temperature (K)
pub const STANDARD_TEMPERATURE_K: f64 = 288.15;

/// Sea-level standard pressure (Pa)
pub const STANDARD_PRESSURE_PA: f64 = 101_300.0;

/// Specific gas constant of dry air (J/(kg·K))
pub const DRY_AIR_GAS_CONSTANT: f64 = 287.0;

/// Betz limit on the extractable fraction of kinetic energy
pub const BETZ_LIMIT: f64 = 16.0 / 27.0;

/// Transmission and generation efficiency
pub const DRIVETRAIN_EFFICIENCY: f64 = 0.7;

pub const DEFAULT_CUT_IN_SPEED: f64 = 3.0;
pub const DEFAULT_CUT_OUT_SPEED: f64 = 25.0;

/// Upper end of the speed integration range (m/s)
pub const INTEGRATION_MAX_SPEED: f64 = 30.0;

/// Speed step of the integration (m/s)
pub const INTEGRATION_STEP: f64 = 0.01;

const INTEGRATION_SAMPLES: usize = 3000;

/// Air density of the standard atmosphere (kg/m³)
#[inline]
pub fn air_density() -> f64 {
    STANDARD_PRESSURE_PA / (DRY_AIR_GAS_CONSTANT * STANDARD_TEMPERATURE_K)
}

/// A wind turbine and, once placed, its location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Windmill {
    /// Hub height (m)
    height: f64,
    /// Blade length, i.e. rotor radius (m)
    blade_length: f64,
    cut_in_speed: f64,
    cut_out_speed: f64,
    coordinates: Option<GeoPoint>,
}

impl Windmill {
    pub fn new(
        height: f64,
        blade_length: f64,
        cut_in_speed: f64,
        cut_out_speed: f64,
    ) -> Result<Self, TurbineError> {
        check_positive("height", height)?;
        check_positive("blade length", blade_length)?;
        check_positive("cut-out speed", cut_out_speed)?;
        if cut_in_speed.is_nan() || cut_in_speed < 0.0 {
            return Err(TurbineError::NonPositive {
                field: "cut-in speed",
                value: cut_in_speed,
            });
        }
        if cut_in_speed >= cut_out_speed {
            return Err(TurbineError::CutInAboveCutOut {
                cut_in: cut_in_speed,
                cut_out: cut_out_speed,
            });
        }
        Ok(Self {
            height,
            blade_length,
            cut_in_speed,
            cut_out_speed,
            coordinates: None,
        })
    }

    /// Turbine with the usual 3 m/s cut-in and 25 m/s cut-out speeds
    pub fn with_default_speeds(height: f64, blade_length: f64) -> Result<Self, TurbineError> {
        Self::new(height, blade_length, DEFAULT_CUT_IN_SPEED, DEFAULT_CUT_OUT_SPEED)
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn blade_length(&self) -> f64 {
        self.blade_length
    }

    /// Rotor diameter (m)
    pub fn diameter(&self) -> f64 {
        2.0 * self.blade_length
    }

    pub fn cut_in_speed(&self) -> f64 {
        self.cut_in_speed
    }

    pub fn cut_out_speed(&self) -> f64 {
        self.cut_out_speed
    }

    /// Swept rotor area (m²)
    pub fn swept_area(&self) -> f64 {
        PI * self.blade_length * self.blade_length
    }

    pub fn coordinates(&self) -> Option<GeoPoint> {
        self.coordinates
    }

    pub fn set_coordinates(&mut self, lat: f64, lon: f64) {
        self.coordinates = Some(GeoPoint::new(lat, lon));
    }

    /// Instantaneous power at wind speed `wind_speed` (W)
    ///
    /// Negative or non-finite speeds produce nothing.
    #[inline]
    pub fn produced_power(&self, wind_speed: f64) -> f64 {
        if !wind_speed.is_finite() || wind_speed <= 0.0 {
            return 0.0;
        }
        0.5 * air_density()
            * self.swept_area()
            * wind_speed.powi(3)
            * BETZ_LIMIT
            * DRIVETRAIN_EFFICIENCY
    }

    /// Expected power under one Weibull distribution (W)
    ///
    /// Integrates the instantaneous power against the probability of each
    /// 0.01 m/s speed step up to 30 m/s. Invalid fits yield zero.
    pub fn power_for_fit(&self, fit: WeibullFit) -> f64 {
        if !fit.is_valid() {
            return 0.0;
        }
        let mut previous_cdf = 0.0;
        let mut power = 0.0;
        for step in 1..=INTEGRATION_SAMPLES {
            let speed = step as f64 * INTEGRATION_STEP;
            let cdf = fit.cdf(speed);
            power += self.produced_power(speed) * (cdf - previous_cdf);
            previous_cdf = cdf;
        }
        power
    }

    /// Expected power of this turbine over every cell (W)
    pub fn theoretical_power(&self, weibull: &WeibullFactors) -> DMatrix<f64> {
        let (rows, cols) = weibull.dims();
        let cells: Vec<f64> = (0..rows * cols)
            .into_par_iter()
            .map(|cell| self.power_for_fit(weibull.get(cell / cols, cell % cols)))
            .collect();
        DMatrix::from_fn(rows, cols, |row, col| cells[row * cols + col])
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), TurbineError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TurbineError::NonPositive { field, value })
    }
}
