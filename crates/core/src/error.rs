//! Error types for the wind-site engine
//!
//! Numerical degeneracies (empty histograms, cells without data, no qualifying
//! area) are not errors: they resolve to defined sentinel values. The types
//! here cover invalid inputs and failures of the external collaborators.

use thiserror::Error;

/// Invalid grid construction parameters
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("{axis} axis is empty")]
    EmptyAxis { axis: &'static str },

    #[error("{axis} axis is not strictly increasing at index {index}")]
    NotIncreasing { axis: &'static str, index: usize },

    #[error("{axis} axis contains a non-finite value at index {index}")]
    NonFinite { axis: &'static str, index: usize },

    #[error("invalid range for {axis}: min={min}, max={max}, points={points}")]
    InvalidRange {
        axis: &'static str,
        min: f64,
        max: f64,
        points: usize,
    },
}

/// Failures reported by a station data provider
#[derive(Debug, Error)]
pub enum StationDataError {
    #[error("no wind series for station '{station}' in {year}-{month:02}")]
    MissingSeries {
        station: String,
        year: i32,
        month: u8,
    },

    #[error("month {0} is outside 1..=12")]
    InvalidMonth(u8),

    #[error("failed to load series for station '{station}'")]
    Load {
        station: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Failures of the historical aggregation stage
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error(transparent)]
    StationData(#[from] StationDataError),

    #[error("worker for {year}-{month:02} produced no result within {timeout_secs}s")]
    WorkerTimeout {
        year: i32,
        month: u8,
        timeout_secs: u64,
    },

    #[error("worker for {year}-{month:02} terminated without a result")]
    WorkerFailed { year: i32, month: u8 },

    #[error("failed to build worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("target altitude {altitude} m must exceed the roughness length {roughness} m")]
    InvalidAltitude { altitude: f64, roughness: f64 },

    #[error("no years requested")]
    EmptyPeriod,
}

/// Invalid turbine definition
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TurbineError {
    #[error("turbine {field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("cut-in speed {cut_in} m/s must be below cut-out speed {cut_out} m/s")]
    CutInAboveCutOut { cut_in: f64, cut_out: f64 },

    #[error("spacing factor must be positive, got {0}")]
    InvalidSpacing(f64),
}

/// Failures reported by an elevation source
#[derive(Debug, Error)]
pub enum ElevationError {
    #[error("elevation lookup failed at ({lat}, {lon})")]
    Lookup {
        lat: f64,
        lon: f64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("elevation sampling needs at least one point per axis")]
    EmptySampling,
}

/// Umbrella error for the end-to-end engine
#[derive(Debug, Error)]
pub enum WindSiteError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    StationData(#[from] StationDataError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Turbine(#[from] TurbineError),

    #[error(transparent)]
    Elevation(#[from] ElevationError),
}
