//! Wind Resource Aggregation & Site-Selection Engine
//!
//! Estimates wind-energy potential over a latitude/longitude grid from
//! historical station measurements and selects areas for a wind farm:
//!
//! - Inverse-distance interpolation of hourly station readings onto the grid
//! - Parallel aggregation of per-cell speed histograms and mean speed
//! - Weibull fitting per cell (maximum likelihood or moments)
//! - Expected turbine and farm power from the fitted distributions
//! - Clustering of cells above a target power and rectangle search
//! - Square-spiral turbine layout in the chosen area

pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod history;
pub mod interpolation;
pub mod siting;
pub mod stations;
pub mod topography;
pub mod turbine;
pub mod weibull;

pub use config::{AggregationConfig, EngineConfig, FitMethod, Ranking, SelectionConfig};
pub use engine::{StudyOutcome, WindSiteEngine};
pub use error::{
    AggregationError, ElevationError, GridError, StationDataError, TurbineError, WindSiteError,
};
pub use grid::{BoundingBox, GeoPoint, Grid};
pub use history::{WindHistory, WindHistoryAggregator};
pub use interpolation::{interpolate, interpolate_grid, StationReading};
pub use siting::{find_candidate_areas, CandidateArea, SiteSelection, SiteSelector};
pub use stations::{
    InMemoryArchive, MonthSeries, Station, StationDataProvider, StationInventory, StationState,
};
pub use topography::{flatness_score, flattest_area, ElevationSource};
pub use turbine::{WindFarm, Windmill};
pub use weibull::{fit_history, fit_mle, fit_moments, WeibullFactors, WeibullFit};
