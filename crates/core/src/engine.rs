//! End-to-end study pipeline
//!
//! Stations → hourly grids → wind history → Weibull factors → farm power →
//! candidate areas → turbine layout.

use crate::config::EngineConfig;
use crate::error::WindSiteError;
use crate::grid::{BoundingBox, GeoPoint, Grid};
use crate::history::{WindHistory, WindHistoryAggregator};
use crate::siting::{SiteSelection, SiteSelector};
use crate::stations::{StationDataProvider, StationInventory, StationState};
use crate::turbine::WindFarm;
use crate::weibull::{fit_history, WeibullFactors};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Everything a study produces
#[derive(Debug, Clone, Serialize)]
pub struct StudyOutcome {
    pub history: WindHistory,
    pub weibull: WeibullFactors,
    pub selection: SiteSelection,
    /// Turbine coordinates in the best area, empty when no area qualified
    pub layout: Vec<GeoPoint>,
    /// Expected power of the placed farm (W)
    pub placed_power: f64,
}

/// Wires the aggregation, fitting, selection and placement stages over one grid
#[derive(Debug)]
pub struct WindSiteEngine {
    grid: Arc<Grid>,
    config: EngineConfig,
    aggregator: WindHistoryAggregator,
    selector: SiteSelector,
}

impl WindSiteEngine {
    pub fn new(grid: Grid, config: EngineConfig) -> Result<Self, WindSiteError> {
        let grid = Arc::new(grid);
        let aggregator = WindHistoryAggregator::new(Arc::clone(&grid), config.aggregation.clone())?;
        let selector = SiteSelector::new(config.selection.clone());
        Ok(Self {
            grid,
            config,
            aggregator,
            selector,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Station states for the stations around the grid
    ///
    /// The search starts one degree around the grid bounds and widens until
    /// `required` stations are found or `max_radius` degrees is reached.
    pub fn nearby_stations(
        &self,
        inventory: &StationInventory,
        required: usize,
        max_radius: f64,
    ) -> Vec<StationState> {
        inventory
            .find_near_stations(&self.grid.bounds(), 1.0, required, max_radius)
            .into_iter()
            .map(StationState::new)
            .collect()
    }

    /// Wind history of `years` at `altitude` (station height when `None`)
    pub fn aggregate<P: StationDataProvider + ?Sized>(
        &self,
        stations: &mut [StationState],
        provider: &P,
        years: &[i32],
        altitude: Option<f64>,
    ) -> Result<WindHistory, WindSiteError> {
        let started = Instant::now();
        let history = self
            .aggregator
            .compute_period(stations, provider, years, altitude)?;
        info!(
            "Aggregated {} years from {} stations in {:.2?}",
            years.len(),
            stations.len(),
            started.elapsed()
        );
        Ok(history)
    }

    /// Weibull factors of every cell with the configured method
    pub fn fit(&self, history: &WindHistory) -> WeibullFactors {
        fit_history(history, self.config.fit_method)
    }

    /// Farm power over the grid and the best candidate areas
    pub fn select(
        &self,
        weibull: &WeibullFactors,
        farm: &WindFarm,
    ) -> Result<SiteSelection, WindSiteError> {
        Ok(self.selector.select(weibull, &self.grid, farm)?)
    }

    /// Lay the farm out in `area`
    pub fn place(
        &self,
        farm: &mut WindFarm,
        area: &BoundingBox,
    ) -> Result<Vec<GeoPoint>, WindSiteError> {
        Ok(farm.place_in(area, self.config.selection.spacing_factor)?)
    }

    /// Run every stage, placing the farm in the best area found
    pub fn run<P: StationDataProvider + ?Sized>(
        &self,
        stations: &mut [StationState],
        provider: &P,
        years: &[i32],
        farm: &mut WindFarm,
        altitude: Option<f64>,
    ) -> Result<StudyOutcome, WindSiteError> {
        let history = self.aggregate(stations, provider, years, altitude)?;
        let weibull = self.fit(&history);
        let selection = self.select(&weibull, farm)?;

        let (layout, placed_power) = match selection.best() {
            Some(best) => {
                let layout = self.place(farm, &best.bounds)?;
                let power = farm.placed_power(&weibull, &self.grid);
                info!(
                    "Placed {} turbines, expected output {:.0} W",
                    layout.len(),
                    power
                );
                (layout, power)
            }
            None => (Vec::new(), 0.0),
        };

        Ok(StudyOutcome {
            history,
            weibull,
            selection,
            layout,
            placed_power,
        })
    }
}
