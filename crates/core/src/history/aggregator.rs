//! Historical wind aggregation over months, years and multi-year periods
//!
//! For every hour of a month the readings of all stations are interpolated
//! over the grid (when enough stations report), optionally lifted to the hub
//! altitude with the logarithmic wind profile
//!
//! ```text
//! v(z) = v(10 m) × ln(z / z0) / ln(10 / z0)
//! ```
//!
//! and accumulated into the per-cell histogram and running mean. Months are
//! independent: the parent prepares an immutable [`MonthBatch`] per month,
//! sequentially, then fans the batches out to the worker pool and gathers the
//! partial histories in submission order under a deadline.

use super::pool::{TaskHandle, WaitError, WorkerPool};
use super::wind_history::{WindAccumulator, WindHistory};
use crate::config::AggregationConfig;
use crate::error::AggregationError;
use crate::grid::Grid;
use crate::interpolation::interpolate_grid;
use crate::stations::{MonthBatch, StationDataProvider, StationState};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Accumulate one month of station data over the grid
///
/// Timestamps with `min_references` readings or fewer are skipped. The
/// returned history is empty when no timestamp qualified.
pub fn accumulate_month(
    grid: &Grid,
    batch: &MonthBatch,
    profile_factor: f64,
    min_references: usize,
) -> WindHistory {
    let mut accumulator = WindAccumulator::for_grid(grid);

    for hour in 0..batch.hours() {
        let readings = batch.readings_at(hour);
        if readings.len() <= min_references {
            continue;
        }
        let Some(mut field) = interpolate_grid(grid, &readings) else {
            continue;
        };
        if profile_factor != 1.0 {
            field *= profile_factor;
        }
        accumulator.record(&field);
    }

    debug!(
        "Month {}-{:02}: {} of {} timestamps interpolated from {} stations",
        batch.year(),
        batch.month(),
        accumulator.timestamps(),
        batch.hours(),
        batch.station_count()
    );

    accumulator.finish()
}

/// Vertical wind-profile factor from the measurement height to `altitude`
pub fn profile_factor(
    altitude: Option<f64>,
    config: &AggregationConfig,
) -> Result<f64, AggregationError> {
    let Some(altitude) = altitude else {
        return Ok(1.0);
    };
    let z0 = config.roughness_length_m;
    if !altitude.is_finite() || altitude <= z0 || config.measurement_height_m <= z0 {
        return Err(AggregationError::InvalidAltitude {
            altitude,
            roughness: z0,
        });
    }
    Ok((altitude / z0).ln() / (config.measurement_height_m / z0).ln())
}

/// Aggregates station history over a grid with a dedicated worker pool
#[derive(Debug)]
pub struct WindHistoryAggregator {
    grid: Arc<Grid>,
    config: AggregationConfig,
    pool: WorkerPool,
}

struct MonthTask {
    year: i32,
    month: u8,
    handle: TaskHandle<WindHistory>,
}

impl WindHistoryAggregator {
    pub fn new(grid: Arc<Grid>, config: AggregationConfig) -> Result<Self, AggregationError> {
        let pool = WorkerPool::new(config.worker_threads)?;
        info!(
            "Wind history aggregator ready: {}x{} grid, {} workers",
            grid.rows(),
            grid.cols(),
            pool.threads()
        );
        Ok(Self { grid, config, pool })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Aggregate a single month on the calling thread
    pub fn compute_month<P: StationDataProvider + ?Sized>(
        &self,
        stations: &mut [StationState],
        provider: &P,
        year: i32,
        month: u8,
        altitude: Option<f64>,
    ) -> Result<WindHistory, AggregationError> {
        let factor = profile_factor(altitude, &self.config)?;
        let batch = MonthBatch::prepare(stations, provider, year, month)?;
        Ok(accumulate_month(
            &self.grid,
            &batch,
            factor,
            self.config.min_references,
        ))
    }

    /// Aggregate the twelve months of `year` concurrently
    pub fn compute_year<P: StationDataProvider + ?Sized>(
        &self,
        stations: &mut [StationState],
        provider: &P,
        year: i32,
        altitude: Option<f64>,
    ) -> Result<WindHistory, AggregationError> {
        let factor = profile_factor(altitude, &self.config)?;
        let tasks = self.dispatch_year(stations, provider, year, factor)?;
        let deadline = Instant::now() + self.config.worker_timeout();
        let months = self.gather(tasks, deadline)?;

        let (rows, cols) = self.grid.shape();
        let history = WindHistory::combine(rows, cols, months);
        info!(
            "Year {} aggregated: {} cell samples",
            year,
            history.total_samples()
        );
        Ok(history)
    }

    /// Aggregate a multi-year period
    ///
    /// The period mean is the sum of the yearly means divided by the number of
    /// years with data. With `parallel_years` every month of every year is in
    /// flight at once; otherwise years are dispatched one after another. Both
    /// schedules return the same history.
    pub fn compute_period<P: StationDataProvider + ?Sized>(
        &self,
        stations: &mut [StationState],
        provider: &P,
        years: &[i32],
        altitude: Option<f64>,
    ) -> Result<WindHistory, AggregationError> {
        if years.is_empty() {
            return Err(AggregationError::EmptyPeriod);
        }
        let (rows, cols) = self.grid.shape();
        if !self.config.parallel_years {
            let mut year_histories = Vec::with_capacity(years.len());
            for &year in years {
                year_histories.push(self.compute_year(stations, provider, year, altitude)?);
            }
            return Ok(WindHistory::combine(rows, cols, year_histories));
        }

        let factor = profile_factor(altitude, &self.config)?;
        let mut per_year = Vec::with_capacity(years.len());
        for &year in years {
            per_year.push(self.dispatch_year(stations, provider, year, factor)?);
        }

        let deadline = Instant::now() + self.config.worker_timeout();
        let mut year_histories = Vec::with_capacity(years.len());
        for tasks in per_year {
            let months = self.gather(tasks, deadline)?;
            year_histories.push(WindHistory::combine(rows, cols, months));
        }

        let history = WindHistory::combine(rows, cols, year_histories);
        info!(
            "Period {:?} aggregated: {} cell samples",
            years,
            history.total_samples()
        );
        Ok(history)
    }

    /// Aggregate years one at a time, merging each into the running history
    ///
    /// Each year is folded in with `+=`, so the mean is a running pairwise
    /// average: with three or more years later years weigh more than in
    /// [`compute_period`](Self::compute_period), which averages all years
    /// equally. Two years give the same mean either way.
    pub fn compute_years_sequential<P: StationDataProvider + ?Sized>(
        &self,
        stations: &mut [StationState],
        provider: &P,
        years: &[i32],
        altitude: Option<f64>,
    ) -> Result<WindHistory, AggregationError> {
        if years.is_empty() {
            return Err(AggregationError::EmptyPeriod);
        }
        let mut history = WindHistory::for_grid(&self.grid);
        for &year in years {
            history += self.compute_year(stations, provider, year, altitude)?;
        }
        Ok(history)
    }

    fn dispatch_year<P: StationDataProvider + ?Sized>(
        &self,
        stations: &mut [StationState],
        provider: &P,
        year: i32,
        factor: f64,
    ) -> Result<Vec<MonthTask>, AggregationError> {
        let mut tasks = Vec::with_capacity(12);
        for month in 1..=12u8 {
            let batch = MonthBatch::prepare(stations, provider, year, month)?;
            let grid = Arc::clone(&self.grid);
            let min_references = self.config.min_references;
            let handle = self
                .pool
                .spawn(move || accumulate_month(&grid, &batch, factor, min_references));
            tasks.push(MonthTask {
                year,
                month,
                handle,
            });
        }
        debug!("Dispatched 12 month workers for {}", year);
        Ok(tasks)
    }

    fn gather(
        &self,
        tasks: Vec<MonthTask>,
        deadline: Instant,
    ) -> Result<Vec<WindHistory>, AggregationError> {
        tasks
            .into_iter()
            .map(|task| {
                task.handle
                    .wait_until(deadline)
                    .map_err(|err| match err {
                        WaitError::Timeout => AggregationError::WorkerTimeout {
                            year: task.year,
                            month: task.month,
                            timeout_secs: self.config.worker_timeout_secs,
                        },
                        WaitError::Disconnected => AggregationError::WorkerFailed {
                            year: task.year,
                            month: task.month,
                        },
                    })
            })
            .collect()
    }
}
