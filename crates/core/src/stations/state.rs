//! Per-station load state and the immutable month batches handed to workers
//!
//! A station keeps at most one loaded series per calendar month. Before each
//! month is dispatched the parent refreshes every station (load if the month
//! has data, clear the slot otherwise) and snapshots the loaded series into a
//! [`MonthBatch`]. Workers only ever see the batch.

use super::provider::StationDataProvider;
use super::station::{hours_in_month, MonthSeries, Station};
use crate::error::StationDataError;
use crate::grid::GeoPoint;
use crate::interpolation::StationReading;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// A station together with the series currently loaded for it
#[derive(Debug, Clone)]
pub struct StationState {
    station: Station,
    slots: FxHashMap<u8, Arc<MonthSeries>>,
}

impl StationState {
    pub fn new(station: Station) -> Self {
        Self {
            station,
            slots: FxHashMap::default(),
        }
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn has_data<P: StationDataProvider + ?Sized>(
        &self,
        provider: &P,
        year: i32,
        month: u8,
    ) -> bool {
        provider.has_data(&self.station, year, month)
    }

    /// Load the series for `year`-`month` into the month slot
    pub fn load<P: StationDataProvider + ?Sized>(
        &mut self,
        provider: &P,
        year: i32,
        month: u8,
    ) -> Result<(), StationDataError> {
        let series = provider.load(&self.station, year, month)?;
        self.slots.insert(month, series);
        Ok(())
    }

    /// Forget whatever was loaded for `month`
    pub fn reset(&mut self, month: u8) {
        self.slots.remove(&month);
    }

    /// Reading at `hour` of the series loaded for `month`
    pub fn reading_at(&self, month: u8, hour: usize) -> Option<f64> {
        self.slots
            .get(&month)
            .and_then(|series| series.reading_at(hour))
    }

    /// Load `year`-`month` if the provider has it, otherwise clear the slot
    ///
    /// Returns whether a series is now loaded.
    pub fn refresh<P: StationDataProvider + ?Sized>(
        &mut self,
        provider: &P,
        year: i32,
        month: u8,
    ) -> Result<bool, StationDataError> {
        if self.has_data(provider, year, month) {
            self.load(provider, year, month)?;
            Ok(true)
        } else {
            self.reset(month);
            Ok(false)
        }
    }

    fn loaded(&self, month: u8) -> Option<&Arc<MonthSeries>> {
        self.slots.get(&month)
    }
}

/// Immutable snapshot of every station series available for one month
#[derive(Debug, Clone)]
pub struct MonthBatch {
    year: i32,
    month: u8,
    series: Vec<(GeoPoint, Arc<MonthSeries>)>,
}

impl MonthBatch {
    /// Build a batch directly from located series
    pub fn new(
        year: i32,
        month: u8,
        series: Vec<(GeoPoint, Arc<MonthSeries>)>,
    ) -> Result<Self, StationDataError> {
        if hours_in_month(month).is_none() {
            return Err(StationDataError::InvalidMonth(month));
        }
        Ok(Self {
            year,
            month,
            series,
        })
    }

    /// Refresh every station for `year`-`month` and snapshot the loaded series
    pub fn prepare<P: StationDataProvider + ?Sized>(
        states: &mut [StationState],
        provider: &P,
        year: i32,
        month: u8,
    ) -> Result<Self, StationDataError> {
        for state in states.iter_mut() {
            state.refresh(provider, year, month)?;
        }

        let series: Vec<_> = states
            .iter()
            .filter_map(|state| {
                state
                    .loaded(month)
                    .map(|series| (state.station().location(), Arc::clone(series)))
            })
            .collect();

        debug!(
            "Prepared {}-{:02}: {} of {} stations hold wind data",
            year,
            month,
            series.len(),
            states.len()
        );

        Self::new(year, month, series)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn station_count(&self) -> usize {
        self.series.len()
    }

    /// Hourly timestamps in the month
    pub fn hours(&self) -> usize {
        hours_in_month(self.month).unwrap_or(0)
    }

    /// Every station reading present at `hour`
    pub fn readings_at(&self, hour: usize) -> Vec<StationReading> {
        self.series
            .iter()
            .filter_map(|(location, series)| {
                series.reading_at(hour).map(|wind_speed| StationReading {
                    wind_speed,
                    location: *location,
                })
            })
            .collect()
    }
}
