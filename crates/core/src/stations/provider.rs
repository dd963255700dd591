//! Boundary to the station time-series collaborator

use super::station::{MonthSeries, Station};
use crate::error::StationDataError;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Source of per-station monthly wind series
///
/// Implementations wrap whatever archive holds the measurements (CSV
/// directories, a database, a remote API). Series are immutable once loaded.
pub trait StationDataProvider: Send + Sync {
    /// Whether `station` holds wind measurements for `year`-`month`
    fn has_data(&self, station: &Station, year: i32, month: u8) -> bool;

    /// Load the wind series of `station` for `year`-`month`
    fn load(
        &self,
        station: &Station,
        year: i32,
        month: u8,
    ) -> Result<Arc<MonthSeries>, StationDataError>;
}

/// Station series held in memory, keyed by (station id, year, month)
#[derive(Debug, Clone, Default)]
pub struct InMemoryArchive {
    series: FxHashMap<(String, i32, u8), Arc<MonthSeries>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a series for `station_id`; replaces any previous series for that month
    pub fn insert(&mut self, station_id: impl Into<String>, series: MonthSeries) {
        let key = (station_id.into(), series.year(), series.month());
        self.series.insert(key, Arc::new(series));
    }

    /// Number of stored series
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Whether any month of `year` is stored for `station`
    pub fn has_year(&self, station: &Station, year: i32) -> bool {
        (1..=12).any(|month| self.has_data(station, year, month))
    }
}

impl StationDataProvider for InMemoryArchive {
    fn has_data(&self, station: &Station, year: i32, month: u8) -> bool {
        self.series.contains_key(&(station.id.clone(), year, month))
    }

    fn load(
        &self,
        station: &Station,
        year: i32,
        month: u8,
    ) -> Result<Arc<MonthSeries>, StationDataError> {
        self.series
            .get(&(station.id.clone(), year, month))
            .cloned()
            .ok_or_else(|| StationDataError::MissingSeries {
                station: station.id.clone(),
                year,
                month,
            })
    }
}
