//! Weather stations and their hourly wind series

use crate::error::StationDataError;
use crate::grid::GeoPoint;
use serde::{Deserialize, Serialize};

/// km/h to m/s
pub const KMH_TO_MS: f64 = 1000.0 / 3600.0;

/// Days per month, February fixed at 28
const DAYS_PER_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Number of days in `month` (1-12) using the non-leap table
pub fn days_in_month(month: u8) -> Option<u32> {
    match month {
        1..=12 => Some(DAYS_PER_MONTH[usize::from(month - 1)]),
        _ => None,
    }
}

/// Number of hourly timestamps in `month` (1-12)
pub fn hours_in_month(month: u8) -> Option<usize> {
    days_in_month(month).map(|days| days as usize * 24)
}

/// A measurement station from the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation above sea level (m)
    pub elevation: f64,
}

impl Station {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            elevation,
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Hourly wind speeds of one station for one month (m/s)
///
/// Index `h` is the `h`-th hour of the month. Missing hours are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSeries {
    year: i32,
    month: u8,
    hourly: Vec<Option<f64>>,
}

impl MonthSeries {
    /// Series from speeds already in m/s
    pub fn new(year: i32, month: u8, hourly: Vec<Option<f64>>) -> Result<Self, StationDataError> {
        if days_in_month(month).is_none() {
            return Err(StationDataError::InvalidMonth(month));
        }
        Ok(Self {
            year,
            month,
            hourly,
        })
    }

    /// Series from speeds in km/h, as published by station archives
    pub fn from_kmh<I>(year: i32, month: u8, hourly_kmh: I) -> Result<Self, StationDataError>
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let hourly = hourly_kmh
            .into_iter()
            .map(|speed| speed.map(|kmh| kmh * KMH_TO_MS))
            .collect();
        Self::new(year, month, hourly)
    }

    /// Full month at a constant speed (m/s)
    pub fn constant(year: i32, month: u8, speed: f64) -> Result<Self, StationDataError> {
        let hours = hours_in_month(month).ok_or(StationDataError::InvalidMonth(month))?;
        Self::new(year, month, vec![Some(speed); hours])
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn len(&self) -> usize {
        self.hourly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hourly.is_empty()
    }

    /// Reading at `hour`, absent when missing, out of range or not finite
    #[inline]
    pub fn reading_at(&self, hour: usize) -> Option<f64> {
        self.hourly
            .get(hour)
            .copied()
            .flatten()
            .filter(|speed| speed.is_finite())
    }
}
