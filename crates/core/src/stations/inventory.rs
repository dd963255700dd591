//! Station inventory search

use super::station::Station;
use crate::grid::BoundingBox;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The set of known stations with their locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationInventory {
    stations: Vec<Station>,
}

impl StationInventory {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Stations located inside `bbox`
    pub fn find_stations(&self, bbox: &BoundingBox) -> Vec<Station> {
        self.stations
            .iter()
            .filter(|station| bbox.contains(&station.location()))
            .cloned()
            .collect()
    }

    /// Stations around `area`, widening the search until enough are found
    ///
    /// Starts `radius` degrees around the area and grows by one degree per
    /// attempt until `required` stations are found or `max_radius` is passed,
    /// in which case the widest search is returned.
    pub fn find_near_stations(
        &self,
        area: &BoundingBox,
        radius: f64,
        required: usize,
        max_radius: f64,
    ) -> Vec<Station> {
        let mut radius = radius.max(0.0);
        loop {
            let found = self.find_stations(&area.expanded(radius));
            if found.len() >= required {
                debug!("Found {} stations within {radius}°", found.len());
                return found;
            }
            if radius + 1.0 > max_radius {
                warn!(
                    "Only {} of {} required stations within {radius}° of the study area",
                    found.len(),
                    required
                );
                return found;
            }
            radius += 1.0;
        }
    }
}
