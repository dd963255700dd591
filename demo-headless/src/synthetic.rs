//! Seeded station archive and terrain standing in for real data sources

use crate::study::{Study, SyntheticArchive};
use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use wind_site_core::stations::hours_in_month;
use wind_site_core::weibull::sample_weibull;
use wind_site_core::{GeoPoint, InMemoryArchive, MonthSeries, Station, StationInventory};

/// Stations scattered around the study area with hourly Weibull winds
///
/// The Weibull scale grows linearly from west to east so that the windy
/// side of the area is known in advance.
pub fn build_archive(study: &Study, seed: u64) -> Result<(StationInventory, InMemoryArchive)> {
    let settings = &study.synthetic;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut stations = Vec::with_capacity(settings.stations);
    let mut archive = InMemoryArchive::new();

    let lon_span = study.lon_max - study.lon_min + 2.0 * settings.margin_deg;
    let lat_span = study.lat_max - study.lat_min + 2.0 * settings.margin_deg;

    for index in 0..settings.stations {
        let lon = study.lon_min - settings.margin_deg + rng.random::<f64>() * lon_span;
        let lat = study.lat_min - settings.margin_deg + rng.random::<f64>() * lat_span;
        let station = Station::new(format!("SYN{index:03}"), lat, lon, 0.0);
        let scale = scale_at(settings, study, lon);

        for &year in &study.study_years {
            for &month in &settings.months {
                let Some(hours) = hours_in_month(month) else {
                    warn!("Skipping invalid month {} in synthetic settings", month);
                    continue;
                };
                let speeds = sample_weibull(settings.shape, scale, hours, &mut rng);
                let hourly = speeds
                    .into_iter()
                    .map(|speed| (rng.random::<f64>() >= settings.gap_probability).then_some(speed))
                    .collect();
                archive.insert(station.id.clone(), MonthSeries::new(year, month, hourly)?);
            }
        }
        stations.push(station);
    }

    info!(
        "Generated {} synthetic stations, {} monthly series",
        stations.len(),
        archive.len()
    );
    Ok((StationInventory::new(stations), archive))
}

fn scale_at(settings: &SyntheticArchive, study: &Study, lon: f64) -> f64 {
    let span = study.lon_max - study.lon_min;
    let t = if span > 0.0 {
        ((lon - study.lon_min) / span).clamp(0.0, 1.0)
    } else {
        0.5
    };
    settings.scale_west + t * (settings.scale_east - settings.scale_west)
}

/// Rolling terrain of the given relief, flat towards the south
pub fn terrain(relief_m: f64, lat_min: f64) -> impl Fn(&GeoPoint) -> f64 + Send + Sync {
    move |point: &GeoPoint| {
        let north = (point.lat - lat_min).max(0.0);
        200.0 + relief_m * north * (point.lat * 40.0).sin() * (point.lon * 40.0).cos()
    }
}
