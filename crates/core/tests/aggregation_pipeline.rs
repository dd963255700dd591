use std::sync::Arc;
use wind_site_core::history::{profile_factor, SPEED_CLASSES};
use wind_site_core::stations::hours_in_month;
use wind_site_core::{
    AggregationConfig, AggregationError, Grid, InMemoryArchive, MonthSeries, Station,
    StationState, WindHistory, WindHistoryAggregator,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("wind_site_core=debug")
        .with_test_writer()
        .try_init();
}

/// One station on every grid point, each reporting a constant speed for the given months
fn colocated_stations(
    grid: &Grid,
    year: i32,
    months: &[u8],
    speed: impl Fn(usize, usize) -> f64,
) -> (Vec<StationState>, InMemoryArchive) {
    let mut archive = InMemoryArchive::new();
    let mut states = Vec::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let point = grid.point(row, col);
            let id = format!("{row}-{col}");
            for &month in months {
                archive.insert(
                    id.clone(),
                    MonthSeries::constant(year, month, speed(row, col)).unwrap(),
                );
            }
            states.push(StationState::new(Station::new(id, point.lat, point.lon, 0.0)));
        }
    }
    (states, archive)
}

#[test]
fn test_constant_wind_month_end_to_end() {
    init_logging();
    let grid = Arc::new(Grid::linspace(-73.2, -73.0, 3, 45.0, 45.2, 3).unwrap());
    let (mut states, archive) = colocated_stations(&grid, 2018, &[1], |_, _| 8.0);

    let aggregator = WindHistoryAggregator::new(grid, AggregationConfig::default()).unwrap();
    let history = aggregator
        .compute_month(&mut states, &archive, 2018, 1, None)
        .unwrap();

    let hours = hours_in_month(1).unwrap() as u32;
    for row in 0..3 {
        for col in 0..3 {
            assert!((history.wind_mean()[(row, col)] - 8.0).abs() < 1e-9);
            let counts = history.histogram(row, col);
            assert_eq!(counts.len(), SPEED_CLASSES);
            assert_eq!(counts[8], hours);
            assert_eq!(counts.iter().sum::<u32>(), hours);
        }
    }
}

#[test]
fn test_hub_altitude_scales_the_field() {
    let grid = Arc::new(Grid::linspace(0.0, 0.2, 3, 0.0, 0.2, 3).unwrap());
    let (mut states, archive) = colocated_stations(&grid, 2018, &[2], |_, _| 5.0);
    let config = AggregationConfig::default();
    let factor = profile_factor(Some(80.0), &config).unwrap();

    let aggregator = WindHistoryAggregator::new(grid, config).unwrap();
    let history = aggregator
        .compute_month(&mut states, &archive, 2018, 2, Some(80.0))
        .unwrap();

    let expected = 5.0 * factor;
    assert!((history.wind_mean()[(1, 1)] - expected).abs() < 1e-9);
    assert_eq!(history.histogram(1, 1)[expected.floor() as usize], 28 * 24);
}

#[test]
fn test_months_without_stations_leave_history_empty() {
    let grid = Arc::new(Grid::linspace(0.0, 0.2, 3, 0.0, 0.2, 3).unwrap());
    let (mut states, archive) = colocated_stations(&grid, 2018, &[3], |_, _| 6.0);
    let aggregator = WindHistoryAggregator::new(grid, AggregationConfig::default()).unwrap();

    let history = aggregator
        .compute_month(&mut states, &archive, 2018, 4, None)
        .unwrap();
    assert!(history.is_empty());
    assert!(history.wind_mean().iter().all(|&v| v == 0.0));
}

#[test]
fn test_stale_month_is_not_reused_across_years() {
    let grid = Arc::new(Grid::linspace(0.0, 0.2, 3, 0.0, 0.2, 3).unwrap());
    let (mut states, mut archive) = colocated_stations(&grid, 2017, &[5], |_, _| 12.0);
    // 2018 only has May for the first row of stations
    for col in 0..3 {
        archive.insert(format!("0-{col}"), MonthSeries::constant(2018, 5, 4.0).unwrap());
    }
    // Five more stations so 2018 hours still qualify
    for i in 0..3 {
        let id = format!("extra-{i}");
        archive.insert(id.clone(), MonthSeries::constant(2018, 5, 4.0).unwrap());
        states.push(StationState::new(Station::new(id, 1.0 + f64::from(i), 1.0, 0.0)));
    }

    let aggregator = WindHistoryAggregator::new(grid, AggregationConfig::default()).unwrap();
    aggregator
        .compute_year(&mut states, &archive, 2017, None)
        .unwrap();
    let history = aggregator
        .compute_year(&mut states, &archive, 2018, None)
        .unwrap();

    // Only 4 m/s stations reported in 2018: the 12 m/s series of 2017 is gone
    assert!((history.wind_mean()[(2, 2)] - 4.0).abs() < 1e-9);
    assert_eq!(history.histogram(2, 2)[12], 0);
}

#[test]
fn test_period_modes_agree() {
    let grid = Arc::new(Grid::linspace(0.0, 0.3, 4, 10.0, 10.2, 3).unwrap());
    let mut archive = InMemoryArchive::new();
    let mut states = Vec::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let point = grid.point(row, col);
            let id = format!("{row}-{col}");
            let speed = 3.0 + col as f64;
            archive.insert(id.clone(), MonthSeries::constant(2015, 1, speed).unwrap());
            archive.insert(id.clone(), MonthSeries::constant(2016, 7, 9.0).unwrap());
            states.push(StationState::new(Station::new(id, point.lat, point.lon, 0.0)));
        }
    }

    let parallel = WindHistoryAggregator::new(Arc::clone(&grid), AggregationConfig::default())
        .unwrap()
        .compute_period(&mut states, &archive, &[2015, 2016], None)
        .unwrap();

    let sequential_config = AggregationConfig {
        parallel_years: false,
        worker_threads: 2,
        ..AggregationConfig::default()
    };
    let sequential = WindHistoryAggregator::new(Arc::clone(&grid), sequential_config)
        .unwrap()
        .compute_period(&mut states, &archive, &[2015, 2016], None)
        .unwrap();

    assert_eq!(parallel.histogram_tensor(), sequential.histogram_tensor());
    for (a, b) in parallel.wind_mean().iter().zip(sequential.wind_mean().iter()) {
        assert!((a - b).abs() < 1e-9);
    }
    // Column 1: (4 + 9) / 2 over the two years that hold data
    assert!((parallel.wind_mean()[(0, 1)] - 6.5).abs() < 1e-9);
}

#[test]
fn test_period_mean_weighs_years_equally_in_both_modes() {
    let grid = Arc::new(Grid::linspace(0.0, 0.2, 3, 0.0, 0.2, 3).unwrap());
    let mut archive = InMemoryArchive::new();
    let mut states = Vec::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let point = grid.point(row, col);
            let id = format!("{row}-{col}");
            for (year, speed) in [(2016, 3.0), (2017, 6.0), (2018, 9.0)] {
                archive.insert(id.clone(), MonthSeries::constant(year, 4, speed).unwrap());
            }
            states.push(StationState::new(Station::new(id, point.lat, point.lon, 0.0)));
        }
    }
    let years = [2016, 2017, 2018];

    for parallel_years in [true, false] {
        let config = AggregationConfig {
            parallel_years,
            ..AggregationConfig::default()
        };
        let history = WindHistoryAggregator::new(Arc::clone(&grid), config)
            .unwrap()
            .compute_period(&mut states, &archive, &years, None)
            .unwrap();
        for &mean in history.wind_mean().iter() {
            assert!((mean - 6.0).abs() < 1e-9, "parallel_years={parallel_years}: {mean}");
        }
    }

    // Running pairwise merge: ((3 + 6) / 2 + 9) / 2
    let running = WindHistoryAggregator::new(Arc::clone(&grid), AggregationConfig::default())
        .unwrap()
        .compute_years_sequential(&mut states, &archive, &years, None)
        .unwrap();
    assert!((running.wind_mean()[(1, 1)] - 6.75).abs() < 1e-9);
}

#[test]
fn test_empty_period_is_rejected() {
    let grid = Arc::new(Grid::linspace(0.0, 1.0, 2, 0.0, 1.0, 2).unwrap());
    let aggregator = WindHistoryAggregator::new(grid, AggregationConfig::default()).unwrap();
    let result = aggregator.compute_period(&mut [], &InMemoryArchive::new(), &[], None);
    assert!(matches!(result, Err(AggregationError::EmptyPeriod)));
}

#[test]
fn test_merge_with_fresh_history_is_identity() {
    let grid = Arc::new(Grid::linspace(0.0, 0.2, 3, 0.0, 0.2, 3).unwrap());
    let (mut states, archive) = colocated_stations(&grid, 2018, &[1], |row, _| 2.0 + row as f64);
    let history = WindHistoryAggregator::new(Arc::clone(&grid), AggregationConfig::default())
        .unwrap()
        .compute_month(&mut states, &archive, 2018, 1, None)
        .unwrap();

    let merged = history.clone() + WindHistory::for_grid(&grid);
    assert_eq!(merged, history);
}
