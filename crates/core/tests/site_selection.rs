use nalgebra::DMatrix;
use wind_site_core::siting::{find_clusters, find_rectangles, threshold_mask};
use wind_site_core::{
    find_candidate_areas, BoundingBox, EngineConfig, Grid, InMemoryArchive, MonthSeries,
    Ranking, Station, StationInventory, WindFarm, WindSiteEngine, Windmill,
};

fn unit_grid(rows: usize, cols: usize) -> Grid {
    Grid::linspace(0.0, (cols - 1) as f64, cols, 0.0, (rows - 1) as f64, rows).unwrap()
}

fn power_from_mask(rows: usize, cols: usize, set: &[(usize, usize)]) -> DMatrix<f64> {
    let mut power = DMatrix::zeros(rows, cols);
    for &cell in set {
        power[cell] = 1.0e6;
    }
    power
}

#[test]
fn test_single_block_yields_exactly_one_rectangle() {
    let power = power_from_mask(4, 4, &[(2, 1), (2, 2), (3, 1), (3, 2)]);
    let areas = find_candidate_areas(&power, &unit_grid(4, 4), 0.5e6, 2, 2, 5, Ranking::Mean);
    assert_eq!(areas, vec![BoundingBox::new(1.5, 3.5, 0.5, 2.5)]);
}

#[test]
fn test_diagonal_cells_across_a_gap_stay_separate() {
    // (0,0)-(1,1) touch diagonally; (1,1) and (2,3) are two columns apart
    let power = power_from_mask(4, 4, &[(0, 0), (1, 1), (2, 3), (3, 3)]);
    let clusters = find_clusters(&threshold_mask(&power, 0.0));
    assert_eq!(clusters, vec![vec![(0, 0), (1, 1)], vec![(2, 3), (3, 3)]]);
}

#[test]
fn test_l_shape_has_no_tall_rectangle_on_its_arm() {
    // Arm: column 0 of rows 0..4; foot: row 4, columns 0..4
    let mut cells: Vec<(usize, usize)> = (0..4).map(|r| (r, 0)).collect();
    cells.extend((0..4).map(|c| (4, c)));
    let power = power_from_mask(5, 4, &cells);

    let clusters = find_clusters(&threshold_mask(&power, 0.0));
    assert_eq!(clusters.len(), 1);
    assert!(find_rectangles(&clusters[0], 2, 2).is_empty());

    let narrow = find_rectangles(&clusters[0], 1, 2);
    assert!(narrow.iter().all(|r| r.col_start == 0 && r.width() == 1));
    assert_eq!(narrow.len(), 4);
}

#[test]
fn test_no_qualifying_area_is_not_an_error() {
    let power = DMatrix::from_element(5, 5, 100.0);
    let areas = find_candidate_areas(&power, &unit_grid(5, 5), 1.0e9, 1, 1, 5, Ranking::Max);
    assert!(areas.is_empty());
}

#[test]
fn test_engine_places_farm_in_windy_half() {
    // 0.1° grid, eastern half (columns 3..6) windy
    let grid = Grid::linspace(-70.0, -69.5, 6, 45.0, 45.5, 6).unwrap();
    let mut stations = Vec::new();
    let mut archive = InMemoryArchive::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let point = grid.point(row, col);
            let id = format!("{row}-{col}");
            let speed = if col >= 3 { 9.0 } else { 3.0 };
            archive.insert(id.clone(), MonthSeries::constant(2018, 6, speed).unwrap());
            stations.push(Station::new(id, point.lat, point.lon, 0.0));
        }
    }
    let inventory = StationInventory::new(stations);

    let engine = WindSiteEngine::new(grid, EngineConfig::default()).unwrap();
    let mut states = engine.nearby_stations(&inventory, 10, 3.0);
    assert_eq!(states.len(), 36);

    let windmill = Windmill::with_default_speeds(80.0, 40.0).unwrap();
    let target = 4.0 * windmill.produced_power(6.0);
    let mut farm = WindFarm::uniform(target, &windmill, 4);

    let outcome = engine
        .run(&mut states, &archive, &[2018], &mut farm, None)
        .unwrap();

    assert_eq!(outcome.selection.areas.len(), 5);
    for area in &outcome.selection.areas {
        assert!(area.rectangle.col_start >= 3);
    }
    let best = outcome.selection.best().unwrap();
    assert_eq!((best.rectangle.row_start, best.rectangle.col_start), (0, 3));

    assert_eq!(outcome.layout.len(), 4);
    assert!(outcome.layout.iter().all(|p| best.bounds.contains(p)));
    assert!(outcome.placed_power > target);
    assert!(farm.windmills().iter().all(|w| w.coordinates().is_some()));
}
