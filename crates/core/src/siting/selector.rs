//! Candidate area search over a farm power matrix
//!
//! 1. Threshold the power matrix against the farm's target power.
//! 2. Group qualifying cells into 8-connected clusters.
//! 3. Enumerate every rectangle of the required size inside each cluster.
//! 4. Rank rectangles by mean or peak power and keep the best.
//! 5. Convert cell blocks to geographic boxes with half-cell margins.
//!
//! Finding nothing is a normal outcome and yields an empty list.

use super::cluster::{find_clusters, threshold_mask};
use super::rectangle::{find_rectangles, CandidateRectangle};
use crate::config::{Ranking, SelectionConfig};
use crate::error::TurbineError;
use crate::grid::{meters_to_degrees, BoundingBox, Grid};
use crate::turbine::WindFarm;
use crate::weibull::WeibullFactors;
use nalgebra::DMatrix;
use serde::Serialize;
use tracing::{debug, info};

/// A ranked candidate area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateArea {
    pub rectangle: CandidateRectangle,
    /// Mean or peak power of the covered cells (W)
    pub score: f64,
    pub bounds: BoundingBox,
}

/// Outcome of the selection stage
#[derive(Debug, Clone, Serialize)]
pub struct SiteSelection {
    /// Expected farm power per cell (W)
    pub power: DMatrix<f64>,
    /// Best areas first
    pub areas: Vec<CandidateArea>,
}

impl SiteSelection {
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn best(&self) -> Option<&CandidateArea> {
        self.areas.first()
    }
}

/// Aggregate power of the cells covered by `rectangle`
pub fn score_rectangle(
    power: &DMatrix<f64>,
    rectangle: &CandidateRectangle,
    ranking: Ranking,
) -> f64 {
    let block = power.view(
        (rectangle.row_start, rectangle.col_start),
        (rectangle.height(), rectangle.width()),
    );
    match ranking {
        Ranking::Mean => block.mean(),
        Ranking::Max => block.max(),
    }
}

/// Rectangles of at least `min_width_cells` × `min_height_cells` cells whose
/// power exceeds `target_power`, best first
///
/// Scores sort descending; equal scores keep discovery order (cluster order,
/// then starting row and column). At most `max_results` areas are returned.
pub fn rank_candidate_areas(
    power: &DMatrix<f64>,
    grid: &Grid,
    target_power: f64,
    min_width_cells: usize,
    min_height_cells: usize,
    max_results: usize,
    ranking: Ranking,
) -> Vec<CandidateArea> {
    let clusters = find_clusters(&threshold_mask(power, target_power));
    let rectangles: Vec<CandidateRectangle> = clusters
        .iter()
        .flat_map(|cluster| find_rectangles(cluster, min_width_cells, min_height_cells))
        .collect();
    debug!(
        "{} clusters above {:.0} W hold {} rectangles of {}x{} cells",
        clusters.len(),
        target_power,
        rectangles.len(),
        min_width_cells,
        min_height_cells
    );

    let mut scored: Vec<(CandidateRectangle, f64)> = rectangles
        .into_iter()
        .map(|rectangle| {
            let score = score_rectangle(power, &rectangle, ranking);
            (rectangle, score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(max_results);

    scored
        .into_iter()
        .map(|(rectangle, score)| CandidateArea {
            rectangle,
            score,
            bounds: grid.block_bounds(
                rectangle.row_start,
                rectangle.row_end,
                rectangle.col_start,
                rectangle.col_end,
            ),
        })
        .collect()
}

/// Geographic boxes of the best candidate areas
pub fn find_candidate_areas(
    power: &DMatrix<f64>,
    grid: &Grid,
    target_power: f64,
    min_width_cells: usize,
    min_height_cells: usize,
    max_results: usize,
    ranking: Ranking,
) -> Vec<BoundingBox> {
    rank_candidate_areas(
        power,
        grid,
        target_power,
        min_width_cells,
        min_height_cells,
        max_results,
        ranking,
    )
    .into_iter()
    .map(|area| area.bounds)
    .collect()
}

/// Cells needed along each axis to hold the farm's spiral layout
///
/// The spiral of `n` turbines fills a square of `ceil(sqrt(n))` spacing slots
/// per side. The longitude extent is converted at the grid's most poleward
/// latitude so the window holds the spiral in every row of the grid. Returns
/// `(width_cells, height_cells)`, each at least one.
pub fn required_cells(
    grid: &Grid,
    farm: &WindFarm,
    spacing_factor: f64,
) -> Result<(usize, usize), TurbineError> {
    let spacing = farm.spacing_m(spacing_factor)?;
    let slots = (farm.len() as f64).sqrt().ceil();
    let (lat_deg, lon_deg) = meters_to_degrees(slots * spacing, grid.poleward_latitude());

    let cells = |extent_deg: f64, step_deg: f64| -> usize {
        if step_deg > 0.0 {
            ((extent_deg / step_deg).ceil() as usize).max(1)
        } else {
            1
        }
    };
    Ok((cells(lon_deg, grid.lon_step()), cells(lat_deg, grid.lat_step())))
}

/// Runs the whole selection stage for one farm
#[derive(Debug, Clone, Default)]
pub struct SiteSelector {
    config: SelectionConfig,
}

impl SiteSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Farm power over the grid and the best areas reaching the farm target
    pub fn select(
        &self,
        weibull: &WeibullFactors,
        grid: &Grid,
        farm: &WindFarm,
    ) -> Result<SiteSelection, TurbineError> {
        let capacity = if self.config.cap_cell_capacity {
            Some(farm.cell_capacity(grid, self.config.spacing_factor)?)
        } else {
            None
        };
        let power = farm.theoretical_power(weibull, capacity.as_ref());
        let (width, height) = required_cells(grid, farm, self.config.spacing_factor)?;

        let areas = rank_candidate_areas(
            &power,
            grid,
            farm.target_power(),
            width,
            height,
            self.config.max_results,
            self.config.ranking,
        );

        if areas.is_empty() {
            info!(
                "No {}x{} cell area reaches the target of {:.0} W",
                width,
                height,
                farm.target_power()
            );
        } else {
            info!(
                "{} candidate areas of {}x{} cells, best score {:.0} W",
                areas.len(),
                width,
                height,
                areas[0].score
            );
        }
        Ok(SiteSelection { power, areas })
    }
}
