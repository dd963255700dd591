//! Per-cell wind statistics: running mean and speed-class histogram

use crate::grid::Grid;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};
use tracing::warn;

/// Number of speed classes, one per integer m/s from 0 to 39
pub const SPEED_CLASSES: usize = 40;

/// Speed class of a wind speed: `floor(v)`, clamped into `0..SPEED_CLASSES`
///
/// The flag is set when the speed fell outside the histogram range.
#[inline]
pub fn speed_class(speed: f64) -> (usize, bool) {
    if speed.is_nan() || speed < 0.0 {
        return (0, true);
    }
    let class = speed.floor();
    if class >= SPEED_CLASSES as f64 {
        (SPEED_CLASSES - 1, true)
    } else {
        (class as usize, false)
    }
}

/// Wind history of a grid: mean speed and speed-class histogram per cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindHistory {
    rows: usize,
    cols: usize,
    wind_mean: DMatrix<f64>,
    /// `rows × cols × SPEED_CLASSES`, cell-major
    wind_histogram: Vec<u32>,
}

impl WindHistory {
    /// Empty history (zero mean, no samples)
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            wind_mean: DMatrix::zeros(rows, cols),
            wind_histogram: vec![0; rows * cols * SPEED_CLASSES],
        }
    }

    pub fn for_grid(grid: &Grid) -> Self {
        let (rows, cols) = grid.shape();
        Self::zeros(rows, cols)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Mean interpolated wind speed per cell (m/s)
    pub fn wind_mean(&self) -> &DMatrix<f64> {
        &self.wind_mean
    }

    /// Speed-class counts of one cell
    pub fn histogram(&self, row: usize, col: usize) -> &[u32] {
        let start = self.cell_offset(row, col);
        &self.wind_histogram[start..start + SPEED_CLASSES]
    }

    /// Whole histogram tensor, cell-major (`(row * cols + col) * SPEED_CLASSES + class`)
    pub fn histogram_tensor(&self) -> &[u32] {
        &self.wind_histogram
    }

    /// Number of interpolated timestamps that reached a cell
    pub fn samples(&self, row: usize, col: usize) -> u64 {
        self.histogram(row, col).iter().map(|&c| u64::from(c)).sum()
    }

    /// Samples summed over every cell
    pub fn total_samples(&self) -> u64 {
        self.wind_histogram.iter().map(|&c| u64::from(c)).sum()
    }

    /// Whether no timestamp ever contributed
    pub fn is_empty(&self) -> bool {
        self.wind_histogram.iter().all(|&c| c == 0)
    }

    #[inline]
    fn cell_offset(&self, row: usize, col: usize) -> usize {
        (row * self.cols + col) * SPEED_CLASSES
    }

    /// Merge two histories of the same grid
    ///
    /// Histograms add. Means average when both sides hold samples; when one
    /// side is empty the other side's mean is kept unchanged.
    ///
    /// # Panics
    /// If the two histories cover different grid shapes.
    pub fn merge(&self, other: &WindHistory) -> WindHistory {
        assert_eq!(
            self.shape(),
            other.shape(),
            "cannot merge wind histories of different grids"
        );

        let wind_mean = match (self.is_empty(), other.is_empty()) {
            (true, _) => other.wind_mean.clone(),
            (false, true) => self.wind_mean.clone(),
            (false, false) => (&self.wind_mean + &other.wind_mean) / 2.0,
        };

        let wind_histogram = self
            .wind_histogram
            .iter()
            .zip(&other.wind_histogram)
            .map(|(a, b)| a + b)
            .collect();

        WindHistory {
            rows: self.rows,
            cols: self.cols,
            wind_mean,
            wind_histogram,
        }
    }

    /// Combine partial histories of consecutive periods (months of a year,
    /// years of a study)
    ///
    /// Histograms are summed; the mean is the average of the partial means
    /// over the parts that hold samples. No contributing part leaves the mean
    /// at zero.
    pub fn combine<I>(rows: usize, cols: usize, parts: I) -> WindHistory
    where
        I: IntoIterator<Item = WindHistory>,
    {
        let mut combined = WindHistory::zeros(rows, cols);
        let mut contributors = 0usize;

        for part in parts {
            assert_eq!(
                part.shape(),
                (rows, cols),
                "cannot combine wind histories of different grids"
            );
            if !part.is_empty() {
                combined.wind_mean += &part.wind_mean;
                contributors += 1;
            }
            for (total, count) in combined.wind_histogram.iter_mut().zip(&part.wind_histogram) {
                *total += count;
            }
        }

        if contributors > 0 {
            combined.wind_mean /= contributors as f64;
        }
        combined
    }
}

impl Add for WindHistory {
    type Output = WindHistory;

    fn add(self, other: WindHistory) -> WindHistory {
        self.merge(&other)
    }
}

impl AddAssign for WindHistory {
    fn add_assign(&mut self, other: WindHistory) {
        *self = self.merge(&other);
    }
}

/// Running sums of interpolated wind fields over a period
#[derive(Debug, Clone)]
pub struct WindAccumulator {
    rows: usize,
    cols: usize,
    sum: DMatrix<f64>,
    histogram: Vec<u32>,
    timestamps: usize,
    clamped: u64,
}

impl WindAccumulator {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            sum: DMatrix::zeros(rows, cols),
            histogram: vec![0; rows * cols * SPEED_CLASSES],
            timestamps: 0,
            clamped: 0,
        }
    }

    pub fn for_grid(grid: &Grid) -> Self {
        let (rows, cols) = grid.shape();
        Self::new(rows, cols)
    }

    /// Interpolated timestamps recorded so far
    pub fn timestamps(&self) -> usize {
        self.timestamps
    }

    /// Speeds that fell outside the histogram range
    pub fn clamped(&self) -> u64 {
        self.clamped
    }

    /// Add one interpolated wind field (m/s)
    ///
    /// # Panics
    /// If the field shape differs from the accumulator's grid.
    pub fn record(&mut self, field: &DMatrix<f64>) {
        assert_eq!(field.shape(), (self.rows, self.cols), "wind field shape mismatch");

        for row in 0..self.rows {
            for col in 0..self.cols {
                let (class, out_of_range) = speed_class(field[(row, col)]);
                if out_of_range {
                    self.clamped += 1;
                }
                self.histogram[(row * self.cols + col) * SPEED_CLASSES + class] += 1;
            }
        }
        self.sum += field;
        self.timestamps += 1;
    }

    /// Divide the running sum by the number of recorded timestamps
    pub fn finish(self) -> WindHistory {
        if self.clamped > 0 {
            warn!(
                "{} interpolated speeds fell outside 0..{} m/s and were clamped",
                self.clamped, SPEED_CLASSES
            );
        }

        let wind_mean = if self.timestamps > 0 {
            self.sum / self.timestamps as f64
        } else {
            self.sum
        };

        WindHistory {
            rows: self.rows,
            cols: self.cols,
            wind_mean,
            wind_histogram: self.histogram,
        }
    }
}
