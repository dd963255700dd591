//! Per-cell Weibull parameters over the study grid

use super::fit::{fit_mle, fit_moments, WeibullFit};
use crate::config::FitMethod;
use crate::history::WindHistory;
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Shape and scale matrices of the per-cell Weibull fits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeibullFactors {
    shape: DMatrix<f64>,
    scale: DMatrix<f64>,
}

impl WeibullFactors {
    /// Matrices filled with the no-data sentinel
    pub fn sentinel(rows: usize, cols: usize) -> Self {
        Self {
            shape: DMatrix::zeros(rows, cols),
            scale: DMatrix::zeros(rows, cols),
        }
    }

    /// Same fit in every cell
    pub fn uniform(rows: usize, cols: usize, fit: WeibullFit) -> Self {
        Self {
            shape: DMatrix::from_element(rows, cols, fit.shape),
            scale: DMatrix::from_element(rows, cols, fit.scale),
        }
    }

    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> WeibullFit,
    {
        let mut factors = Self::sentinel(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                factors.set(row, col, f(row, col));
            }
        }
        factors
    }

    pub fn dims(&self) -> (usize, usize) {
        self.shape.shape()
    }

    pub fn shape_matrix(&self) -> &DMatrix<f64> {
        &self.shape
    }

    pub fn scale_matrix(&self) -> &DMatrix<f64> {
        &self.scale
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> WeibullFit {
        WeibullFit::new(self.shape[(row, col)], self.scale[(row, col)])
    }

    pub fn set(&mut self, row: usize, col: usize, fit: WeibullFit) {
        self.shape[(row, col)] = fit.shape;
        self.scale[(row, col)] = fit.scale;
    }

    /// Cells holding a proper fit
    pub fn valid_cells(&self) -> usize {
        let (rows, cols) = self.dims();
        (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .filter(|&(row, col)| self.get(row, col).is_valid())
            .count()
    }
}

/// Fit every cell histogram of `history`
///
/// Cells are independent and fitted in parallel.
pub fn fit_history(history: &WindHistory, method: FitMethod) -> WeibullFactors {
    let (rows, cols) = history.shape();
    let fitter = match method {
        FitMethod::Mle => fit_mle,
        FitMethod::Moments => fit_moments,
    };

    let fits: Vec<WeibullFit> = (0..rows * cols)
        .into_par_iter()
        .map(|cell| fitter(history.histogram(cell / cols, cell % cols)))
        .collect();

    let factors = WeibullFactors::from_fn(rows, cols, |row, col| fits[row * cols + col]);
    info!(
        "Weibull fit ({:?}): {} of {} cells with data",
        method,
        factors.valid_cells(),
        rows * cols
    );
    factors
}
