//! Axis-aligned rectangles of a fixed size inside a cluster
//!
//! Each row of a cluster is split into maximal runs of consecutive columns.
//! A window of `width` columns is a candidate when it lies inside one run of
//! its row and the same window lies inside a run of each of the following
//! `height - 1` rows, those rows being numerically consecutive.

use super::cluster::Cell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Block of cells `row_start..row_end` × `col_start..col_end` (end exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateRectangle {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl CandidateRectangle {
    pub fn height(&self) -> usize {
        self.row_end - self.row_start
    }

    pub fn width(&self) -> usize {
        self.col_end - self.col_start
    }

    pub fn rows(&self) -> Range<usize> {
        self.row_start..self.row_end
    }

    pub fn columns(&self) -> Range<usize> {
        self.col_start..self.col_end
    }

    pub fn contains(&self, (row, col): Cell) -> bool {
        self.rows().contains(&row) && self.columns().contains(&col)
    }
}

/// Maximal runs of consecutive columns, per row
pub fn column_runs(cluster: &[Cell]) -> BTreeMap<usize, Vec<Range<usize>>> {
    let mut columns: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for &(row, col) in cluster {
        columns.entry(row).or_default().push(col);
    }

    columns
        .into_iter()
        .map(|(row, mut cols)| {
            cols.sort_unstable();
            cols.dedup();
            let mut runs: Vec<Range<usize>> = Vec::new();
            for col in cols {
                match runs.last_mut() {
                    Some(run) if run.end == col => run.end += 1,
                    _ => runs.push(col..col + 1),
                }
            }
            (row, runs)
        })
        .collect()
}

/// Every `width` × `height` rectangle fully covered by `cluster`
///
/// Rectangles are listed by starting row, then starting column. Sizes below
/// one are treated as one.
pub fn find_rectangles(cluster: &[Cell], width: usize, height: usize) -> Vec<CandidateRectangle> {
    let width = width.max(1);
    let height = height.max(1);
    let runs = column_runs(cluster);

    let covers = |row: usize, window: &Range<usize>| -> bool {
        runs.get(&row).is_some_and(|row_runs| {
            row_runs
                .iter()
                .any(|run| run.start <= window.start && window.end <= run.end)
        })
    };

    let mut rectangles = Vec::new();
    for (&row, row_runs) in &runs {
        for run in row_runs.iter().filter(|run| run.len() >= width) {
            for col_start in run.start..=run.end - width {
                let window = col_start..col_start + width;
                if (row + 1..row + height).all(|next| covers(next, &window)) {
                    rectangles.push(CandidateRectangle {
                        row_start: row,
                        row_end: row + height,
                        col_start,
                        col_end: col_start + width,
                    });
                }
            }
        }
    }
    rectangles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(rows: Range<usize>, cols: Range<usize>) -> Vec<Cell> {
        rows.flat_map(|r| cols.clone().map(move |c| (r, c))).collect()
    }

    #[test]
    fn test_runs_split_on_gaps() {
        let runs = column_runs(&[(0, 4), (0, 1), (0, 2), (0, 7), (1, 0)]);
        assert_eq!(runs[&0], vec![1..3, 4..5, 7..8]);
        assert_eq!(runs[&1], vec![0..1]);
    }

    #[test]
    fn test_exact_block() {
        let rectangles = find_rectangles(&block(1..3, 1..3), 2, 2);
        assert_eq!(
            rectangles,
            vec![CandidateRectangle {
                row_start: 1,
                row_end: 3,
                col_start: 1,
                col_end: 3
            }]
        );
    }

    #[test]
    fn test_sliding_windows() {
        // 2 rows × 4 columns holds three 2×2 windows
        let rectangles = find_rectangles(&block(0..2, 0..4), 2, 2);
        assert_eq!(rectangles.len(), 3);
        assert_eq!(rectangles[2].columns(), 2..4);
    }

    #[test]
    fn test_l_shape_only_yields_the_base() {
        // Narrow vertical arm (rows 0..3, column 0) on a 2×3 base (rows 3..5)
        let mut cells = block(0..3, 0..1);
        cells.extend(block(3..5, 0..3));

        let rectangles = find_rectangles(&cells, 2, 2);
        assert_eq!(rectangles.len(), 2);
        for rectangle in &rectangles {
            assert_eq!(rectangle.rows(), 3..5);
        }

        let columns = find_rectangles(&cells, 1, 2);
        assert!(columns.iter().all(|r| r.col_start == 0 || r.row_start >= 3));
    }

    #[test]
    fn test_rows_must_be_consecutive() {
        let mut cells = block(0..1, 0..2);
        cells.extend(block(2..3, 0..2));
        assert!(find_rectangles(&cells, 2, 2).is_empty());
        assert_eq!(find_rectangles(&cells, 2, 1).len(), 2);
    }

    #[test]
    fn test_window_must_fit_one_run() {
        // Row 1 has the same columns but split by a gap at column 1
        let cells = vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 2)];
        assert!(find_rectangles(&cells, 2, 2).is_empty());
    }
}
