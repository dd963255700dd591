//! Connected groups of qualifying cells
//!
//! Two cells are connected when their Chebyshev distance is 1 (8-neighbour
//! adjacency). Traversal uses an explicit stack and a visited mask, so cluster
//! size is bounded by memory rather than call depth.

use nalgebra::DMatrix;

/// Grid cell index `(row, col)`
pub type Cell = (usize, usize);

/// Cells whose value strictly exceeds `threshold`
pub fn threshold_mask(values: &DMatrix<f64>, threshold: f64) -> DMatrix<bool> {
    values.map(|value| value > threshold)
}

/// Group the set cells of `mask` into 8-connected clusters
///
/// Clusters are listed in the row-major order of their first cell; the cells
/// of a cluster are sorted by `(row, col)`.
pub fn find_clusters(mask: &DMatrix<bool>) -> Vec<Vec<Cell>> {
    let (rows, cols) = mask.shape();
    let mut visited = DMatrix::from_element(rows, cols, false);
    let mut clusters = Vec::new();
    let mut stack: Vec<Cell> = Vec::new();

    for row in 0..rows {
        for col in 0..cols {
            if !mask[(row, col)] || visited[(row, col)] {
                continue;
            }

            let mut cluster = Vec::new();
            visited[(row, col)] = true;
            stack.push((row, col));

            while let Some((r, c)) = stack.pop() {
                cluster.push((r, c));
                for nr in r.saturating_sub(1)..=(r + 1).min(rows - 1) {
                    for nc in c.saturating_sub(1)..=(c + 1).min(cols - 1) {
                        if mask[(nr, nc)] && !visited[(nr, nc)] {
                            visited[(nr, nc)] = true;
                            stack.push((nr, nc));
                        }
                    }
                }
            }

            cluster.sort_unstable();
            clusters.push(cluster);
        }
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(rows: usize, cols: usize, set: &[Cell]) -> DMatrix<bool> {
        let mut mask = DMatrix::from_element(rows, cols, false);
        for &cell in set {
            mask[cell] = true;
        }
        mask
    }

    #[test]
    fn test_diagonal_neighbours_connect() {
        let clusters = find_clusters(&mask(3, 3, &[(0, 0), (1, 1), (2, 2)]));
        assert_eq!(clusters, vec![vec![(0, 0), (1, 1), (2, 2)]]);
    }

    #[test]
    fn test_gap_separates_clusters() {
        // (0,0) and (0,2) are two columns apart: no shared neighbour is set
        let clusters = find_clusters(&mask(3, 3, &[(0, 0), (0, 2), (2, 0)]));
        assert_eq!(clusters.len(), 3);
    }

    #[test]
    fn test_ring_terminates() {
        let ring: Vec<Cell> = (0..5)
            .flat_map(|r| (0..5).map(move |c| (r, c)))
            .filter(|&(r, c)| r == 0 || r == 4 || c == 0 || c == 4)
            .collect();
        let clusters = find_clusters(&mask(5, 5, &ring));
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 16);
    }

    #[test]
    fn test_large_cluster_does_not_overflow() {
        let full = DMatrix::from_element(400, 400, true);
        let clusters = find_clusters(&full);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 160_000);
    }

    #[test]
    fn test_threshold_is_strict() {
        let values = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        let mask = threshold_mask(&values, 2.0);
        assert_eq!(mask.as_slice(), &[false, false, true]);
    }
}
