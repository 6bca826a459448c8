//! Hungarian (Kuhn–Munkres) assignment solver
//!
//! Finds a minimum-cost assignment of rows to columns in an `m x n`
//! non-negative cost matrix. Non-square input is padded to square with
//! zero-cost dummy rows or columns; pairs that land on padding are dropped,
//! so exactly `min(m, n)` pairs are returned.
//!
//! Process:
//! 1. Subtract each row minimum, then each column minimum
//! 2. Star independent zeros (row-major scan)
//! 3. Cover every column holding a starred zero; done when `n` are covered
//! 4. Prime uncovered zeros; a prime with no star in its row starts an
//!    augmenting path that swaps stars and primes (back to 3)
//! 5. With no uncovered zero left, subtract the minimum uncovered value from
//!    uncovered entries and add it to doubly covered ones (back to 4)
//!
//! Zeros are always scanned lowest row first, then lowest column, so the
//! result is deterministic for a given matrix.

use crate::errors::{ConsensusError, Result};
use crate::types::MatchPair;
use ndarray::{s, Array2};

/// Assignment solver holding the results of the last [`calculate`](Self::calculate)
#[derive(Debug, Clone, Default)]
pub struct Hungarian {
    results: Vec<MatchPair>,
    total_cost: f64,
}

impl Hungarian {
    /// Create a solver with no results
    pub fn new() -> Self {
        Self::default()
    }

    /// Solve the assignment problem for `cost`, replacing previous results.
    ///
    /// Fails with [`ConsensusError::EmptyInput`] for an empty matrix and
    /// [`ConsensusError::InvalidInput`] for a negative or non-finite entry.
    pub fn calculate(&mut self, cost: &Array2<f64>) -> Result<()> {
        trace_stage!("hungarian");
        validate_costs(cost)?;

        let (rows, cols) = cost.dim();
        let mut state = Munkres::new(cost);
        state.solve();

        self.results = (0..rows)
            .filter_map(|r| state.star_in_row[r].filter(|&c| c < cols).map(|c| (r, c)))
            .collect();
        self.total_cost = self.results.iter().map(|&(r, c)| cost[[r, c]]).sum();
        Ok(())
    }

    /// Matched `(row, col)` pairs from the last calculation, sorted by row
    pub fn results(&self) -> &[MatchPair] {
        &self.results
    }

    /// Consume the solver, returning the matched pairs
    pub fn into_results(self) -> Vec<MatchPair> {
        self.results
    }

    /// Sum of the original costs over the matched pairs
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }
}

/// Solve `cost` and return the matched pairs.
pub fn solve_assignment(cost: &Array2<f64>) -> Result<Vec<MatchPair>> {
    let mut solver = Hungarian::new();
    solver.calculate(cost)?;
    Ok(solver.into_results())
}

fn validate_costs(cost: &Array2<f64>) -> Result<()> {
    if cost.is_empty() {
        return Err(ConsensusError::empty_input("cost matrix has no entries"));
    }
    if let Some(((r, c), value)) = cost
        .indexed_iter()
        .find(|(_, value)| !value.is_finite() || **value < 0.0)
    {
        return Err(ConsensusError::invalid_input(format!(
            "cost matrix entry ({r}, {c}) must be finite and non-negative, got {value}"
        )));
    }
    Ok(())
}

/// Working state over the padded square matrix
struct Munkres {
    n: usize,
    c: Array2<f64>,
    star_in_row: Vec<Option<usize>>,
    star_in_col: Vec<Option<usize>>,
    prime_in_row: Vec<Option<usize>>,
    row_covered: Vec<bool>,
    col_covered: Vec<bool>,
}

impl Munkres {
    fn new(cost: &Array2<f64>) -> Self {
        let (rows, cols) = cost.dim();
        let n = rows.max(cols);
        let mut c = Array2::zeros((n, n));
        c.slice_mut(s![..rows, ..cols]).assign(cost);
        Self {
            n,
            c,
            star_in_row: vec![None; n],
            star_in_col: vec![None; n],
            prime_in_row: vec![None; n],
            row_covered: vec![false; n],
            col_covered: vec![false; n],
        }
    }

    fn solve(&mut self) {
        self.reduce();
        self.star_initial_zeros();

        loop {
            if self.cover_starred_columns() == self.n {
                break;
            }
            loop {
                match self.find_uncovered_zero() {
                    None => self.adjust(),
                    Some((r, c)) => {
                        self.prime_in_row[r] = Some(c);
                        if let Some(star_col) = self.star_in_row[r] {
                            self.row_covered[r] = true;
                            self.col_covered[star_col] = false;
                        } else {
                            self.augment(r, c);
                            break;
                        }
                    }
                }
            }
        }
    }

    fn reduce(&mut self) {
        for mut row in self.c.rows_mut() {
            let min = row.fold(f64::INFINITY, |m, &v| m.min(v));
            row.mapv_inplace(|v| v - min);
        }
        for mut col in self.c.columns_mut() {
            let min = col.fold(f64::INFINITY, |m, &v| m.min(v));
            col.mapv_inplace(|v| v - min);
        }
    }

    fn star_initial_zeros(&mut self) {
        for r in 0..self.n {
            for c in 0..self.n {
                if self.c[[r, c]] == 0.0
                    && self.star_in_row[r].is_none()
                    && self.star_in_col[c].is_none()
                {
                    self.star_in_row[r] = Some(c);
                    self.star_in_col[c] = Some(r);
                }
            }
        }
    }

    /// Reset covers and primes, cover starred columns, return the cover count
    fn cover_starred_columns(&mut self) -> usize {
        self.row_covered.iter_mut().for_each(|v| *v = false);
        self.prime_in_row.iter_mut().for_each(|v| *v = None);
        let mut covered = 0;
        for c in 0..self.n {
            let is_starred = self.star_in_col[c].is_some();
            self.col_covered[c] = is_starred;
            covered += usize::from(is_starred);
        }
        covered
    }

    fn find_uncovered_zero(&self) -> Option<(usize, usize)> {
        (0..self.n)
            .filter(|&r| !self.row_covered[r])
            .find_map(|r| {
                (0..self.n)
                    .find(|&c| !self.col_covered[c] && self.c[[r, c]] == 0.0)
                    .map(|c| (r, c))
            })
    }

    /// Swap stars and primes along the alternating path starting at a prime
    fn augment(&mut self, r0: usize, c0: usize) {
        let mut primes = vec![(r0, c0)];
        let mut stars = Vec::new();
        let mut col = c0;
        while let Some(star_row) = self.star_in_col[col] {
            stars.push((star_row, col));
            // A starred row on the path was covered when its prime was made.
            let Some(prime_col) = self.prime_in_row[star_row] else {
                break;
            };
            primes.push((star_row, prime_col));
            col = prime_col;
        }

        for (r, c) in stars {
            self.star_in_row[r] = None;
            self.star_in_col[c] = None;
        }
        for (r, c) in primes {
            self.star_in_row[r] = Some(c);
            self.star_in_col[c] = Some(r);
        }
    }

    /// Create new zeros when every zero is covered
    fn adjust(&mut self) {
        let min = self
            .c
            .indexed_iter()
            .filter(|&((r, c), _)| !self.row_covered[r] && !self.col_covered[c])
            .fold(f64::INFINITY, |m, (_, &v)| m.min(v));
        for ((r, c), v) in self.c.indexed_iter_mut() {
            if self.row_covered[r] {
                *v += min;
            }
            if !self.col_covered[c] {
                *v -= min;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::matrix::from_rows;

    fn solve(rows: &[Vec<f64>]) -> (Vec<MatchPair>, f64) {
        let m = from_rows(rows).unwrap();
        let mut h = Hungarian::new();
        h.calculate(&m).unwrap();
        (h.results().to_vec(), h.total_cost())
    }

    #[test]
    fn test_two_by_two_diagonal() {
        let (pairs, cost) = solve(&[vec![1.0, 2.0], vec![2.0, 1.0]]);
        assert_eq!(pairs, vec![(0, 0), (1, 1)]);
        assert!((cost - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_by_two_anti_diagonal() {
        let (pairs, cost) = solve(&[vec![3.0, 1.0], vec![1.0, 3.0]]);
        assert_eq!(pairs, vec![(0, 1), (1, 0)]);
        assert!((cost - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_three_by_three() {
        let (pairs, cost) = solve(&[
            vec![1.0, 2.0, 3.0],
            vec![2.0, 4.0, 6.0],
            vec![3.0, 6.0, 9.0],
        ]);
        assert_eq!(pairs, vec![(0, 2), (1, 1), (2, 0)]);
        assert!((cost - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_four_by_four_needs_adjustment() {
        let (pairs, cost) = solve(&[
            vec![82.0, 83.0, 69.0, 92.0],
            vec![77.0, 37.0, 49.0, 92.0],
            vec![11.0, 69.0, 5.0, 86.0],
            vec![8.0, 9.0, 98.0, 23.0],
        ]);
        assert_eq!(pairs, vec![(0, 2), (1, 1), (2, 0), (3, 3)]);
        assert!((cost - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_wide_matrix() {
        let (pairs, cost) = solve(&[vec![5.0, 1.0, 9.0], vec![1.0, 5.0, 9.0]]);
        assert_eq!(pairs, vec![(0, 1), (1, 0)]);
        assert!((cost - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_tall_matrix() {
        let (pairs, cost) = solve(&[vec![5.0, 1.0], vec![1.0, 5.0], vec![9.0, 9.0]]);
        assert_eq!(pairs, vec![(0, 1), (1, 0)]);
        assert!((cost - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_tall_matrix_prefers_cheapest_rows() {
        let (pairs, _) = solve(&[vec![9.0, 9.0], vec![1.0, 5.0], vec![5.0, 1.0]]);
        assert_eq!(pairs, vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn test_ties_resolved_row_major() {
        let (pairs, cost) = solve(&[vec![0.0; 3], vec![0.0; 3], vec![0.0; 3]]);
        assert_eq!(pairs, vec![(0, 0), (1, 1), (2, 2)]);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_single_cell() {
        let (pairs, cost) = solve(&[vec![0.7]]);
        assert_eq!(pairs, vec![(0, 0)]);
        assert!((cost - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let err = solve_assignment(&Array2::zeros((0, 0))).unwrap_err();
        assert!(err.is_empty_input());
        let err = solve_assignment(&Array2::zeros((3, 0))).unwrap_err();
        assert!(err.is_empty_input());
    }

    #[test]
    fn test_negative_cost_rejected() {
        let m = from_rows(&[vec![1.0, -0.5], vec![0.0, 1.0]]).unwrap();
        let err = solve_assignment(&m).unwrap_err();
        assert!(matches!(err, ConsensusError::InvalidInput { .. }));
    }

    #[test]
    fn test_non_finite_cost_rejected() {
        let m = from_rows(&[vec![1.0, f64::NAN]]).unwrap();
        assert!(solve_assignment(&m).is_err());
    }

    #[test]
    fn test_recalculate_replaces_results() {
        let mut h = Hungarian::new();
        h.calculate(&from_rows(&[vec![1.0, 2.0], vec![2.0, 1.0]]).unwrap())
            .unwrap();
        h.calculate(&from_rows(&[vec![4.0]]).unwrap()).unwrap();
        assert_eq!(h.results(), &[(0, 0)]);
        assert_eq!(h.total_cost(), 4.0);
    }
}
