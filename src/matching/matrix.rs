//! Helpers for the dense similarity and cost matrices (`ndarray::Array2<f64>`)

use crate::errors::{ConsensusError, Result};
use ndarray::Array2;

/// Build a `rows x cols` matrix from row-major data.
///
/// Fails with [`ConsensusError::DimensionMismatch`] if `data.len()` is not
/// `rows * cols`.
pub fn from_shape_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Array2<f64>> {
    let len = data.len();
    Array2::from_shape_vec((rows, cols), data).map_err(|_| {
        let found_rows = if cols == 0 { 0 } else { len / cols };
        ConsensusError::dimension_mismatch((rows, cols), (found_rows, cols))
    })
}

/// Build a matrix from nested rows.
///
/// Fails with [`ConsensusError::DimensionMismatch`] on ragged input.
pub fn from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some(row) = rows.iter().find(|row| row.len() != n_cols) {
        return Err(ConsensusError::dimension_mismatch(
            (rows.len(), n_cols),
            (rows.len(), row.len()),
        ));
    }
    from_shape_vec(rows.len(), n_cols, rows.concat())
}

/// Largest entry, or `None` for an empty matrix
pub fn max(m: &Array2<f64>) -> Option<f64> {
    m.iter().copied().reduce(f64::max)
}

/// Turn a similarity matrix into a cost matrix: `upper - s`.
///
/// With `upper = None` the matrix maximum is used, so the most similar pair
/// costs zero.
pub fn to_cost(similarity: &Array2<f64>, upper: Option<f64>) -> Array2<f64> {
    let upper = upper.or_else(|| max(similarity)).unwrap_or(0.0);
    upper - similarity
}
