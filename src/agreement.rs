//! Agreement between two ranking sets
//!
//! Topic indices of two model runs are not comparable, so the sets are first
//! aligned: every pair of rankings is scored with a [`RankingMetric`], the
//! similarity matrix is turned into a cost matrix (`1 - S`), and the
//! [`Hungarian`] solver picks the one-to-one matching with the highest total
//! similarity. The agreement score is the mean similarity over matched pairs.
//!
//! When the sets differ in size only `min(|A|, |B|)` pairs exist, and the
//! unmatched topics do not lower the score. [`Agreement::is_partial`] reports
//! this case, since it can hide a run that found far fewer or more topics than
//! its counterpart.

use crate::errors::{ConsensusError, Result};
use crate::matching::{matrix, Hungarian};
use crate::similarity::{AverageJaccard, RankingMetric};
use crate::types::{MatchPair, Term, TermRanking};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Upper bound of every shipped metric, used to build the cost matrix
const SIMILARITY_UPPER_BOUND: f64 = 1.0;

/// Outcome of comparing two ranking sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    /// Mean similarity over the matched pairs
    pub score: f64,
    /// `similarity[i, j]` = metric(A[i], B[j])
    pub similarity: Array2<f64>,
    /// Matched `(index in A, index in B)` pairs, sorted by index in A
    pub matching: Vec<MatchPair>,
}

impl Agreement {
    /// Similarity of each matched pair, in matching order
    pub fn matched_similarities(&self) -> Vec<f64> {
        self.matching
            .iter()
            .map(|&(row, col)| self.similarity[[row, col]])
            .collect()
    }

    /// Index in B matched to `row` of A, if any
    pub fn matched_col(&self, row: usize) -> Option<usize> {
        self.matching
            .iter()
            .find(|&&(r, _)| r == row)
            .map(|&(_, col)| col)
    }

    /// True when the two sets had different sizes, so some topics were not
    /// scored at all
    pub fn is_partial(&self) -> bool {
        self.similarity.nrows() != self.similarity.ncols()
    }

    /// Topics of A left without a partner
    pub fn unmatched_rows(&self) -> Vec<usize> {
        (0..self.similarity.nrows())
            .filter(|row| !self.matching.iter().any(|(r, _)| r == row))
            .collect()
    }

    /// Topics of B left without a partner
    pub fn unmatched_cols(&self) -> Vec<usize> {
        (0..self.similarity.ncols())
            .filter(|col| !self.matching.iter().any(|(_, c)| c == col))
            .collect()
    }
}

/// Compares ranking sets under an injected metric
#[derive(Debug, Clone, Default)]
pub struct RankingSetAgreement<M = AverageJaccard> {
    metric: M,
}

impl RankingSetAgreement<AverageJaccard> {
    /// Create a comparer using [`AverageJaccard`]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: RankingMetric> RankingSetAgreement<M> {
    /// Create a comparer with a custom metric
    pub fn with_metric(metric: M) -> Self {
        Self { metric }
    }

    /// The metric in use
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Agreement score between two ranking sets.
    ///
    /// Fails with [`ConsensusError::EmptyInput`] if either set, or any
    /// ranking in it, is empty.
    pub fn similarity<T: Term>(&self, a: &[TermRanking<T>], b: &[TermRanking<T>]) -> Result<f64> {
        self.compare(a, b).map(|agreement| agreement.score)
    }

    /// Align two ranking sets and score the alignment.
    ///
    /// Returns the score together with the similarity matrix and matching.
    /// Fails with [`ConsensusError::EmptyInput`] if either set, or any
    /// ranking in it, is empty.
    pub fn compare<T: Term>(&self, a: &[TermRanking<T>], b: &[TermRanking<T>]) -> Result<Agreement> {
        trace_stage!("ranking_set_agreement");
        if a.is_empty() || b.is_empty() {
            return Err(ConsensusError::empty_input(format!(
                "cannot compare ranking sets of sizes {} and {}",
                a.len(),
                b.len()
            )));
        }

        let similarity = self.build_matrix(a, b)?;
        Self::align(a.len(), b.len(), similarity)
    }

    /// Same as [`compare`](Self::compare), with the similarity matrix built
    /// in parallel. Worth it for large sets; the result is identical.
    pub fn compare_parallel<T>(&self, a: &[TermRanking<T>], b: &[TermRanking<T>]) -> Result<Agreement>
    where
        T: Term + Sync,
        M: Sync,
    {
        trace_stage!("ranking_set_agreement");
        if a.is_empty() || b.is_empty() {
            return Err(ConsensusError::empty_input(format!(
                "cannot compare ranking sets of sizes {} and {}",
                a.len(),
                b.len()
            )));
        }

        let similarity = self.build_matrix_parallel(a, b)?;
        Self::align(a.len(), b.len(), similarity)
    }

    fn align(rows: usize, cols: usize, similarity: Array2<f64>) -> Result<Agreement> {
        if similarity.dim() != (rows, cols) {
            return Err(ConsensusError::dimension_mismatch((rows, cols), similarity.dim()));
        }

        let mut solver = Hungarian::new();
        solver.calculate(&(SIMILARITY_UPPER_BOUND - &similarity))?;
        let matching = solver.into_results();

        let total: f64 = matching
            .iter()
            .map(|&(row, col)| similarity[[row, col]])
            .sum();
        let score = total / matching.len() as f64;

        if rows != cols {
            trace_debug!(
                rows,
                cols,
                matched = matching.len(),
                "partial matching: unmatched topics do not contribute to the score"
            );
        }

        Ok(Agreement {
            score,
            similarity,
            matching,
        })
    }

    /// All-pairs similarity matrix between two ranking sets.
    ///
    /// Fails with [`ConsensusError::EmptyInput`] if any ranking is empty.
    pub fn build_matrix<T: Term>(
        &self,
        a: &[TermRanking<T>],
        b: &[TermRanking<T>],
    ) -> Result<Array2<f64>> {
        let data = a
            .iter()
            .flat_map(|ra| b.iter().map(move |rb| self.metric.checked_similarity(ra, rb)))
            .collect::<Result<Vec<f64>>>()?;
        matrix::from_shape_vec(a.len(), b.len(), data)
    }

    /// [`build_matrix`](Self::build_matrix) with rows computed on the rayon pool
    pub fn build_matrix_parallel<T>(
        &self,
        a: &[TermRanking<T>],
        b: &[TermRanking<T>],
    ) -> Result<Array2<f64>>
    where
        T: Term + Sync,
        M: Sync,
    {
        let data = a
            .par_iter()
            .flat_map_iter(|ra| b.iter().map(move |rb| self.metric.checked_similarity(ra, rb)))
            .collect::<Result<Vec<f64>>>()?;
        matrix::from_shape_vec(a.len(), b.len(), data)
    }
}
