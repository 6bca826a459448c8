//! Validation measures for term ranking sets
//!
//! - [`TermValidator`]: agreement between test rankings and ground-truth
//!   class rankings, given directly or derived from class centroids of a
//!   document-term matrix
//! - [`DiversityValidator`]: mean pairwise dissimilarity of the rankings in
//!   one set
//! - [`ScoreCollection`]: scores of many experiments, with mean and standard
//!   deviation per measure
//!
//! Scores are keyed by measure and truncation length (`terms-010`,
//! `div-020`) so several `top` values can be reported side by side.

use crate::agreement::RankingSetAgreement;
use crate::errors::{ConsensusError, Result};
use crate::similarity::{AverageJaccard, RankingMetric};
use crate::types::{truncate_term_rankings, RankingSet, Term, TermRanking};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Measure name -> score
pub type Scores = BTreeMap<String, f64>;

fn score_key(prefix: &str, top: usize) -> String {
    format!("{prefix}-{top:03}")
}

/// Mean row of `x` for each of the `k` classes in `partition`.
///
/// `partition[i]` is the class of row `i`. Fails with
/// [`ConsensusError::DimensionMismatch`] when the partition does not cover
/// the rows of `x`, and [`ConsensusError::InvalidInput`] for a label `>= k`
/// or a class without rows.
pub fn build_centroids(x: &Array2<f64>, partition: &[usize], k: usize) -> Result<Array2<f64>> {
    if partition.len() != x.nrows() {
        return Err(ConsensusError::dimension_mismatch(
            (partition.len(), x.ncols()),
            x.dim(),
        ));
    }
    if let Some(label) = partition.iter().find(|&&label| label >= k) {
        return Err(ConsensusError::invalid_input(format!(
            "class label {label} out of range for {k} classes"
        )));
    }

    let mut centroids = Array2::zeros((k, x.ncols()));
    for (class, mut centroid) in centroids.rows_mut().into_iter().enumerate() {
        let members: Vec<usize> = partition
            .iter()
            .enumerate()
            .filter_map(|(row, &label)| (label == class).then_some(row))
            .collect();
        let mean = x
            .select(Axis(0), &members)
            .mean_axis(Axis(0))
            .ok_or_else(|| ConsensusError::invalid_input(format!("class {class} has no rows")))?;
        centroid.assign(&mean);
    }
    Ok(centroids)
}

/// Terms ordered by descending centroid weight, one ranking per centroid row.
///
/// Equal weights keep the order of `terms`.
fn rank_centroid_terms<T: Term>(centroids: &Array2<f64>, terms: &[T]) -> Result<RankingSet<T>> {
    if terms.len() != centroids.ncols() {
        return Err(ConsensusError::dimension_mismatch(
            (centroids.nrows(), terms.len()),
            centroids.dim(),
        ));
    }
    Ok(centroids
        .rows()
        .into_iter()
        .map(|centroid| {
            let mut order: Vec<usize> = (0..terms.len()).collect();
            order.sort_by(|&i, &j| centroid[j].total_cmp(&centroid[i]));
            order.into_iter().map(|i| terms[i].clone()).collect()
        })
        .collect())
}

/// Compares test rankings with rankings derived from ground-truth classes
#[derive(Debug, Clone)]
pub struct TermValidator<T, M = AverageJaccard> {
    agreement: RankingSetAgreement<M>,
    class_rankings: RankingSet<T>,
}

impl<T: Term> TermValidator<T, AverageJaccard> {
    /// Create a validator from one term ranking per ground-truth class.
    ///
    /// Fails with [`ConsensusError::EmptyInput`] when no class is given.
    pub fn new(class_rankings: RankingSet<T>) -> Result<Self> {
        Self::with_metric(class_rankings, AverageJaccard)
    }

    /// Create a validator whose class rankings order `terms` by each class
    /// centroid (one row per class, one column per term).
    pub fn from_centroids(centroids: &Array2<f64>, terms: &[T]) -> Result<Self> {
        Self::new(rank_centroid_terms(centroids, terms)?)
    }

    /// Create a validator from a document-term matrix and the ground-truth
    /// class of every document. Classes are numbered `0..=max(partition)`.
    pub fn from_partition(x: &Array2<f64>, partition: &[usize], terms: &[T]) -> Result<Self> {
        let k = partition.iter().max().map_or(0, |&label| label + 1);
        Self::from_centroids(&build_centroids(x, partition, k)?, terms)
    }
}

impl<T: Term, M: RankingMetric> TermValidator<T, M> {
    /// Create a validator with a custom metric
    pub fn with_metric(class_rankings: RankingSet<T>, metric: M) -> Result<Self> {
        if class_rankings.is_empty() {
            return Err(ConsensusError::empty_input(
                "term validation needs at least one class ranking",
            ));
        }
        Ok(Self {
            agreement: RankingSetAgreement::with_metric(metric),
            class_rankings,
        })
    }

    /// Ground-truth class rankings
    pub fn class_rankings(&self) -> &[TermRanking<T>] {
        &self.class_rankings
    }

    /// Agreement with the class rankings for each truncation length.
    ///
    /// Keys are `terms-%03d`.
    pub fn evaluate(&self, test_rankings: &[TermRanking<T>], tops: &[usize]) -> Result<Scores> {
        let mut scores = Scores::new();
        for &top in tops {
            let classes = truncate_term_rankings(&self.class_rankings, top);
            let test = truncate_term_rankings(test_rankings, top);
            let sim = self.agreement.similarity(&classes, &test)?;
            scores.insert(score_key("terms", top), sim);
        }
        Ok(scores)
    }
}

/// Mean pairwise dissimilarity (`1 - similarity`) between the rankings of a set
#[derive(Debug, Clone, Default)]
pub struct DiversityValidator<M = AverageJaccard> {
    metric: M,
}

impl DiversityValidator<AverageJaccard> {
    /// Create a validator using [`AverageJaccard`]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: RankingMetric> DiversityValidator<M> {
    /// Create a validator with a custom metric
    pub fn with_metric(metric: M) -> Self {
        Self { metric }
    }

    /// Diversity for each truncation length. Keys are `div-%03d`.
    ///
    /// Fails with [`ConsensusError::InvalidInput`] for fewer than two rankings
    /// and [`ConsensusError::EmptyInput`] if any ranking is empty.
    pub fn evaluate<T: Term>(&self, test_rankings: &[TermRanking<T>], tops: &[usize]) -> Result<Scores> {
        let k = test_rankings.len();
        if k < 2 {
            return Err(ConsensusError::invalid_input(format!(
                "diversity needs at least two rankings, got {k}"
            )));
        }

        let mut scores = Scores::new();
        for &top in tops {
            let rankings = truncate_term_rankings(test_rankings, top);
            let mut total = 0.0;
            let mut pairs = 0usize;
            for i in 0..k {
                for j in (i + 1)..k {
                    total += 1.0 - self.metric.checked_similarity(&rankings[i], &rankings[j])?;
                    pairs += 1;
                }
            }
            scores.insert(score_key("div", top), total / pairs as f64);
        }
        Ok(scores)
    }
}

/// Mean and standard deviation per measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateScores {
    /// Mean of each measure over the experiments that reported it
    pub mean: Scores,
    /// Population standard deviation of each measure
    pub std: Scores,
}

/// Scores of many experiments, keyed by experiment name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreCollection {
    scores: BTreeMap<String, Scores>,
    keys: BTreeSet<String>,
}

impl ScoreCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the scores of one experiment, replacing earlier scores under the
    /// same key
    pub fn add(&mut self, experiment: impl Into<String>, scores: Scores) {
        self.keys.extend(scores.keys().cloned());
        self.scores.insert(experiment.into(), scores);
    }

    /// Scores of one experiment
    pub fn get(&self, experiment: &str) -> Option<&Scores> {
        self.scores.get(experiment)
    }

    /// Every measure name seen so far, sorted
    pub fn score_keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Number of experiments recorded
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True if no experiment has been recorded
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Mean and population standard deviation of every measure.
    ///
    /// Returns `None` when the collection is empty.
    pub fn aggregate_scores(&self) -> Option<AggregateScores> {
        if self.scores.is_empty() {
            return None;
        }
        let mut mean = Scores::new();
        let mut std = Scores::new();
        for key in &self.keys {
            let values: Vec<f64> = self
                .scores
                .values()
                .filter_map(|scores| scores.get(key).copied())
                .collect();
            let n = values.len() as f64;
            let m = values.iter().sum::<f64>() / n;
            let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n;
            mean.insert(key.clone(), m);
            std.insert(key.clone(), var.sqrt());
        }
        Some(AggregateScores { mean, std })
    }
}
