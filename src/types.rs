//! Core types for topic_consensus
//!
//! This module defines the term ranking data model shared by every stage,
//! the ranking-set utilities, and the configuration structs.

use crate::relevance::{RelevanceFunction, RelevanceKind};
use crate::similarity::MetricKind;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

// ============================================================================
// Terms & Rankings
// ============================================================================

/// A term identifier.
///
/// Terms are compared for identity only; integer indices and strings both
/// qualify.
pub trait Term: Clone + Eq + Hash {}

impl<T: Clone + Eq + Hash> Term for T {}

/// Terms for one topic, most relevant first, without duplicates
pub type TermRanking<T> = Vec<T>;

/// One term ranking per topic discovered by a single model run.
///
/// The index of a ranking is its topic index within that run. Topic indices
/// of two different ranking sets are not comparable.
pub type RankingSet<T> = Vec<TermRanking<T>>;

/// A (row, col) pair from an assignment
pub type MatchPair = (usize, usize);

/// One entry of a consensus ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTerm<T> {
    /// The term
    pub term: T,
    /// Accumulated weight divided by the observation count, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl<T> RankedTerm<T> {
    /// Create an entry without a weight
    pub fn new(term: T) -> Self {
        Self { term, weight: None }
    }

    /// Create an entry carrying its normalized weight
    pub fn weighted(term: T, weight: f64) -> Self {
        Self {
            term,
            weight: Some(weight),
        }
    }
}

// ============================================================================
// Ranking Set Utilities
// ============================================================================

/// Number of terms covered by every ranking in the set (the shortest length).
///
/// Returns 0 for an empty set.
pub fn term_rankings_size<T>(rankings: &[TermRanking<T>]) -> usize {
    rankings.iter().map(Vec::len).min().unwrap_or(0)
}

/// Truncate every ranking in the set to at most `top` terms.
///
/// `top == 0` returns an unchanged copy.
pub fn truncate_term_rankings<T: Clone>(rankings: &[TermRanking<T>], top: usize) -> RankingSet<T> {
    if top == 0 {
        return rankings.to_vec();
    }
    rankings
        .iter()
        .map(|ranking| ranking[..ranking.len().min(top)].to_vec())
        .collect()
}

/// Relevance scores for ranks `1..=n` under `relevance`
pub fn calc_relevance_scores<R: RelevanceFunction + ?Sized>(n: usize, relevance: &R) -> Vec<f64> {
    (0..n).map(|position| relevance.weight(position)).collect()
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for building a [`TopicEnsemble`](crate::ensemble::TopicEnsemble)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Metric used to align incoming ranking sets with the reference
    pub metric: MetricKind,
    /// How a rank position is turned into a vote weight
    pub relevance: RelevanceKind,
    /// Number of terms per consensus ranking (0 = all)
    pub top: usize,
    /// Attach normalized weights to consensus rankings
    pub include_weights: bool,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            metric: MetricKind::AverageJaccard,
            relevance: RelevanceKind::ReciprocalRank,
            top: 10,
            include_weights: false,
        }
    }
}

impl EnsembleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the alignment metric
    pub fn with_metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    /// Builder method: set the relevance function
    pub fn with_relevance(mut self, relevance: RelevanceKind) -> Self {
        self.relevance = relevance;
        self
    }

    /// Builder method: set the consensus ranking length
    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    /// Builder method: attach weights to consensus rankings
    pub fn with_include_weights(mut self, include_weights: bool) -> Self {
        self.include_weights = include_weights;
        self
    }
}

/// Configuration for stability evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Truncate rankings to this many terms before comparing (0 = no truncation)
    pub top: usize,
    /// Metric used for ranking-set agreement
    pub metric: MetricKind,
    /// Compare runs against the reference in parallel
    pub parallel: bool,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            top: 20,
            metric: MetricKind::AverageJaccard,
            parallel: true,
        }
    }
}

impl StabilityConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the truncation length
    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    /// Builder method: set the agreement metric
    pub fn with_metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    /// Builder method: enable or disable parallel comparison
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
