//! Rank relevance functions
//!
//! A relevance function maps a 1-indexed rank to the vote weight a term at
//! that rank contributes to an [`EnsembleRanking`](crate::ensemble::EnsembleRanking).

use crate::errors::{ConsensusError, Result};
use serde::{Deserialize, Serialize};

/// Converts a rank position into a weight.
///
/// Non-uniform implementations are strictly decreasing in rank.
pub trait RelevanceFunction {
    /// Weight for a 0-indexed position (rank = `position + 1`).
    fn weight(&self, position: usize) -> f64;

    /// Weight for a 1-indexed rank.
    ///
    /// Fails with [`ConsensusError::InvalidInput`] when `rank < 1`.
    fn relevance(&self, rank: usize) -> Result<f64> {
        if rank < 1 {
            return Err(ConsensusError::invalid_input(
                "rank is 1-indexed and must be >= 1",
            ));
        }
        Ok(self.weight(rank - 1))
    }
}

/// Every position contributes 1.0 (plain frequency voting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Uniform;

impl RelevanceFunction for Uniform {
    #[inline]
    fn weight(&self, _position: usize) -> f64 {
        1.0
    }
}

/// `1 / rank`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReciprocalRank;

impl RelevanceFunction for ReciprocalRank {
    #[inline]
    fn weight(&self, position: usize) -> f64 {
        1.0 / (position + 1) as f64
    }
}

/// DCG-style discount: `1 / log_base(rank + 1)`
///
/// The base is always finite and greater than 1, also when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LogDiscountParams", into = "LogDiscountParams")]
pub struct LogDiscount {
    base: f64,
}

#[derive(Serialize, Deserialize)]
struct LogDiscountParams {
    base: f64,
}

impl TryFrom<LogDiscountParams> for LogDiscount {
    type Error = ConsensusError;

    fn try_from(params: LogDiscountParams) -> Result<Self> {
        LogDiscount::new(params.base)
    }
}

impl From<LogDiscount> for LogDiscountParams {
    fn from(value: LogDiscount) -> Self {
        Self { base: value.base }
    }
}

impl Default for LogDiscount {
    fn default() -> Self {
        Self { base: 2.0 }
    }
}

impl LogDiscount {
    /// Create a log discount with the given base.
    ///
    /// The base must be finite and greater than 1.
    pub fn new(base: f64) -> Result<Self> {
        validate_log_base(base)?;
        Ok(Self { base })
    }

    /// The logarithm base
    pub fn base(&self) -> f64 {
        self.base
    }
}

impl RelevanceFunction for LogDiscount {
    #[inline]
    fn weight(&self, position: usize) -> f64 {
        // rank + 1 == position + 2
        self.base.ln() / ((position + 2) as f64).ln()
    }
}

fn validate_log_base(base: f64) -> Result<()> {
    if !base.is_finite() || base <= 1.0 {
        return Err(ConsensusError::invalid_input(format!(
            "log discount base must be finite and > 1, got {base}"
        )));
    }
    Ok(())
}

/// Relevance function selector, chosen at construction time
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceKind {
    /// [`Uniform`]
    Uniform,
    /// [`ReciprocalRank`]
    #[default]
    ReciprocalRank,
    /// [`LogDiscount`]
    LogDiscount(LogDiscount),
}

impl RelevanceKind {
    /// Log discount with the conventional base 2
    pub fn log2() -> Self {
        RelevanceKind::LogDiscount(LogDiscount::default())
    }

    /// Log discount with a custom base.
    ///
    /// Fails with [`ConsensusError::InvalidInput`] unless the base is finite
    /// and greater than 1.
    pub fn log_discount(base: f64) -> Result<Self> {
        LogDiscount::new(base).map(RelevanceKind::LogDiscount)
    }
}

impl RelevanceFunction for RelevanceKind {
    #[inline]
    fn weight(&self, position: usize) -> f64 {
        match self {
            RelevanceKind::Uniform => Uniform.weight(position),
            RelevanceKind::ReciprocalRank => ReciprocalRank.weight(position),
            RelevanceKind::LogDiscount(log) => log.weight(position),
        }
    }
}

impl From<LogDiscount> for RelevanceKind {
    fn from(value: LogDiscount) -> Self {
        RelevanceKind::LogDiscount(value)
    }
}

impl std::fmt::Display for RelevanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelevanceKind::Uniform => write!(f, "Uniform"),
            RelevanceKind::ReciprocalRank => write!(f, "ReciprocalRank"),
            RelevanceKind::LogDiscount(log) => write!(f, "LogDiscount(base={})", log.base),
        }
    }
}
