//! Similarity metrics between two term rankings
//!
//! - [`JaccardBinary`]: set overlap, ignores rank positions
//! - [`AverageJaccard`]: mean Jaccard over every common prefix length, so
//!   agreement near the top of the rankings counts more than agreement deep
//!   in the list
//!
//! Both metrics are symmetric and bounded to `[0, 1]`.

use crate::errors::{ConsensusError, Result};
use crate::types::Term;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A similarity measure between two term rankings.
pub trait RankingMetric {
    /// Similarity in `[0, 1]`.
    ///
    /// Empty rankings have similarity 0.0.
    fn similarity<T: Term>(&self, a: &[T], b: &[T]) -> f64;

    /// Like [`similarity`](Self::similarity), but fails with
    /// [`ConsensusError::EmptyInput`] if either ranking is empty.
    fn checked_similarity<T: Term>(&self, a: &[T], b: &[T]) -> Result<f64> {
        if a.is_empty() || b.is_empty() {
            return Err(ConsensusError::empty_input(
                "cannot compare an empty term ranking",
            ));
        }
        Ok(self.similarity(a, b))
    }

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Binary Jaccard similarity, which ignores rank positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JaccardBinary;

impl RankingMetric for JaccardBinary {
    fn similarity<T: Term>(&self, a: &[T], b: &[T]) -> f64 {
        let sa: FxHashSet<&T> = a.iter().collect();
        let sb: FxHashSet<&T> = b.iter().collect();
        let intersection = sa.intersection(&sb).count();
        if intersection == 0 {
            return 0.0;
        }
        let union = sa.len() + sb.len() - intersection;
        intersection as f64 / union as f64
    }

    fn name(&self) -> &'static str {
        "JaccardBinary"
    }
}

/// Top-weighted Jaccard similarity (average overlap over prefixes).
///
/// For `k = min(|a|, |b|)` this is the mean of `JaccardBinary(a[..i], b[..i])`
/// for `i` in `1..=k`. Prefix overlaps are maintained incrementally, so the
/// cost is `O(k)` rather than `O(k^2)`. Like `JaccardBinary`, prefixes are
/// compared as sets: a repeated term counts once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AverageJaccard;

impl RankingMetric for AverageJaccard {
    fn similarity<T: Term>(&self, a: &[T], b: &[T]) -> f64 {
        let k = a.len().min(b.len());
        if k == 0 {
            return 0.0;
        }

        let mut seen_a: FxHashSet<&T> = FxHashSet::default();
        let mut seen_b: FxHashSet<&T> = FxHashSet::default();
        seen_a.reserve(k);
        seen_b.reserve(k);

        let mut intersection = 0usize;
        let mut total = 0.0;
        for (x, y) in a.iter().zip(b) {
            if seen_a.insert(x) && seen_b.contains(x) {
                intersection += 1;
            }
            if seen_b.insert(y) && seen_a.contains(y) {
                intersection += 1;
            }
            if intersection > 0 {
                let union = seen_a.len() + seen_b.len() - intersection;
                total += intersection as f64 / union as f64;
            }
        }
        total / k as f64
    }

    fn name(&self) -> &'static str {
        "AverageJaccard"
    }
}

/// Metric selector, chosen at construction time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// [`JaccardBinary`]
    JaccardBinary,
    /// [`AverageJaccard`]
    #[default]
    AverageJaccard,
}

impl RankingMetric for MetricKind {
    #[inline]
    fn similarity<T: Term>(&self, a: &[T], b: &[T]) -> f64 {
        match self {
            MetricKind::JaccardBinary => JaccardBinary.similarity(a, b),
            MetricKind::AverageJaccard => AverageJaccard.similarity(a, b),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MetricKind::JaccardBinary => JaccardBinary.name(),
            MetricKind::AverageJaccard => AverageJaccard.name(),
        }
    }
}

impl MetricKind {
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "jaccard" | "jaccard_binary" | "jaccardbinary" => Some(MetricKind::JaccardBinary),
            "average_jaccard" | "averagejaccard" | "aj" => Some(MetricKind::AverageJaccard),
            _ => None,
        }
    }
}

impl std::str::FromStr for MetricKind {
    type Err = ConsensusError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        MetricKind::parse(value)
            .ok_or_else(|| ConsensusError::invalid_config(format!("unknown metric '{value}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaccard_binary() {
        let sim = JaccardBinary.similarity(&["a", "b", "c"], &["b", "c", "d"]);
        assert!((sim - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_jaccard_binary_ignores_order() {
        let sim = JaccardBinary.similarity(&["a", "b", "c"], &["c", "b", "a"]);
        assert!((sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_jaccard_binary_disjoint_and_empty() {
        assert_eq!(JaccardBinary.similarity(&["a"], &["b"]), 0.0);
        let empty: [&str; 0] = [];
        assert_eq!(JaccardBinary.similarity(&empty, &["b"]), 0.0);
        assert_eq!(JaccardBinary.similarity(&empty, &empty), 0.0);
    }

    #[test]
    fn test_average_jaccard_identical() {
        let r = ["a", "b", "c", "d"];
        assert!((AverageJaccard.similarity(&r, &r) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_jaccard_rewards_early_agreement() {
        // Same sets, reversed order: full credit only at the last prefix.
        let sim = AverageJaccard.similarity(&["a", "b", "c"], &["c", "b", "a"]);
        // prefixes: {a}/{c} = 0, {a,b}/{c,b} = 1/3, full = 1
        let expected = (0.0 + 1.0 / 3.0 + 1.0) / 3.0;
        assert!((sim - expected).abs() < 1e-12);

        let early = AverageJaccard.similarity(&["a", "b", "x"], &["a", "b", "y"]);
        let late = AverageJaccard.similarity(&["x", "a", "b"], &["y", "b", "a"]);
        assert!(early > late);
    }

    #[test]
    fn test_average_jaccard_uses_shorter_length() {
        // k = 2: {a}/{a} = 1, {a,b}/{a,b} = 1
        let sim = AverageJaccard.similarity(&["a", "b", "c", "d"], &["a", "b"]);
        assert!((sim - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_jaccard_repeated_terms() {
        // prefixes: {x}/{x} = 1, {x,y}/{x,z} = 1/3, {x,y}/{x,z,w} = 1/4
        let sim = AverageJaccard.similarity(&["x", "y", "x"], &["x", "z", "w"]);
        let expected = (1.0 + 1.0 / 3.0 + 1.0 / 4.0) / 3.0;
        assert!((sim - expected).abs() < 1e-12);

        let sim = AverageJaccard.similarity(&["x", "x"], &["x", "x"]);
        assert!((sim - 1.0).abs() < 1e-12);

        let sim = AverageJaccard.similarity(&["x", "y", "y"], &["y", "x", "x"]);
        assert!((sim - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_jaccard_empty() {
        let empty: [u32; 0] = [];
        assert_eq!(AverageJaccard.similarity(&empty, &[1, 2]), 0.0);
        let err = AverageJaccard.checked_similarity(&empty, &[1, 2]).unwrap_err();
        assert!(err.is_empty_input());
    }

    #[test]
    fn test_metric_kind_dispatch() {
        let a = ["a", "b", "c"];
        let b = ["c", "b", "a"];
        assert_eq!(
            MetricKind::JaccardBinary.similarity(&a, &b),
            JaccardBinary.similarity(&a, &b)
        );
        assert_eq!(
            MetricKind::AverageJaccard.similarity(&a, &b),
            AverageJaccard.similarity(&a, &b)
        );
        assert_eq!(MetricKind::default(), MetricKind::AverageJaccard);
    }

    #[test]
    fn test_metric_kind_from_str() {
        assert_eq!("jaccard".parse::<MetricKind>().unwrap(), MetricKind::JaccardBinary);
        assert_eq!(
            "Average_Jaccard".parse::<MetricKind>().unwrap(),
            MetricKind::AverageJaccard
        );
        assert!("cosine".parse::<MetricKind>().is_err());
    }
}
