//! Topic stability across model runs
//!
//! Each run is compared with a reference run by [`RankingSetAgreement`] after
//! truncating every ranking to the top terms. A stable model produces runs
//! whose topics agree closely with the reference.

use crate::agreement::RankingSetAgreement;
use crate::errors::{ConsensusError, Result};
use crate::types::{truncate_term_rankings, RankingSet, StabilityConfig, Term, TermRanking};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Agreement of every run with the reference, plus summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityReport {
    /// Agreement score of each run, in input order
    pub scores: Vec<f64>,
    /// Mean agreement
    pub mean: f64,
    /// Lowest agreement
    pub min: f64,
    /// Highest agreement
    pub max: f64,
}

impl StabilityReport {
    fn from_scores(scores: Vec<f64>) -> Result<Self> {
        if scores.is_empty() {
            return Err(ConsensusError::empty_input(
                "stability needs at least one run besides the reference",
            ));
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self {
            scores,
            mean,
            min,
            max,
        })
    }

    /// Number of runs compared with the reference
    pub fn runs(&self) -> usize {
        self.scores.len()
    }
}

/// Compare every run in `others` with `reference`.
///
/// Fails with [`ConsensusError::EmptyInput`] when `others` is empty or any
/// ranking set is empty. The first failing run aborts the evaluation.
pub fn evaluate_stability<T>(
    reference: &[TermRanking<T>],
    others: &[RankingSet<T>],
    config: &StabilityConfig,
) -> Result<StabilityReport>
where
    T: Term + Send + Sync,
{
    trace_stage!("stability");

    let matcher = RankingSetAgreement::with_metric(config.metric);
    let reference = truncate_term_rankings(reference, config.top);
    let score_run = |run: &RankingSet<T>| -> Result<f64> {
        let run = truncate_term_rankings(run, config.top);
        matcher.similarity(&reference, &run)
    };

    let scores = if config.parallel {
        others.par_iter().map(score_run).collect::<Result<Vec<f64>>>()?
    } else {
        others.iter().map(score_run).collect::<Result<Vec<f64>>>()?
    };

    let report = StabilityReport::from_scores(scores)?;
    trace_debug!(
        runs = report.runs(),
        mean = report.mean,
        min = report.min,
        max = report.max,
        "stability evaluated"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(rankings: &[&[&str]]) -> RankingSet<String> {
        rankings
            .iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_identical_runs_are_fully_stable() {
        let reference = set(&[&["a", "b", "c"], &["x", "y", "z"]]);
        let others = vec![reference.clone(), set(&[&["x", "y", "z"], &["a", "b", "c"]])];
        let report = evaluate_stability(&reference, &others, &StabilityConfig::default()).unwrap();
        assert_eq!(report.runs(), 2);
        assert!((report.mean - 1.0).abs() < 1e-12);
        assert!((report.min - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_statistics() {
        let reference = set(&[&["a", "b"]]);
        let others = vec![set(&[&["a", "b"]]), set(&[&["c", "d"]])];
        let config = StabilityConfig::default().with_parallel(false);
        let report = evaluate_stability(&reference, &others, &config).unwrap();
        assert_eq!(report.scores, vec![1.0, 0.0]);
        assert!((report.mean - 0.5).abs() < 1e-12);
        assert_eq!(report.min, 0.0);
        assert_eq!(report.max, 1.0);
    }

    #[test]
    fn test_truncation_applies() {
        let reference = set(&[&["a", "b", "x"]]);
        let others = vec![set(&[&["a", "b", "y"]])];
        let truncated = evaluate_stability(
            &reference,
            &others,
            &StabilityConfig::default().with_top(2),
        )
        .unwrap();
        assert!((truncated.mean - 1.0).abs() < 1e-12);

        let full = evaluate_stability(
            &reference,
            &others,
            &StabilityConfig::default().with_top(0),
        )
        .unwrap();
        assert!(full.mean < 1.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let reference = set(&[&["a", "b", "c"], &["d", "e", "f"]]);
        let others = vec![
            set(&[&["b", "a", "q"], &["e", "d", "f"]]),
            set(&[&["f", "e", "d"], &["c", "a", "b"]]),
            set(&[&["z", "y", "x"]]),
        ];
        let par = evaluate_stability(&reference, &others, &StabilityConfig::default()).unwrap();
        let seq = evaluate_stability(
            &reference,
            &others,
            &StabilityConfig::default().with_parallel(false),
        )
        .unwrap();
        assert_eq!(par, seq);
    }

    #[test]
    fn test_no_runs_fails() {
        let reference = set(&[&["a"]]);
        let err = evaluate_stability::<String>(&reference, &[], &StabilityConfig::default())
            .unwrap_err();
        assert!(err.is_empty_input());
    }

    #[test]
    fn test_empty_run_fails() {
        let reference = set(&[&["a"]]);
        let others = vec![Vec::new()];
        assert!(evaluate_stability(&reference, &others, &StabilityConfig::default()).is_err());
    }

    #[test]
    fn test_empty_ranking_in_run_fails() {
        let reference = set(&[&["a", "b"], &["c", "d"]]);
        let others = vec![reference.clone(), set(&[&["a", "b"], &[]])];
        for parallel in [true, false] {
            let config = StabilityConfig::default().with_parallel(parallel);
            let err = evaluate_stability(&reference, &others, &config).unwrap_err();
            assert!(err.is_empty_input());
        }
    }
}
