//! # topic_consensus
//!
//! Alignment, agreement and consensus for term rankings produced by repeated
//! topic-model runs.
//!
//! Topic indices are not comparable between runs, so two ranking sets are
//! aligned with an optimal one-to-one matching (Hungarian algorithm) over a
//! rank-sensitive similarity matrix (`ndarray::Array2<f64>`). The same
//! alignment drives:
//!
//! - **Agreement**: mean similarity over matched topics ([`RankingSetAgreement`])
//! - **Stability**: agreement of many runs with a reference run
//!   ([`evaluate_stability`])
//! - **Consensus**: relevance-weighted voting over aligned rankings
//!   ([`TopicEnsemble`])
//!
//! ```rust
//! use topic_consensus::{RelevanceKind, TopicEnsemble};
//!
//! let mut ensemble = TopicEnsemble::new(RelevanceKind::ReciprocalRank);
//! ensemble.add(&[vec!["a", "b", "c"], vec!["x", "y", "z"]], None).unwrap();
//! ensemble.add(&[vec!["y", "x", "w"], vec!["b", "a", "d"]], None).unwrap();
//!
//! let consensus = ensemble.consensus_terms(3).unwrap();
//! assert_eq!(consensus[0], vec!["a", "b", "c"]);
//! ```

// ---------------------------------------------------------------------------
// Conditional tracing support
// ---------------------------------------------------------------------------

/// Enter a tracing span for a processing stage (when the `tracing` feature is
/// enabled). When disabled, this is a no-op and the compiler eliminates it.
macro_rules! trace_stage {
    ($name:expr) => {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("consensus_stage", stage = $name).entered();
    };
}

/// Emit a debug event (when the `tracing` feature is enabled).
macro_rules! trace_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        tracing::debug!($($arg)*);
    };
}

pub mod agreement;
pub mod ensemble;
pub mod errors;
pub mod matching;
pub mod relevance;
pub mod similarity;
pub mod stability;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use errors::{ConsensusError, Result};
pub use types::{
    calc_relevance_scores, term_rankings_size, truncate_term_rankings, EnsembleConfig, MatchPair,
    RankedTerm, RankingSet, StabilityConfig, Term, TermRanking,
};

// Re-export main functionality
pub use agreement::{Agreement, RankingSetAgreement};
pub use ensemble::{EnsembleRanking, TopicEnsemble};
pub use matching::{solve_assignment, Hungarian};
pub use relevance::{LogDiscount, ReciprocalRank, RelevanceFunction, RelevanceKind, Uniform};
pub use similarity::{AverageJaccard, JaccardBinary, MetricKind, RankingMetric};
pub use stability::{evaluate_stability, StabilityReport};
pub use validation::{
    build_centroids, AggregateScores, DiversityValidator, ScoreCollection, Scores, TermValidator,
};

// Similarity and cost matrices are `ndarray::Array2<f64>`
pub use ndarray;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
