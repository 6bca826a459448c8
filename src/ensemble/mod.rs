//! Ensemble consensus
//!
//! - [`EnsembleRanking`]: relevance-weighted votes for one topic
//! - [`TopicEnsemble`]: aligns whole runs with a reference and routes each
//!   ranking into the right accumulator

pub mod ranking;
pub mod topic;

pub use ranking::EnsembleRanking;
pub use topic::TopicEnsemble;
