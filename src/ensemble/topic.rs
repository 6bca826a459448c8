//! Consensus topics across many model runs
//!
//! A [`TopicEnsemble`] starts uninitialized. The first ranking set it sees is
//! frozen as the reference and seeds one [`EnsembleRanking`] per reference
//! topic. Every later ranking set is aligned with the reference through
//! [`RankingSetAgreement`], and each matched ranking is folded into the
//! accumulator of the reference topic it was matched to. Topics left
//! unmatched (only possible when set sizes differ) are ignored.

use super::ranking::EnsembleRanking;
use crate::agreement::{Agreement, RankingSetAgreement};
use crate::errors::{ConsensusError, Result};
use crate::relevance::{RelevanceFunction, RelevanceKind};
use crate::similarity::MetricKind;
use crate::types::{EnsembleConfig, RankedTerm, RankingSet, Term, TermRanking};

/// Folds successive ranking sets into one consensus ranking set
#[derive(Debug, Clone)]
pub struct TopicEnsemble<T, R = RelevanceKind> {
    matcher: RankingSetAgreement<MetricKind>,
    relevance: R,
    reference: Option<RankingSet<T>>,
    rankings: Vec<EnsembleRanking<T, R>>,
    consistency: Vec<f64>,
    partitions: Vec<Vec<usize>>,
    runs: usize,
    top: usize,
    include_weights: bool,
}

impl<T: Term> TopicEnsemble<T, RelevanceKind> {
    /// Create an ensemble from a configuration.
    ///
    /// `config.top` and `config.include_weights` drive
    /// [`build_configured_rankings`](Self::build_configured_rankings).
    pub fn with_config(config: &EnsembleConfig) -> Self {
        let mut ensemble = Self::with_metric(config.metric, config.relevance);
        ensemble.top = config.top;
        ensemble.include_weights = config.include_weights;
        ensemble
    }
}

impl<T: Term> Default for TopicEnsemble<T, RelevanceKind> {
    fn default() -> Self {
        Self::new(RelevanceKind::default())
    }
}

impl<T: Term, R: RelevanceFunction + Clone> TopicEnsemble<T, R> {
    /// Create an ensemble aligning runs with [`AverageJaccard`](crate::similarity::AverageJaccard)
    pub fn new(relevance: R) -> Self {
        Self::with_metric(MetricKind::AverageJaccard, relevance)
    }

    /// Create an ensemble with an explicit alignment metric.
    ///
    /// Output settings are those of [`EnsembleConfig::default`].
    pub fn with_metric(metric: MetricKind, relevance: R) -> Self {
        let defaults = EnsembleConfig::default();
        Self {
            matcher: RankingSetAgreement::with_metric(metric),
            relevance,
            reference: None,
            rankings: Vec::new(),
            consistency: Vec::new(),
            partitions: Vec::new(),
            runs: 0,
            top: defaults.top,
            include_weights: defaults.include_weights,
        }
    }

    /// Fold in the ranking set of one model run.
    ///
    /// The first call adopts `rankings` as the reference and returns `None`.
    /// Later calls return the [`Agreement`] used to align `rankings` with the
    /// reference. The optional document partition is retained for
    /// document-level collaborators and does not influence ranking fusion.
    ///
    /// Fails with [`ConsensusError::EmptyInput`] for an empty ranking set or
    /// a set holding an empty ranking; the ensemble is left unchanged.
    pub fn add(
        &mut self,
        rankings: &[TermRanking<T>],
        partition: Option<&[usize]>,
    ) -> Result<Option<Agreement>> {
        trace_stage!("topic_ensemble_add");
        if rankings.is_empty() {
            return Err(ConsensusError::empty_input(
                "cannot add an empty ranking set to a topic ensemble",
            ));
        }
        if let Some(topic) = rankings.iter().position(|ranking| ranking.is_empty()) {
            return Err(ConsensusError::empty_input(format!(
                "topic {topic} has an empty term ranking"
            )));
        }

        let agreement = match &self.reference {
            None => {
                self.rankings = rankings
                    .iter()
                    .map(|ranking| {
                        let mut er = EnsembleRanking::new(self.relevance.clone());
                        er.add(ranking);
                        er
                    })
                    .collect();
                self.consistency = vec![0.0; rankings.len()];
                self.reference = Some(rankings.to_vec());
                trace_debug!(topics = rankings.len(), "topic ensemble reference set");
                None
            }
            Some(reference) => {
                let agreement = self.matcher.compare(reference, rankings)?;
                for &(reference_topic, other_topic) in &agreement.matching {
                    self.consistency[reference_topic] +=
                        agreement.similarity[[reference_topic, other_topic]];
                    self.rankings[reference_topic].add(&rankings[other_topic]);
                }
                trace_debug!(
                    run = self.runs + 1,
                    score = agreement.score,
                    "aligned ranking set with reference"
                );
                Some(agreement)
            }
        };

        if let Some(partition) = partition {
            self.partitions.push(partition.to_vec());
        }
        self.runs += 1;
        Ok(agreement)
    }

    /// Consensus ranking for every reference topic.
    ///
    /// `top == 0` keeps every term. Fails with
    /// [`ConsensusError::UninitializedEnsemble`] before the first
    /// [`add`](Self::add).
    pub fn build_rankings(
        &self,
        top: usize,
        include_weights: bool,
    ) -> Result<Vec<Vec<RankedTerm<T>>>> {
        self.ensure_initialized()?;
        Ok(self
            .rankings
            .iter()
            .map(|er| er.build_ranking(top, include_weights))
            .collect())
    }

    /// [`build_rankings`](Self::build_rankings) with the `top` and
    /// `include_weights` settings the ensemble was configured with
    pub fn build_configured_rankings(&self) -> Result<Vec<Vec<RankedTerm<T>>>> {
        self.build_rankings(self.top, self.include_weights)
    }

    /// Consensus ranking set with bare terms
    pub fn consensus_terms(&self, top: usize) -> Result<RankingSet<T>> {
        self.ensure_initialized()?;
        Ok(self.rankings.iter().map(|er| er.build_terms(top)).collect())
    }

    /// The frozen reference ranking set, once initialized
    pub fn reference(&self) -> Option<&RankingSet<T>> {
        self.reference.as_ref()
    }

    /// Per-topic accumulators, index-aligned with the reference
    pub fn ensemble_rankings(&self) -> &[EnsembleRanking<T, R>] {
        &self.rankings
    }

    /// Per-topic sums of matched similarities against the reference
    pub fn consistency(&self) -> &[f64] {
        &self.consistency
    }

    /// Per-topic consistency averaged over the aligned (non-reference) runs.
    ///
    /// All zeros while only the reference has been added.
    pub fn mean_consistency(&self) -> Vec<f64> {
        let aligned = self.runs.saturating_sub(1);
        if aligned == 0 {
            return vec![0.0; self.consistency.len()];
        }
        self.consistency
            .iter()
            .map(|sum| sum / aligned as f64)
            .collect()
    }

    /// Partitions supplied alongside the ranking sets, in insertion order
    pub fn partitions(&self) -> &[Vec<usize>] {
        &self.partitions
    }

    /// Number of topics in the reference (0 before initialization)
    pub fn num_topics(&self) -> usize {
        self.rankings.len()
    }

    /// Number of ranking sets folded in, including the reference
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// True once a reference has been adopted
    pub fn is_initialized(&self) -> bool {
        self.reference.is_some()
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(ConsensusError::UninitializedEnsemble)
        }
    }
}
