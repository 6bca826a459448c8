//! Relevance-weighted vote accumulator for one consensus ranking

use crate::relevance::{RelevanceFunction, RelevanceKind};
use crate::types::{RankedTerm, Term, TermRanking};
use rustc_hash::FxHashMap;

/// Accumulates relevance-weighted votes for terms across repeated
/// observations of rankings that describe the same topic.
///
/// A term at 0-indexed position `i` of an observed ranking receives
/// `relevance(i + 1)`. Normalized scores divide the accumulated weight by the
/// number of observations, so a term ranked first under [`Uniform`]
/// relevance in every observation scores exactly 1.0.
///
/// [`Uniform`]: crate::relevance::Uniform
#[derive(Debug, Clone)]
pub struct EnsembleRanking<T, R = RelevanceKind> {
    relevance: R,
    /// Maps term -> index into `weights`
    index: FxHashMap<T, usize>,
    /// `(term, accumulated weight)` in first-appearance order
    weights: Vec<(T, f64)>,
    runs: usize,
}

impl<T: Term, R: RelevanceFunction> EnsembleRanking<T, R> {
    /// Create an empty accumulator
    pub fn new(relevance: R) -> Self {
        Self {
            relevance,
            index: FxHashMap::default(),
            weights: Vec::new(),
            runs: 0,
        }
    }

    /// Fold one observed ranking into the accumulator
    pub fn add(&mut self, ranking: &[T]) {
        for (position, term) in ranking.iter().enumerate() {
            let weight = self.relevance.weight(position);
            match self.index.get(term) {
                Some(&idx) => self.weights[idx].1 += weight,
                None => {
                    self.index.insert(term.clone(), self.weights.len());
                    self.weights.push((term.clone(), weight));
                }
            }
        }
        self.runs += 1;
    }

    /// Terms sorted by accumulated weight, highest first.
    ///
    /// Ties keep first-appearance order. `top == 0` returns every term. With
    /// `include_weights`, each entry carries its weight divided by the number
    /// of observations.
    pub fn build_ranking(&self, top: usize, include_weights: bool) -> Vec<RankedTerm<T>> {
        let mut order: Vec<&(T, f64)> = self.weights.iter().collect();
        // sort_by is stable, so equal weights keep first-appearance order
        order.sort_by(|a, b| b.1.total_cmp(&a.1));

        let limit = if top == 0 { order.len() } else { top.min(order.len()) };
        order
            .into_iter()
            .take(limit)
            .map(|(term, weight)| {
                if include_weights {
                    RankedTerm::weighted(term.clone(), self.normalize(*weight))
                } else {
                    RankedTerm::new(term.clone())
                }
            })
            .collect()
    }

    /// Like [`build_ranking`](Self::build_ranking) without weights, returning
    /// bare terms
    pub fn build_terms(&self, top: usize) -> TermRanking<T> {
        self.build_ranking(top, false)
            .into_iter()
            .map(|entry| entry.term)
            .collect()
    }

    /// Accumulated weight of `term` divided by the number of observations.
    ///
    /// 0.0 if the term was never observed.
    pub fn get_score(&self, term: &T) -> f64 {
        self.index
            .get(term)
            .map_or(0.0, |&idx| self.normalize(self.weights[idx].1))
    }

    /// Raw accumulated weight of `term`
    pub fn weight(&self, term: &T) -> f64 {
        self.index.get(term).map_or(0.0, |&idx| self.weights[idx].1)
    }

    /// Number of distinct terms observed
    pub fn term_count(&self) -> usize {
        self.weights.len()
    }

    /// Distinct terms in first-appearance order
    pub fn terms(&self) -> impl Iterator<Item = &T> {
        self.weights.iter().map(|(term, _)| term)
    }

    /// Number of rankings folded in
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// The relevance function in use
    pub fn relevance(&self) -> &R {
        &self.relevance
    }

    fn normalize(&self, weight: f64) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            weight / self.runs as f64
        }
    }
}

impl<T: Term> Default for EnsembleRanking<T, RelevanceKind> {
    fn default() -> Self {
        Self::new(RelevanceKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relevance::{ReciprocalRank, Uniform};

    #[test]
    fn test_uniform_rank_one_scores_one() {
        let mut er = EnsembleRanking::new(Uniform);
        for _ in 0..5 {
            er.add(&["t", "u"]);
        }
        assert_eq!(er.runs(), 5);
        assert!((er.get_score(&"t") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_reciprocal_weights() {
        let mut er = EnsembleRanking::new(ReciprocalRank);
        er.add(&["a", "b", "c"]);
        er.add(&["b", "a"]);
        // a: 1 + 1/2, b: 1/2 + 1, c: 1/3
        assert!((er.weight(&"a") - 1.5).abs() < 1e-12);
        assert!((er.weight(&"b") - 1.5).abs() < 1e-12);
        assert!((er.get_score(&"c") - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(er.get_score(&"z"), 0.0);
        assert_eq!(er.term_count(), 3);
    }

    #[test]
    fn test_build_ranking_ties_keep_first_appearance() {
        let mut er = EnsembleRanking::new(ReciprocalRank);
        er.add(&["a", "b", "c"]);
        er.add(&["b", "a"]);
        // a and b tie at 1.5; a appeared first
        assert_eq!(er.build_terms(0), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_build_ranking_top() {
        let mut er = EnsembleRanking::new(ReciprocalRank);
        er.add(&["x", "y", "z"]);
        er.add(&["z", "y", "x"]);
        er.add(&["z", "x", "y"]);
        let top = er.build_terms(2);
        assert_eq!(top, vec!["z", "x"]);
        assert_eq!(er.build_terms(10).len(), 3);
    }

    #[test]
    fn test_build_ranking_with_weights() {
        let mut er = EnsembleRanking::new(Uniform);
        er.add(&["a", "b"]);
        er.add(&["a"]);
        let ranking = er.build_ranking(0, true);
        assert_eq!(ranking[0], RankedTerm::weighted("a", 1.0));
        assert_eq!(ranking[1], RankedTerm::weighted("b", 0.5));

        let plain = er.build_ranking(0, false);
        assert!(plain.iter().all(|entry| entry.weight.is_none()));
    }

    #[test]
    fn test_empty_accumulator() {
        let er: EnsembleRanking<&str> = EnsembleRanking::default();
        assert_eq!(er.runs(), 0);
        assert_eq!(er.get_score(&"a"), 0.0);
        assert!(er.build_ranking(5, true).is_empty());
        assert_eq!(er.terms().count(), 0);
    }
}
