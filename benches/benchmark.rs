//! Benchmarks for topic_consensus

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use topic_consensus::matching::matrix;
use topic_consensus::*;

/// Seeded ranking set: `topics` duplicate-free rankings of `terms` terms drawn
/// from a vocabulary of `vocab` ids
fn synthetic_set(topics: usize, terms: usize, vocab: usize, seed: u64) -> RankingSet<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..topics)
        .map(|_| {
            sample(&mut rng, vocab, terms)
                .into_iter()
                .map(|id| id as u32)
                .collect()
        })
        .collect()
}

fn benchmark_metrics(c: &mut Criterion) {
    let a = synthetic_set(1, 50, 500, 1).remove(0);
    let b = synthetic_set(1, 50, 500, 2).remove(0);

    c.bench_function("jaccard_binary_50", |bench| {
        bench.iter(|| JaccardBinary.similarity(black_box(&a), black_box(&b)))
    });
    c.bench_function("average_jaccard_50", |bench| {
        bench.iter(|| AverageJaccard.similarity(black_box(&a), black_box(&b)))
    });
}

fn benchmark_hungarian(c: &mut Criterion) {
    let mut group = c.benchmark_group("hungarian_by_size");
    for size in [10usize, 50, 100].iter() {
        let set_a = synthetic_set(*size, 10, 1000, 3);
        let set_b = synthetic_set(*size, 10, 1000, 4);
        let similarity = RankingSetAgreement::new()
            .build_matrix(&set_a, &set_b)
            .unwrap();
        let cost = matrix::to_cost(&similarity, Some(1.0));
        group.bench_with_input(BenchmarkId::from_parameter(size), &cost, |bench, cost| {
            bench.iter(|| solve_assignment(black_box(cost)))
        });
    }
    group.finish();
}

fn benchmark_agreement(c: &mut Criterion) {
    let reference = synthetic_set(20, 20, 400, 5);
    let run = synthetic_set(20, 20, 400, 6);
    let matcher = RankingSetAgreement::new();

    c.bench_function("agreement_20_topics", |bench| {
        bench.iter(|| matcher.similarity(black_box(&reference), black_box(&run)))
    });

    let reference = synthetic_set(100, 20, 2000, 7);
    let run = synthetic_set(100, 20, 2000, 8);
    c.bench_function("agreement_100_topics_parallel", |bench| {
        bench.iter(|| matcher.compare_parallel(black_box(&reference), black_box(&run)))
    });
}

fn benchmark_ensemble(c: &mut Criterion) {
    let runs: Vec<RankingSet<u32>> = (0..10)
        .map(|seed| synthetic_set(20, 20, 400, seed))
        .collect();

    c.bench_function("topic_ensemble_10_runs", |bench| {
        bench.iter(|| {
            let mut ensemble = TopicEnsemble::new(RelevanceKind::ReciprocalRank);
            for run in &runs {
                ensemble.add(black_box(run), None).unwrap();
            }
            ensemble.consensus_terms(10).unwrap()
        })
    });

    let reference = runs[0].clone();
    c.bench_function("stability_10_runs", |bench| {
        bench.iter(|| {
            evaluate_stability(
                &reference,
                black_box(&runs[1..]),
                &StabilityConfig::default(),
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_metrics,
    benchmark_hungarian,
    benchmark_agreement,
    benchmark_ensemble
);
criterion_main!(benches);
