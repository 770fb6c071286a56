//! Criterion benchmarks for u-optprob problem operations.
//!
//! Uses synthetic OneMax and Sphere landscapes to measure the cost of the
//! problem machinery independent of any real fitness function.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_optprob::prelude::*;

type OneMax = CustomFitness<fn(&[usize]) -> f64>;

fn one_max(x: &[usize]) -> f64 {
    x.iter().sum::<usize>() as f64
}

fn one_max_problem(length: usize, fast: bool) -> DiscreteProblem<OneMax> {
    let f = CustomFitness::new(one_max as fn(&[usize]) -> f64, ProblemType::Discrete);
    let config = DiscreteConfig::default()
        .with_length(length)
        .with_fast_mimic(fast);
    DiscreteProblem::new(f, config).unwrap()
}

// ===========================================================================
// MIMIC model fitting: fast vs slow mutual information
// ===========================================================================

fn bench_mimic_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("mimic_fit");
    group.sample_size(10);

    for length in [20usize, 50, 100] {
        for fast in [true, false] {
            let mut problem = one_max_problem(length, fast);
            let mut rng = create_rng(42);
            problem.random_pop(200, &mut rng).unwrap();
            problem.find_top_pct(0.2).unwrap();

            let label = if fast { "fast" } else { "slow" };
            group.bench_with_input(BenchmarkId::new(label, length), &length, |b, _| {
                b.iter(|| {
                    problem.eval_node_probs().unwrap();
                    black_box(problem.node_probs().map(|t| t.len()))
                })
            });
        }
    }
    group.finish();
}

fn bench_mimic_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("mimic_sample");
    group.sample_size(10);

    for length in [20usize, 100] {
        let mut problem = one_max_problem(length, true);
        let mut rng = create_rng(42);
        problem.random_pop(200, &mut rng).unwrap();
        problem.find_top_pct(0.2).unwrap();
        problem.eval_node_probs().unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(length), &length, |b, _| {
            b.iter(|| black_box(problem.sample_pop(200, &mut rng).unwrap()))
        });
    }
    group.finish();
}

// ===========================================================================
// Neighborhoods
// ===========================================================================

fn bench_neighbors(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_neighbors");

    for length in [50usize, 200] {
        let mut discrete = one_max_problem(length, true);
        group.bench_with_input(BenchmarkId::new("discrete", length), &length, |b, _| {
            b.iter(|| {
                discrete.find_neighbors();
                black_box(discrete.best_neighbor().map(|s| s.len()))
            })
        });

        let sphere = CustomFitness::new(
            |x: &[f64]| x.iter().map(|v| v * v).sum::<f64>(),
            ProblemType::Continuous,
        );
        let config = ContinuousConfig::default()
            .with_length(length)
            .with_bounds(-5.0, 5.0)
            .with_step(0.5)
            .with_maximize(false);
        let mut continuous = ContinuousProblem::new(sphere, config).unwrap();
        continuous.reset(&mut create_rng(42)).unwrap();
        group.bench_with_input(BenchmarkId::new("continuous", length), &length, |b, _| {
            b.iter(|| {
                continuous.find_neighbors();
                black_box(continuous.best_neighbor().map(|s| s.len()))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_mimic_fit, bench_mimic_sample, bench_neighbors);
criterion_main!(benches);
