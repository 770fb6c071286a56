//! Property-based tests for u-optprob
//!
//! Uses proptest to check the invariants problems guarantee to drivers.

use proptest::prelude::*;
use u_optprob::discrete::{FastMutualInfo, MutualInfoEstimator, SlowMutualInfo};
use u_optprob::prelude::*;

type DiscreteFn = CustomFitness<fn(&[usize]) -> f64>;
type ContinuousFn = CustomFitness<fn(&[f64]) -> f64>;

fn one_max(x: &[usize]) -> f64 {
    x.iter().sum::<usize>() as f64
}

fn total(x: &[f64]) -> f64 {
    x.iter().sum()
}

fn discrete(length: usize, max_val: usize) -> DiscreteProblem<DiscreteFn> {
    let f = CustomFitness::new(one_max as fn(&[usize]) -> f64, ProblemType::Discrete);
    let config = DiscreteConfig::default()
        .with_length(length)
        .with_max_val(max_val);
    DiscreteProblem::new(f, config).unwrap()
}

fn continuous(length: usize, min_val: f64, max_val: f64) -> ContinuousProblem<ContinuousFn> {
    let f = CustomFitness::new(total as fn(&[f64]) -> f64, ProblemType::Continuous);
    let config = ContinuousConfig::default()
        .with_length(length)
        .with_bounds(min_val, max_val)
        .with_step((max_val - min_val) / 4.0);
    ContinuousProblem::new(f, config).unwrap()
}

/// A state of `length` values in `0..max_val`.
fn state_strategy(length: usize, max_val: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..max_val, length)
}

/// Length, alphabet, and a matching state.
fn discrete_case() -> impl Strategy<Value = (usize, usize, Vec<usize>)> {
    (1usize..12, 2usize..6).prop_flat_map(|(length, max_val)| {
        (Just(length), Just(max_val), state_strategy(length, max_val))
    })
}

/// An elite sample of `rows` states.
fn sample_case() -> impl Strategy<Value = (usize, usize, Vec<Vec<usize>>)> {
    (2usize..8, 2usize..4, 1usize..30).prop_flat_map(|(length, max_val, rows)| {
        (
            Just(length),
            Just(max_val),
            prop::collection::vec(state_strategy(length, max_val), rows),
        )
    })
}

proptest! {
    // ==================== Neighborhoods ====================

    #[test]
    fn discrete_neighbors_count_and_distance((length, max_val, state) in discrete_case()) {
        let mut problem = discrete(length, max_val);
        problem.set_state(state.clone()).unwrap();
        problem.find_neighbors();

        let neighbors = problem.neighbors();
        prop_assert_eq!(neighbors.len(), length * (max_val - 1));
        for (k, n) in neighbors.iter().enumerate() {
            let diffs = n.iter().zip(&state).filter(|(a, b)| a != b).count();
            prop_assert_eq!(diffs, 1);
            prop_assert!(!neighbors[..k].contains(n), "duplicate neighbor {:?}", n);
        }
    }

    #[test]
    fn continuous_neighbors_at_most_two_per_position(
        values in prop::collection::vec(0.0f64..=1.0, 1..10)
    ) {
        let mut problem = continuous(values.len(), 0.0, 1.0);
        problem.set_state(values.clone()).unwrap();
        problem.find_neighbors();

        prop_assert!(problem.neighbors().len() <= 2 * values.len());
        for n in problem.neighbors() {
            prop_assert!(n.as_slice() != values.as_slice());
            prop_assert!(n.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    // ==================== Mate probabilities ====================

    #[test]
    fn mate_probs_are_a_distribution(
        rows in prop::collection::vec(state_strategy(4, 3), 1..20),
        maximize in any::<bool>()
    ) {
        let f = CustomFitness::new(one_max as fn(&[usize]) -> f64, ProblemType::Discrete);
        let config = DiscreteConfig::default()
            .with_length(4)
            .with_max_val(3)
            .with_maximize(maximize);
        let mut problem = DiscreteProblem::new(f, config).unwrap();
        problem.set_population(rows).unwrap();

        let probs = problem.eval_mate_probs().unwrap();
        prop_assert!(probs.iter().all(|&p| p >= 0.0));
        prop_assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    // ==================== Reproduction ====================

    #[test]
    fn pure_crossover_keeps_parent_values(
        (length, max_val, p1) in discrete_case(),
        seed in any::<u64>()
    ) {
        let problem = discrete(length, max_val);
        let mut rng = create_rng(seed);
        let p2 = problem.random(&mut rng);

        let child = problem.reproduce(&p1, &p2, 0.0, &mut rng).unwrap();
        prop_assert_eq!(child.len(), length);
        for i in 0..length {
            prop_assert!(child[i] == p1[i] || child[i] == p2[i]);
        }
    }

    #[test]
    fn full_mutation_flips_every_binary_locus(
        parent in prop::collection::vec(0usize..2, 2..16),
        seed in any::<u64>()
    ) {
        let problem = discrete(parent.len(), 2);
        let mut rng = create_rng(seed);

        let child = problem.reproduce(&parent, &parent, 1.0, &mut rng).unwrap();
        for (c, p) in child.iter().zip(&parent) {
            prop_assert_eq!(*c, 1 - *p);
        }
    }

    #[test]
    fn continuous_child_stays_in_bounds(
        length in 1usize..10,
        prob in 0.0f64..=1.0,
        seed in any::<u64>()
    ) {
        let problem = continuous(length, -2.0, 3.0);
        let mut rng = create_rng(seed);
        let p1 = problem.random(&mut rng);
        let p2 = problem.random(&mut rng);

        let child = problem.reproduce(&p1, &p2, prob, &mut rng).unwrap();
        prop_assert_eq!(child.len(), length);
        prop_assert!(child.iter().all(|v| (-2.0..=3.0).contains(v)));
    }

    // ==================== Continuous updates ====================

    #[test]
    fn update_state_stays_in_bounds(
        updates in prop::collection::vec(-100.0f64..100.0, 1..10),
        seed in any::<u64>()
    ) {
        let mut problem = continuous(updates.len(), -1.0, 1.0);
        problem.reset(&mut create_rng(seed)).unwrap();

        let next = problem.update_state(&updates).unwrap();
        prop_assert!(next.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    // ==================== MIMIC ====================

    #[test]
    fn sample_order_is_a_permutation(
        parents in prop::collection::vec(prop::option::of(0usize..12), 1..10)
    ) {
        let length = parents.len();
        let mut problem = discrete(length, 2);
        problem.set_parent_nodes(parents).unwrap();

        let mut order = problem.find_sample_order().unwrap().to_vec();
        order.sort_unstable();
        prop_assert_eq!(order, (0..length).collect::<Vec<_>>());
    }

    #[test]
    fn fast_and_slow_mutual_info_match((length, max_val, sample) in sample_case()) {
        let slow = SlowMutualInfo.estimate(&sample, length, max_val);
        let fast = FastMutualInfo::new().estimate(&sample, length, max_val);
        prop_assert_eq!(slow, fast);
    }

    #[test]
    fn fitted_model_is_a_tree_with_stochastic_tables(
        (length, max_val, sample) in sample_case(),
        noise in 0.0f64..0.5
    ) {
        let f = CustomFitness::new(one_max as fn(&[usize]) -> f64, ProblemType::Discrete);
        let config = DiscreteConfig::default()
            .with_length(length)
            .with_max_val(max_val)
            .with_noise(noise);
        let mut problem = DiscreteProblem::new(f, config).unwrap();
        problem.set_keep_sample(sample).unwrap();
        problem.eval_node_probs().unwrap();

        let parents = problem.parent_nodes().unwrap();
        prop_assert_eq!(parents[0], None);
        prop_assert!(parents[1..].iter().all(|p| p.is_some()));

        // Parents precede children.
        let order = problem.sample_order().unwrap();
        for (i, parent) in parents.iter().enumerate() {
            if let Some(p) = parent {
                let pi = order.iter().position(|&x| x == *p);
                let ci = order.iter().position(|&x| x == i);
                prop_assert!(pi < ci);
            }
        }

        for table in problem.node_probs().unwrap() {
            prop_assert_eq!(table.len(), max_val);
            for row in table {
                prop_assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn same_seed_same_mimic_run(seed in any::<u64>()) {
        let run = |seed: u64| {
            let mut problem = discrete(8, 3);
            let mut rng = create_rng(seed);
            problem.random_pop(40, &mut rng).unwrap();
            problem.find_top_pct(0.25).unwrap();
            problem.eval_node_probs().unwrap();
            let samples = problem.sample_pop(10, &mut rng).unwrap();
            (problem.parent_nodes().map(|p| p.to_vec()), samples)
        };
        prop_assert_eq!(run(seed), run(seed));
    }
}
