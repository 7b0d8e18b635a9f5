//! Property-based tests for `GeneticSolver`.
//!
//! # Invariants tested
//!
//! - **Partition:** the best individual assigns every customer exactly once,
//!   with one sublist per vehicle.
//! - **Reproducibility:** a seed fully determines the outcome.
//! - **Fitness bound:** a feasible best individual never scores the penalty.

use evroute_core::test_support::complete_graph;
use evroute_core::Problem;
use evroute_solver_genetic::{GeneticConfig, GeneticSolver, PENALTY};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn quick_solver() -> GeneticSolver {
    GeneticSolver::with_config(GeneticConfig {
        generations: 8,
        population_size: 10,
        ..GeneticConfig::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn best_individual_is_a_partition(
        customers in 0_usize..10,
        vehicles in 1_usize..4,
        seed in any::<u64>(),
    ) {
        let problem = Problem::from_description(&complete_graph(customers, vehicles))
            .expect("fixture is valid");
        let evolution = quick_solver()
            .evolve(&problem, &mut ChaCha8Rng::seed_from_u64(seed))
            .expect("evolves");
        prop_assert_eq!(evolution.best.routes().len(), vehicles);
        let mut genes: Vec<usize> = evolution.best.routes().iter().flatten().copied().collect();
        genes.sort_unstable();
        prop_assert_eq!(genes, problem.customers().collect::<Vec<_>>());
    }

    #[test]
    fn seed_determines_outcome(seed in any::<u64>()) {
        let problem = Problem::from_description(&complete_graph(5, 2)).expect("fixture is valid");
        let solver = quick_solver();
        let first = solver.evolve(&problem, &mut ChaCha8Rng::seed_from_u64(seed)).expect("evolves");
        let second = solver.evolve(&problem, &mut ChaCha8Rng::seed_from_u64(seed)).expect("evolves");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn feasible_results_score_below_penalty(seed in any::<u64>()) {
        let problem = Problem::from_description(&complete_graph(4, 2)).expect("fixture is valid");
        let evolution = quick_solver()
            .evolve(&problem, &mut ChaCha8Rng::seed_from_u64(seed))
            .expect("evolves");
        if evolution.feasible {
            prop_assert!(evolution.fitness < PENALTY);
        }
    }
}
