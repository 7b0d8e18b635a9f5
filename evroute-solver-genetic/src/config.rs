//! Tuning knobs for [`GeneticSolver`](crate::GeneticSolver).

use std::time::Duration;

/// Fitness assigned to an infeasible individual.
pub const PENALTY: f64 = 9999.0;

/// How infeasible individuals are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Penalty {
    /// Every infeasible individual scores exactly [`PENALTY`].
    ///
    /// Near-feasible and badly infeasible candidates are indistinguishable,
    /// which leaves selection with no gradient towards feasibility.
    #[default]
    Cliff,
    /// [`PENALTY`] plus the summed size of every violation, so selection can
    /// prefer candidates that are closer to feasible.
    Graded,
}

/// Configuration for [`GeneticSolver`](crate::GeneticSolver).
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticConfig {
    /// Number of generations to evolve.
    pub generations: usize,
    /// Individuals per generation.
    pub population_size: usize,
    /// Probability that a pair of offspring is crossed over.
    pub crossover_prob: f64,
    /// Probability that an offspring is mutated.
    pub mutation_prob: f64,
    /// Per-gene swap probability inside a mutation.
    pub gene_mutation_prob: f64,
    /// Contestants per tournament.
    pub tournament_size: usize,
    /// Scoring of infeasible individuals.
    pub penalty: Penalty,
    /// Wall-clock budget checked between generations.
    pub time_budget: Option<Duration>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            generations: 100,
            population_size: 50,
            crossover_prob: 0.7,
            mutation_prob: 0.2,
            gene_mutation_prob: 0.2,
            tournament_size: 3,
            penalty: Penalty::Cliff,
            time_budget: None,
        }
    }
}
