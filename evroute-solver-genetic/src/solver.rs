//! `GeneticSolver` implementation.

use std::time::Instant;

use evroute_core::{
    Diagnostics, Problem, SolveError, SolveRequest, SolveResponse, Solver, VehicleRoute,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::GeneticConfig;
use crate::fitness::FitnessContext;
use crate::genotype::Individual;

/// Outcome of one evolutionary run.
#[derive(Debug, Clone, PartialEq)]
pub struct Evolution {
    /// Best individual of the final population; the first one wins ties.
    pub best: Individual,
    /// Fitness of [`Evolution::best`].
    pub fitness: f64,
    /// Whether [`Evolution::best`] passes every feasibility check.
    pub feasible: bool,
    /// Generations actually run, fewer than configured when the time budget
    /// ran out.
    pub generations: usize,
}

/// Genetic algorithm over customer partitions.
///
/// Each generation selects a full population by tournament, crosses adjacent
/// pairs and mutates individuals with the configured probabilities, then
/// replaces the population wholesale. There is no elitism.
///
/// # Examples
/// ```
/// use evroute_core::{EdgeSpec, NodeKind, NodeSpec, Problem, ProblemDescription, SolveRequest, Solver, VehicleSpec};
/// use evroute_solver_genetic::GeneticSolver;
///
/// let description = ProblemDescription {
///     nodes: vec![NodeSpec::new("depot", NodeKind::Depot), NodeSpec::customer("shop", 2.0, 0.0)],
///     edges: vec![EdgeSpec::new("depot", "shop", 4.0)],
///     vehicles: vec![VehicleSpec::default()],
///     ..ProblemDescription::default()
/// };
/// let request = SolveRequest::new(Problem::from_description(&description).unwrap(), 3);
/// let response = GeneticSolver::new().solve(&request).unwrap();
/// assert_eq!(response.routes[0].path, ["depot", "shop", "depot"]);
/// assert_eq!(response.diagnostics.objective, 8.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeneticSolver {
    config: GeneticConfig,
}

type Scored = (Individual, f64);

impl GeneticSolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: GeneticConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// Evolve a population for `problem` drawing randomness from `rng`.
    ///
    /// # Errors
    /// Returns [`SolveError::Validation`] when the problem has no explicit
    /// depot.
    pub fn evolve<R: Rng + ?Sized>(
        &self,
        problem: &Problem,
        rng: &mut R,
    ) -> Result<Evolution, SolveError> {
        let depot = problem.require_depot()?;
        let context = FitnessContext::new(problem, depot, self.config.penalty);
        let customers: Vec<usize> = problem.customers().collect();
        let vehicles = problem.fleet().vehicle_count();
        let population_size = self.config.population_size.max(1);
        let started_at = Instant::now();

        let mut population: Vec<Scored> = (0..population_size)
            .map(|_| {
                let individual = Individual::random(&customers, vehicles, rng);
                let fitness = context.evaluate(&individual);
                (individual, fitness)
            })
            .collect();

        let mut generations = 0;
        while generations < self.config.generations {
            if let Some(budget) = self.config.time_budget
                && started_at.elapsed() >= budget
            {
                log::info!("genetic solver stopped after {generations} generations: time budget spent");
                break;
            }
            population = self.next_generation(&population, &context, rng);
            generations += 1;
            if log::log_enabled!(log::Level::Debug) {
                let best = population
                    .iter()
                    .map(|(_, fitness)| *fitness)
                    .fold(f64::INFINITY, f64::min);
                log::debug!("generation {generations}: best fitness {best:.2}");
            }
        }

        let (best, fitness) = first_best(population)
            .ok_or_else(|| SolveError::Backend {
                message: "population is empty".to_owned(),
            })?;
        let feasible = context.is_feasible(&best);
        Ok(Evolution {
            best,
            fitness,
            feasible,
            generations,
        })
    }

    fn next_generation<R: Rng + ?Sized>(
        &self,
        population: &[Scored],
        context: &FitnessContext<'_>,
        rng: &mut R,
    ) -> Vec<Scored> {
        let mut offspring: Vec<(Individual, Option<f64>)> = (0..population.len())
            .filter_map(|_| self.tournament(population, rng))
            .map(|(individual, fitness)| (individual, Some(fitness)))
            .collect();

        for pair in offspring.chunks_exact_mut(2) {
            if let [(first, first_fitness), (second, second_fitness)] = pair
                && rng.r#gen::<f64>() < self.config.crossover_prob
            {
                first.crossover(second, rng);
                *first_fitness = None;
                *second_fitness = None;
            }
        }
        for (individual, fitness) in &mut offspring {
            if rng.r#gen::<f64>() < self.config.mutation_prob {
                individual.mutate(self.config.gene_mutation_prob, rng);
                *fitness = None;
            }
        }

        offspring
            .into_iter()
            .map(|(individual, fitness)| {
                let score = fitness.unwrap_or_else(|| context.evaluate(&individual));
                (individual, score)
            })
            .collect()
    }

    /// Draw contestants with replacement and keep the first fittest.
    fn tournament<R: Rng + ?Sized>(&self, population: &[Scored], rng: &mut R) -> Option<Scored> {
        if population.is_empty() {
            return None;
        }
        let contestants = self.config.tournament_size.max(1);
        (0..contestants)
            .filter_map(|_| population.get(rng.gen_range(0..population.len())))
            .fold(None, |best: Option<&Scored>, candidate| match best {
                Some(current) if current.1 <= candidate.1 => Some(current),
                _ => Some(candidate),
            })
            .cloned()
    }
}

fn first_best(population: Vec<Scored>) -> Option<Scored> {
    population.into_iter().fold(None, |best, candidate| match best {
        Some(current) if current.1 <= candidate.1 => Some(current),
        _ => Some(candidate),
    })
}

impl Solver for GeneticSolver {
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolveError> {
        let started_at = Instant::now();
        let problem = &request.problem;
        let mut rng = ChaCha8Rng::seed_from_u64(request.seed);
        let evolution = self.evolve(problem, &mut rng)?;

        if !evolution.feasible {
            log::warn!(
                "best individual violates feasibility (fitness {:.2})",
                evolution.fitness
            );
        }
        log::info!(
            "genetic solver finished {} generations, best fitness {:.2}",
            evolution.generations,
            evolution.fitness
        );

        let depot = problem.depot();
        let vehicle_ids = &problem.fleet().vehicle_ids;
        let routes = evolution
            .best
            .routes()
            .iter()
            .enumerate()
            .map(|(slot, customers)| {
                let vehicle_id = vehicle_ids
                    .get(slot)
                    .cloned()
                    .flatten()
                    .unwrap_or_else(|| format!("Vehicle-{}", slot + 1));
                let nodes: Vec<usize> = std::iter::once(depot)
                    .chain(customers.iter().copied())
                    .chain(std::iter::once(depot))
                    .collect();
                VehicleRoute {
                    vehicle_id,
                    path: problem.labels(&nodes),
                }
            })
            .collect();

        Ok(SolveResponse {
            routes,
            diagnostics: Diagnostics {
                solve_time: started_at.elapsed(),
                objective: evolution.fitness,
                incomplete_vehicles: Vec::new(),
            },
        })
    }
}
