//! Genetic-algorithm solver for the EV routing problem.
//!
//! [`GeneticSolver`] evolves partitions of the customers into one ordered
//! visiting list per vehicle. Fitness is the total fleet distance, or a fixed
//! penalty when any vehicle runs out of charge away from a station, leaves its
//! load range or meets a missing edge. The best individual is returned even
//! when it is infeasible; inspect [`Evolution::feasible`] or the reported
//! objective before trusting the routes.
//!
//! Randomness comes from a [`rand_chacha::ChaCha8Rng`] seeded with
//! [`SolveRequest::seed`](evroute_core::SolveRequest::seed), so identical
//! requests produce identical routes.

#![forbid(unsafe_code)]

mod config;
mod fitness;
mod genotype;
mod solver;

pub use config::{GeneticConfig, PENALTY, Penalty};
pub use genotype::Individual;
pub use solver::{Evolution, GeneticSolver};
