//! Informed-search solver for the EV routing problem.
//!
//! [`SearchSolver`] partitions customers across the fleet by descending
//! demand and stitches each vehicle's stops together with best-first
//! shortest-path searches over the direct distance matrix. It is fast and
//! deterministic, with no optimality guarantee: partitions ignore capacity and
//! the visiting order within a vehicle is fixed by the partition.

#![forbid(unsafe_code)]

mod astar;
mod partition;
mod solver;

pub use astar::shortest_path;
pub use partition::partition_by_demand;
pub use solver::SearchSolver;
