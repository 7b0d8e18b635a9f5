//! Exact solver for the EV routing problem.
//!
//! [`ExactSolver`] encodes the fleet, energy and cargo dynamics as a
//! mixed-integer linear programme and solves it with the pure-Rust `microlp`
//! backend of `good_lp`. Conditional constraints are linearised with big-M
//! terms, so the solver needs no native libraries.
//!
//! The formulation keeps flow conservation but has no sub-tour elimination:
//! a selected arc set may contain cycles detached from the depot. Paths are
//! recovered by following selected arcs from the depot until a node repeats.
//! A model without a satisfying assignment is reported as
//! [`SolveError::Infeasible`](evroute_core::SolveError::Infeasible).

#![forbid(unsafe_code)]

mod model;
mod solver;

pub use solver::ExactSolver;
