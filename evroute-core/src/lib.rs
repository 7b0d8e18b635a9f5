//! Core domain types for the EV routing engine.
//!
//! A caller deserialises a [`ProblemDescription`], ingests it into a validated
//! [`Problem`] and hands a [`SolveRequest`] to any [`Solver`]. The
//! [`RouteSimulator`] replays a single route against the same problem to
//! report distance, energy, load and charging activity.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod description;
pub mod problem;
pub mod simulator;
pub mod solver;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use description::{
    ConstraintSpec, EdgeSpec, NodeKind, NodeSpec, ProblemDescription, StationSpec, VehicleSpec,
};
pub use problem::{
    ChargingNetwork, ChargingStation, CustomerDemands, Demand, DistanceMatrix, FleetParams, Node,
    Problem, ValidationError,
};
pub use simulator::{RouteSimulator, SimulationEvent, SimulationTrace};
pub use solver::{
    Diagnostics, Error, SolveError, SolveRequest, SolveResponse, Solver, SolverKind,
    UnknownSolverError, VehicleRoute, solve_with_time_limit,
};
