//! Facade crate for the EV routing engine.
//!
//! This crate re-exports the core domain types and exposes each solver behind
//! a feature flag. [`build_solver`] turns a parsed [`SolverKind`] into a boxed
//! [`Solver`], reporting kinds whose feature was compiled out.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use thiserror::Error;

pub use evroute_core::{
    ChargingNetwork, ChargingStation, ConstraintSpec, CustomerDemands, Demand, Diagnostics,
    DistanceMatrix, EdgeSpec, FleetParams, Node, NodeKind, NodeSpec, Problem, ProblemDescription,
    RouteSimulator, SimulationEvent, SimulationTrace, SolveError, SolveRequest, SolveResponse,
    Solver, SolverKind, StationSpec, UnknownSolverError, ValidationError, VehicleRoute,
    VehicleSpec, solve_with_time_limit,
};

#[cfg(feature = "test-support")]
pub use evroute_core::test_support;

#[cfg(feature = "solver-search")]
pub use evroute_solver_search::SearchSolver;

#[cfg(feature = "solver-genetic")]
pub use evroute_solver_genetic::{GeneticConfig, GeneticSolver, PENALTY, Penalty};

#[cfg(feature = "solver-exact")]
pub use evroute_solver_exact::ExactSolver;

/// Overrides applied when constructing a solver.
///
/// Unset fields keep each solver's defaults. Only the genetic solver is
/// tunable; the other solvers ignore these settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverSettings {
    /// Generations evolved by the genetic solver.
    pub generations: Option<usize>,
    /// Population size of the genetic solver.
    pub population_size: Option<usize>,
}

/// A solver could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The solver exists but its crate feature is disabled.
    #[error("{kind} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        /// The requested solver.
        kind: SolverKind,
        /// Feature that would enable it.
        feature: &'static str,
    },
}

/// Cargo feature that compiles in the solver for `kind`.
#[must_use]
pub const fn feature_for(kind: SolverKind) -> &'static str {
    match kind {
        SolverKind::Search => "solver-search",
        SolverKind::Genetic => "solver-genetic",
        SolverKind::Exact => "solver-exact",
    }
}

/// Construct the default solver for `kind`.
///
/// # Errors
/// Returns [`SelectionError::MissingFeature`] when the solver was compiled out.
///
/// # Examples
/// ```
/// use evroute::{SolverKind, solver_for};
///
/// let kind: SolverKind = "Heuristic(A*)".parse()?;
/// # #[cfg(feature = "solver-search")]
/// let _solver = solver_for(kind)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn solver_for(kind: SolverKind) -> Result<Box<dyn Solver>, SelectionError> {
    build_solver(kind, SolverSettings::default())
}

/// Construct the solver for `kind` with `settings` applied.
///
/// # Errors
/// Returns [`SelectionError::MissingFeature`] when the solver was compiled out.
pub fn build_solver(
    kind: SolverKind,
    settings: SolverSettings,
) -> Result<Box<dyn Solver>, SelectionError> {
    match kind {
        #[cfg(feature = "solver-search")]
        SolverKind::Search => Ok(Box::new(SearchSolver::new())),
        #[cfg(feature = "solver-genetic")]
        SolverKind::Genetic => {
            let defaults = GeneticConfig::default();
            Ok(Box::new(GeneticSolver::with_config(GeneticConfig {
                generations: settings.generations.unwrap_or(defaults.generations),
                population_size: settings
                    .population_size
                    .unwrap_or(defaults.population_size),
                ..defaults
            })))
        }
        #[cfg(feature = "solver-exact")]
        SolverKind::Exact => Ok(Box::new(ExactSolver::new())),
        #[cfg_attr(
            all(
                feature = "solver-search",
                feature = "solver-genetic",
                feature = "solver-exact"
            ),
            expect(
                unreachable_patterns,
                reason = "every kind is matched when all solver features are enabled"
            )
        )]
        other => Err(SelectionError::MissingFeature {
            kind: other,
            feature: feature_for(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evroute_core::test_support::single_customer;
    use rstest::rstest;

    #[rstest]
    #[case(SolverKind::Search, "solver-search")]
    #[case(SolverKind::Genetic, "solver-genetic")]
    #[case(SolverKind::Exact, "solver-exact")]
    fn features_are_named_after_solvers(#[case] kind: SolverKind, #[case] feature: &str) {
        assert_eq!(feature_for(kind), feature);
    }

    #[cfg(all(feature = "solver-search", feature = "solver-genetic"))]
    #[rstest]
    #[case(SolverKind::Search)]
    #[case(SolverKind::Genetic)]
    fn selected_solvers_route_every_vehicle(#[case] kind: SolverKind) {
        let problem = Problem::from_description(&single_customer()).expect("valid problem");
        let solver = solver_for(kind).expect("feature enabled");
        let response = solver
            .solve(&SolveRequest::new(problem, 3))
            .expect("solvable");
        assert_eq!(response.routes.len(), 1);
        assert!(
            response
                .routes
                .iter()
                .all(|route| route.path.contains(&"customer-1".to_owned()))
        );
    }

    #[cfg(not(feature = "solver-exact"))]
    #[rstest]
    fn disabled_solver_reports_its_feature() {
        let err = solver_for(SolverKind::Exact).err();
        assert_eq!(
            err,
            Some(SelectionError::MissingFeature {
                kind: SolverKind::Exact,
                feature: "solver-exact",
            })
        );
    }

    #[cfg(feature = "solver-genetic")]
    #[rstest]
    fn settings_override_genetic_defaults() {
        let problem = Problem::from_description(&single_customer()).expect("valid problem");
        let settings = SolverSettings {
            generations: Some(1),
            population_size: Some(2),
        };
        let solver = build_solver(SolverKind::Genetic, settings).expect("feature enabled");
        let response = solver
            .solve(&SolveRequest::new(problem, 0))
            .expect("genetic solver answers");
        assert_eq!(response.routes.len(), 1);
    }
}
