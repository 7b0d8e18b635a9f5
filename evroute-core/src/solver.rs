//! Solver interface, request and response types, and solver selection.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::{Problem, ValidationError};

/// Parameters for a solve request.
///
/// The request carries the ingested problem and a seed for the stochastic
/// solvers; deterministic solvers ignore the seed.
///
/// # Examples
/// ```rust
/// use evroute_core::{NodeKind, NodeSpec, Problem, ProblemDescription, SolveRequest, VehicleSpec};
///
/// let description = ProblemDescription {
///     nodes: vec![NodeSpec::new("d", NodeKind::Depot)],
///     vehicles: vec![VehicleSpec::default()],
///     ..ProblemDescription::default()
/// };
/// let problem = Problem::from_description(&description).unwrap();
/// let request = SolveRequest::new(problem, 7);
/// assert_eq!(request.seed, 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SolveRequest {
    /// The validated routing problem.
    pub problem: Problem,
    /// Seed for reproducible stochastic components.
    pub seed: u64,
}

impl SolveRequest {
    /// Bundle a problem with a seed.
    #[must_use]
    pub const fn new(problem: Problem, seed: u64) -> Self {
        Self { problem, seed }
    }
}

/// The path assigned to one vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleRoute {
    /// Vehicle label.
    #[cfg_attr(feature = "serde", serde(rename = "vehicleId"))]
    pub vehicle_id: String,
    /// Node labels in visiting order.
    pub path: Vec<String>,
}

/// Solver bookkeeping returned alongside the routes.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostics {
    /// Wall-clock time spent solving.
    pub solve_time: Duration,
    /// Objective value as the solver measures it.
    pub objective: f64,
    /// Vehicles whose assigned stops could not all be reached.
    #[cfg_attr(feature = "serde", serde(default))]
    pub incomplete_vehicles: Vec<String>,
}

/// Response from a successful solve.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveResponse {
    /// One route per vehicle.
    pub routes: Vec<VehicleRoute>,
    /// Objective value and timing.
    pub diagnostics: Diagnostics,
}

/// Errors returned by [`Solver::solve`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// The problem failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The constraint model has no satisfying assignment.
    #[error("no feasible assignment exists for this problem")]
    Infeasible,
    /// The optimisation backend failed for a reason other than infeasibility.
    #[error("solver backend failed: {message}")]
    Backend {
        /// Backend-provided description.
        message: String,
    },
    /// The caller's time limit elapsed before the solver finished.
    #[error("solver did not finish within {limit:?}")]
    TimedOut {
        /// The limit that elapsed.
        limit: Duration,
    },
    /// The worker thread running the solver panicked.
    #[error("solver worker terminated unexpectedly")]
    WorkerPanicked,
}

/// Alias for the solver error type.
pub type Error = SolveError;

/// Produce one route per vehicle for a request.
///
/// Solvers must be `Send + Sync` so a single instance can serve concurrent
/// requests; all per-solve state lives on the stack of [`Solver::solve`].
pub trait Solver: Send + Sync {
    /// Solve a request, producing routes or an error.
    ///
    /// # Errors
    /// Returns [`SolveError`] when the request cannot be solved.
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, Error>;
}

/// The solving strategies a caller can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    /// Greedy partition with per-leg best-first search.
    Search,
    /// Genetic algorithm over customer partitions.
    Genetic,
    /// Mixed-integer model solved to optimality.
    Exact,
}

impl SolverKind {
    /// All kinds in selection order.
    pub const ALL: [Self; 3] = [Self::Search, Self::Genetic, Self::Exact];

    /// Canonical selection tag.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Search => "Heuristic(A*)",
            Self::Genetic => "Meta Heuristic(Genetic Algo)",
            Self::Exact => "CSP(using Z3)",
        }
    }

    /// Short name accepted on the command line.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Genetic => "genetic",
            Self::Exact => "exact",
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A selection tag that names no known solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown solver {label:?}; expected one of {expected}")]
pub struct UnknownSolverError {
    /// The rejected tag.
    pub label: String,
    /// Accepted tags, comma separated.
    pub expected: String,
}

impl FromStr for SolverKind {
    type Err = UnknownSolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == tag || kind.short_name().eq_ignore_ascii_case(tag))
            .ok_or_else(|| UnknownSolverError {
                label: s.to_owned(),
                expected: Self::ALL
                    .iter()
                    .map(|kind| format!("{:?}", kind.label()))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Run `solver` on a worker thread, giving up after `limit`.
///
/// On timeout the worker is detached and its eventual result discarded; the
/// solvers hold no shared state so an abandoned run cannot affect later ones.
///
/// # Errors
/// Returns [`SolveError::TimedOut`] when the limit elapses,
/// [`SolveError::WorkerPanicked`] when the worker dies without replying, and
/// any error the solver itself returns.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use evroute_core::{
///     Diagnostics, NodeKind, NodeSpec, Problem, ProblemDescription, SolveError, SolveRequest,
///     SolveResponse, Solver, VehicleSpec, solve_with_time_limit,
/// };
///
/// struct Idle;
///
/// impl Solver for Idle {
///     fn solve(&self, _: &SolveRequest) -> Result<SolveResponse, SolveError> {
///         Ok(SolveResponse { routes: Vec::new(), diagnostics: Diagnostics::default() })
///     }
/// }
///
/// let description = ProblemDescription {
///     nodes: vec![NodeSpec::new("d", NodeKind::Depot)],
///     vehicles: vec![VehicleSpec::default()],
///     ..ProblemDescription::default()
/// };
/// let request = Arc::new(SolveRequest::new(Problem::from_description(&description).unwrap(), 0));
/// let response = solve_with_time_limit(Arc::new(Idle), request, Duration::from_secs(5)).unwrap();
/// assert!(response.routes.is_empty());
/// ```
pub fn solve_with_time_limit(
    solver: Arc<dyn Solver>,
    request: Arc<SolveRequest>,
    limit: Duration,
) -> Result<SolveResponse, Error> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name("evroute-solver".to_owned())
        .spawn(move || {
            let outcome = solver.solve(&request);
            // The receiver is gone when the caller already timed out.
            let _sent = sender.send(outcome);
        })
        .map_err(|err| SolveError::Backend {
            message: format!("failed to spawn solver thread: {err}"),
        })?;

    match receiver.recv_timeout(limit) {
        Ok(outcome) => outcome,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            log::warn!("solver exceeded time limit of {limit:?}");
            Err(SolveError::TimedOut { limit })
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(SolveError::WorkerPanicked),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedSolver, single_customer};
    use rstest::{fixture, rstest};

    #[fixture]
    fn request() -> Arc<SolveRequest> {
        let problem = Problem::from_description(&single_customer()).expect("valid problem");
        Arc::new(SolveRequest::new(problem, 1))
    }

    #[rstest]
    #[case("Heuristic(A*)", SolverKind::Search)]
    #[case("Meta Heuristic(Genetic Algo)", SolverKind::Genetic)]
    #[case("CSP(using Z3)", SolverKind::Exact)]
    #[case("search", SolverKind::Search)]
    #[case(" Genetic ", SolverKind::Genetic)]
    #[case("exact", SolverKind::Exact)]
    fn parses_selection_tags(#[case] tag: &str, #[case] expected: SolverKind) {
        assert_eq!(tag.parse::<SolverKind>(), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("Heuristic")]
    #[case("csp(using z3)")]
    fn rejects_unknown_tags(#[case] tag: &str) {
        let err = tag.parse::<SolverKind>().expect_err("tag should be rejected");
        assert_eq!(err.label, tag);
        assert!(err.to_string().contains("Heuristic(A*)"));
    }

    #[rstest]
    fn display_uses_canonical_label() {
        assert_eq!(SolverKind::Exact.to_string(), "CSP(using Z3)");
    }

    #[rstest]
    fn time_limit_passes_through_fast_results(request: Arc<SolveRequest>) {
        let response =
            solve_with_time_limit(Arc::new(FixedSolver::default()), request, Duration::from_secs(5))
                .expect("solver finishes in time");
        assert!(response.routes.is_empty());
    }

    #[rstest]
    fn time_limit_reports_timeout(request: Arc<SolveRequest>) {
        let solver = FixedSolver::default().with_delay(Duration::from_millis(500));
        let err = solve_with_time_limit(Arc::new(solver), request, Duration::from_millis(20))
            .expect_err("solver should time out");
        assert_eq!(
            err,
            SolveError::TimedOut {
                limit: Duration::from_millis(20)
            }
        );
    }

    #[rstest]
    fn time_limit_propagates_solver_errors(request: Arc<SolveRequest>) {
        let solver = FixedSolver::failing(SolveError::Infeasible);
        let err = solve_with_time_limit(Arc::new(solver), request, Duration::from_secs(5))
            .expect_err("solver error");
        assert_eq!(err, SolveError::Infeasible);
    }

    #[rstest]
    fn validation_errors_convert() {
        let err: SolveError = ValidationError::MissingDepot.into();
        assert_eq!(err.to_string(), "problem must contain a depot node");
    }
}
