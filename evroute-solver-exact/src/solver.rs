//! `ExactSolver` implementation backed by the `good_lp` model.

use std::collections::BTreeSet;
use std::time::Instant;

use evroute_core::{
    Diagnostics, Problem, SolveError, SolveRequest, SolveResponse, Solver, VehicleRoute,
};

use crate::model::EnergyModel;

/// Mixed-integer solver returning an optimal arc assignment per vehicle.
///
/// Every vehicle must leave and re-enter the depot once and enter every
/// customer at least once. The model has no sub-tour elimination, so a
/// vehicle whose customers sit on loops the depot path never reaches is
/// listed in `incomplete_vehicles`. Paths are labelled by role and node index
/// (`depot-0`, `customer-3`, `station-5`, `node-6`) and vehicles are named
/// `EV-1`, `EV-2`, and so on. The seed in the request is ignored.
///
/// # Examples
/// ```
/// use evroute_core::{
///     EdgeSpec, NodeKind, NodeSpec, Problem, ProblemDescription, SolveRequest, Solver,
///     VehicleSpec,
/// };
/// use evroute_solver_exact::ExactSolver;
///
/// let description = ProblemDescription {
///     nodes: vec![
///         NodeSpec::new("depot", NodeKind::Depot),
///         NodeSpec::customer("shop", 2.0, 0.0),
///     ],
///     edges: vec![EdgeSpec::new("depot", "shop", 4.0)],
///     vehicles: vec![VehicleSpec::default()],
///     ..ProblemDescription::default()
/// };
/// let request = SolveRequest::new(Problem::from_description(&description)?, 0);
/// let response = ExactSolver::new().solve(&request)?;
/// assert_eq!(response.routes[0].path, ["depot-0", "customer-1", "depot-0"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSolver;

impl ExactSolver {
    /// Construct the solver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Solver for ExactSolver {
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolveError> {
        let started_at = Instant::now();
        let problem = &request.problem;
        let depot = problem.require_depot()?;

        let model = EnergyModel::build(problem, depot)?;
        log::debug!(
            "exact model for {} vehicles has {} constraints",
            problem.fleet().vehicle_count(),
            model.constraint_count()
        );
        let assignment = model.solve().inspect_err(|err| {
            log::info!("exact solver found no assignment: {err}");
        })?;

        let mut routes = Vec::with_capacity(assignment.arcs.len());
        let mut incomplete_vehicles = Vec::new();
        for (arcs, number) in assignment.arcs.iter().zip(1_usize..) {
            let vehicle_id = format!("EV-{number}");
            let path = trace(arcs, depot);
            let stranded = stranded_customers(problem, arcs, &path);
            if !stranded.is_empty() {
                log::warn!(
                    "{vehicle_id}: customers {stranded:?} are served on loops that skip the depot"
                );
                incomplete_vehicles.push(vehicle_id.clone());
            }
            routes.push(VehicleRoute {
                vehicle_id,
                path: path
                    .into_iter()
                    .map(|node| role_label(problem, depot, node))
                    .collect(),
            });
        }

        let solve_time = started_at.elapsed();
        log::info!(
            "exact solver finished in {solve_time:?} with objective {:.2}",
            assignment.objective
        );
        Ok(SolveResponse {
            routes,
            diagnostics: Diagnostics {
                solve_time,
                objective: assignment.objective,
                incomplete_vehicles,
            },
        })
    }
}

/// Follow selected arcs from the depot until a node repeats or no arc
/// leaves the current node, then close the path at the depot.
///
/// When several arcs leave a node the lowest-indexed head wins.
fn trace(arcs: &BTreeSet<(usize, usize)>, depot: usize) -> Vec<usize> {
    let mut path = vec![depot];
    let mut current = depot;
    while let Some(next) = arcs
        .iter()
        .find(|&&(from, _)| from == current)
        .map(|&(_, to)| to)
    {
        if path.contains(&next) {
            break;
        }
        path.push(next);
        current = next;
    }
    if path.last() != Some(&depot) || path.len() == 1 {
        path.push(depot);
    }
    path
}

/// Customers that leave on a selected arc yet are absent from `path`.
///
/// Without sub-tour elimination the model may serve customers on closed
/// loops the depot trace never reaches.
fn stranded_customers(
    problem: &Problem,
    arcs: &BTreeSet<(usize, usize)>,
    path: &[usize],
) -> Vec<usize> {
    let mut stranded: Vec<usize> = arcs
        .iter()
        .map(|&(from, _)| from)
        .filter(|from| problem.demands().contains_key(from) && !path.contains(from))
        .collect();
    stranded.dedup();
    stranded
}

fn role_label(problem: &Problem, depot: usize, node: usize) -> String {
    let role = if node == depot {
        "depot"
    } else if problem.charging().contains(node) {
        "station"
    } else if problem.demands().contains_key(&node) {
        "customer"
    } else {
        "node"
    };
    format!("{role}-{node}")
}
