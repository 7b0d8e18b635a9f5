//! `SearchSolver` implementation.

use std::time::Instant;

use evroute_core::{
    Diagnostics, Problem, RouteSimulator, SolveError, SolveRequest, SolveResponse, Solver,
    VehicleRoute,
};

use crate::astar::shortest_path;
use crate::partition::partition_by_demand;

/// Greedy partition plus per-leg best-first search.
///
/// # Examples
/// ```
/// use evroute_core::{EdgeSpec, NodeKind, NodeSpec, Problem, ProblemDescription, SolveRequest, Solver, VehicleSpec};
/// use evroute_solver_search::SearchSolver;
///
/// let description = ProblemDescription {
///     nodes: vec![NodeSpec::new("depot", NodeKind::Depot), NodeSpec::customer("shop", 2.0, 0.0)],
///     edges: vec![EdgeSpec::new("depot", "shop", 4.0)],
///     vehicles: vec![VehicleSpec::default()],
///     ..ProblemDescription::default()
/// };
/// let request = SolveRequest::new(Problem::from_description(&description).unwrap(), 0);
/// let response = SearchSolver::new().solve(&request).unwrap();
/// assert_eq!(response.routes[0].path, ["depot", "shop", "depot"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchSolver;

/// A vehicle's stitched route and whether every leg was found.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedRoute {
    nodes: Vec<usize>,
    complete: bool,
}

impl SearchSolver {
    /// Construct the solver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Plan one node-index route per vehicle slot.
    fn plan(problem: &Problem) -> Vec<PlannedRoute> {
        let depot = problem.depot();
        partition_by_demand(problem.demands(), problem.fleet().vehicle_count())
            .into_iter()
            .map(|customers| stitch(problem, depot, &customers))
            .collect()
    }
}

/// Join `depot -> customers.. -> depot` with shortest paths, dropping each
/// segment's final node so junctions are not repeated.
///
/// An unreachable stop is skipped and the vehicle carries on from where it
/// stands, so the route always starts and ends at the depot.
fn stitch(problem: &Problem, depot: usize, customers: &[usize]) -> PlannedRoute {
    let mut nodes = Vec::new();
    let mut position = depot;
    let mut complete = true;
    for &stop in customers.iter().chain(std::iter::once(&depot)) {
        let segment = shortest_path(problem.distances(), position, stop);
        if segment.is_empty() {
            log::warn!("no path from node {position} to node {stop}; stop skipped");
            complete = false;
            continue;
        }
        let keep = segment.len().saturating_sub(1);
        nodes.extend(segment.into_iter().take(keep));
        position = stop;
    }
    if position != depot {
        nodes.push(position);
    }
    if nodes.is_empty() {
        // Idle vehicles still leave and return: `[depot, depot]`.
        nodes.push(depot);
    }
    nodes.push(depot);
    PlannedRoute { nodes, complete }
}

impl Solver for SearchSolver {
    #[expect(
        clippy::float_arithmetic,
        reason = "the objective sums floating-point route distances"
    )]
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolveError> {
        let started_at = Instant::now();
        let problem = &request.problem;
        let simulator = RouteSimulator::new(problem);

        let mut routes = Vec::new();
        let mut incomplete_vehicles = Vec::new();
        let mut objective = 0.0;
        for (slot, planned) in Self::plan(problem).into_iter().enumerate() {
            let vehicle_id = format!("EV-{}", slot + 1);
            let trace = simulator.simulate(&planned.nodes);
            log::debug!(
                "{vehicle_id}: distance {:.2}, charges {}, final energy {:.2}",
                trace.distance,
                trace.charge_count(),
                trace.final_energy
            );
            for line in trace.event_log() {
                log::trace!("{vehicle_id}: {line}");
            }
            objective += trace.distance;
            if !planned.complete {
                incomplete_vehicles.push(vehicle_id.clone());
            }
            routes.push(VehicleRoute {
                vehicle_id,
                path: problem.labels(&planned.nodes),
            });
        }

        log::info!(
            "search solver planned {} routes, total distance {objective:.2}",
            routes.len()
        );
        Ok(SolveResponse {
            routes,
            diagnostics: Diagnostics {
                solve_time: started_at.elapsed(),
                objective,
                incomplete_vehicles,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evroute_core::test_support::{DescriptionBuilder, relay_detour};
    use rstest::rstest;

    fn problem(description: &evroute_core::ProblemDescription) -> Problem {
        Problem::from_description(description).expect("valid problem")
    }

    #[rstest]
    fn relay_path_beats_direct_edge() {
        let problem = problem(&relay_detour());
        let planned = SearchSolver::plan(&problem);
        let labels: Vec<_> = planned
            .iter()
            .map(|route| problem.labels(&route.nodes))
            .collect();
        assert_eq!(labels, vec![vec!["D", "A", "C", "A", "D"]]);
        assert!(planned.iter().all(|route| route.complete));
    }

    #[rstest]
    fn idle_vehicle_stays_at_depot() {
        let description = DescriptionBuilder::new()
            .depot("d")
            .customer("c", 1.0, 0.0)
            .edge("d", "c", 1.0)
            .vehicle(10.0, 10.0)
            .vehicle(10.0, 10.0)
            .build();
        let problem = problem(&description);
        let planned = SearchSolver::plan(&problem);
        assert_eq!(planned.get(1).map(|route| route.nodes.clone()), Some(vec![0, 0]));
    }

    #[rstest]
    fn unreachable_customer_marks_vehicle_incomplete() {
        let description = DescriptionBuilder::new()
            .depot("d")
            .customer("near", 1.0, 0.0)
            .customer("island", 9.0, 0.0)
            .edge("d", "near", 1.0)
            .vehicle(10.0, 10.0)
            .build();
        let request = SolveRequest::new(problem(&description), 0);
        let response = SearchSolver::new().solve(&request).expect("solve succeeds");
        assert_eq!(response.diagnostics.incomplete_vehicles, vec!["EV-1"]);
        let route = response.routes.first().expect("one route");
        assert!(!route.path.contains(&"island".to_owned()));
        assert_eq!(route.path.first().map(String::as_str), Some("d"));
        assert_eq!(route.path.last().map(String::as_str), Some("d"));
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "tests compare floats within a tolerance")]
    fn objective_is_total_simulated_distance() {
        let request = SolveRequest::new(problem(&relay_detour()), 0);
        let response = SearchSolver::new().solve(&request).expect("solve succeeds");
        assert!((response.diagnostics.objective - 4.0).abs() < 1e-9);
        assert_eq!(
            response.routes.first().map(|route| route.vehicle_id.as_str()),
            Some("EV-1")
        );
    }
}
