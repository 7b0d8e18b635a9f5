//! Behavioural tests for `SearchSolver` using rstest-bdd.

use std::cell::RefCell;

use evroute_core::test_support::{DescriptionBuilder, relay_detour};
use evroute_core::{Problem, ProblemDescription, SolveError, SolveRequest, SolveResponse, Solver};
use evroute_solver_search::SearchSolver;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Debug, Default)]
struct SearchWorld {
    description: RefCell<ProblemDescription>,
    outcome: RefCell<Option<Result<SolveResponse, SolveError>>>,
}

impl SearchWorld {
    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn response(&self) -> SolveResponse {
        self.outcome
            .borrow()
            .clone()
            .expect("outcome should be recorded before assertions")
            .expect("expected solve success")
    }
}

#[fixture]
fn world() -> SearchWorld {
    SearchWorld::default()
}

#[given("a depot linked to a customer directly and through a relay")]
fn given_relay(world: &SearchWorld) {
    world.description.replace(relay_detour());
}

#[given("two vehicles and three customers of different demand")]
fn given_round_robin(world: &SearchWorld) {
    world.description.replace(
        DescriptionBuilder::new()
            .depot("depot")
            .customer("small", 1.0, 0.0)
            .customer("big", 9.0, 0.0)
            .customer("medium", 4.0, 1.0)
            .edge("depot", "small", 1.0)
            .edge("depot", "big", 1.0)
            .edge("depot", "medium", 1.0)
            .edge("big", "small", 1.0)
            .vehicle(100.0, 200.0)
            .vehicle(100.0, 200.0)
            .build(),
    );
}

#[given("a customer with no edges")]
fn given_isolated(world: &SearchWorld) {
    world.description.replace(
        DescriptionBuilder::new()
            .depot("depot")
            .customer("island", 1.0, 0.0)
            .vehicle(100.0, 200.0)
            .build(),
    );
}

#[when("the search solver runs")]
fn when_solver_runs(world: &SearchWorld) {
    let outcome = Problem::from_description(&world.description.borrow())
        .map_err(SolveError::from)
        .and_then(|problem| SearchSolver::new().solve(&SolveRequest::new(problem, 1)));
    world.outcome.replace(Some(outcome));
}

#[then("vehicle {vehicle} follows {path}")]
fn then_path(vehicle: String, path: String, world: &SearchWorld) {
    let expected: Vec<String> = path.split(", ").map(str::to_owned).collect();
    let response = world.response();
    let route = response
        .routes
        .iter()
        .find(|route| route.vehicle_id == vehicle);
    assert_eq!(route.map(|route| route.path.clone()), Some(expected));
}

#[then("every vehicle is complete")]
fn then_complete(world: &SearchWorld) {
    assert!(world.response().diagnostics.incomplete_vehicles.is_empty());
}

#[then("vehicle {vehicle} is reported incomplete")]
fn then_incomplete(vehicle: String, world: &SearchWorld) {
    assert_eq!(world.response().diagnostics.incomplete_vehicles, vec![vehicle]);
}

#[scenario(path = "tests/features/search_solver.feature", index = 0)]
fn relay_shortens_trip(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/search_solver.feature", index = 1)]
fn round_robin_partition(world: SearchWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/search_solver.feature", index = 2)]
fn isolated_customer_reported(world: SearchWorld) {
    let _ = world;
}
