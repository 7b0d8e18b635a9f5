//! Behaviour-driven step definitions driving the solve CLI scenarios.

use super::helpers::{labelled_problem, utf8_workspace, write_problem, write_utf8};
use super::*;
use crate::solve::{SolveSolverBuilder, run_solve_with};
use camino::Utf8PathBuf;
use evroute::test_support::FixedSolver;
use evroute::{
    Diagnostics, SolveResponse, Solver, SolverKind, SolverSettings, VehicleRoute,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Debug)]
struct SolveWorld {
    _tmp: TempDir,
    request_path: Utf8PathBuf,
    include_request: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    built: RefCell<Option<SolverKind>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SolveWorld {
    fn new() -> Self {
        let (tmp, root) = utf8_workspace();
        Self {
            _tmp: tmp,
            request_path: root.join("problem.json"),
            include_request: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            built: RefCell::new(None),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["evroute".to_owned(), "solve".to_owned()];
        if *self.include_request.borrow() {
            argv.push(self.request_path.as_str().to_owned());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }
}

#[fixture]
fn world() -> SolveWorld {
    SolveWorld::new()
}

/// Records the requested kind and answers with one canned route.
struct StubSolveSolverBuilder<'a> {
    built: &'a RefCell<Option<SolverKind>>,
}

impl SolveSolverBuilder for StubSolveSolverBuilder<'_> {
    fn build(
        &self,
        kind: SolverKind,
        _settings: SolverSettings,
    ) -> Result<Box<dyn Solver>, CliError> {
        self.built.replace(Some(kind));
        let response = SolveResponse {
            routes: vec![VehicleRoute {
                vehicle_id: "EV-1".to_owned(),
                path: vec!["depot-0".to_owned(), "depot-0".to_owned()],
            }],
            diagnostics: Diagnostics::default(),
        };
        Ok(Box::new(FixedSolver::answering(response)))
    }
}

#[given("a problem labelled {label} exists on disk")]
fn labelled_problem_exists(#[from(world)] world: &SolveWorld, label: String) {
    write_problem(&world.request_path, &labelled_problem(label.trim_matches('"')));
}

#[given("the problem file contains invalid JSON")]
fn problem_contains_invalid_json(#[from(world)] world: &SolveWorld) {
    write_utf8(&world.request_path, b"{ not valid json");
}

#[given("the solver flag is {tag}")]
fn solver_flag_is(#[from(world)] world: &SolveWorld, tag: String) {
    world.cli_args.borrow_mut().extend([
        format!("--{ARG_SOLVE_SOLVER}"),
        tag.trim_matches('"').to_owned(),
    ]);
}

#[given("the request path is omitted")]
fn omit_request_path(#[from(world)] world: &SolveWorld) {
    *world.include_request.borrow_mut() = false;
}

#[when("I run the solve command")]
fn run_solve_command(#[from(world)] world: &SolveWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Solve(args) => {
            let builder = StubSolveSolverBuilder {
                built: &world.built,
            };
            let mut buffer = world.stdout.borrow_mut();
            run_solve_with(args, &builder, &mut *buffer)
        }
    });

    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints {count} route")]
fn command_succeeds_and_prints_routes(#[from(world)] world: &SolveWorld, count: usize) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");

    let stdout = String::from_utf8(world.stdout.borrow().clone()).expect("stdout utf-8");
    let response: SolveResponse =
        serde_json::from_str(&stdout).expect("output should be a JSON solve response");
    assert_eq!(response.routes.len(), count);
}

#[then("the stub built the {label} solver")]
fn stub_built_solver(#[from(world)] world: &SolveWorld, label: String) {
    let built = world.built.borrow().expect("solver built");
    assert_eq!(built.label(), label.trim_matches('"'));
}

#[then("the command fails because the problem JSON is invalid")]
fn command_fails_invalid_json(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::ParseProblem { path, .. } => assert_eq!(*path, world.request_path),
        other => panic!("expected ParseProblem, found {other:?}"),
    }
}

#[then("the command fails because the solver is unknown")]
fn command_fails_unknown_solver(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::UnknownSolver(source) => assert_eq!(source.label, "Simulated Annealing"),
        other => panic!("expected UnknownSolver, found {other:?}"),
    }
}

#[then("the command fails because the request path is missing")]
fn command_fails_missing_request_path(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_SOLVE_REQUEST),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_solve_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/solve_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SolveWorld) {
            let _ = world;
        }
    };
}

register_solve_scenario!(solve_labelled_problem, "solving a labelled problem from JSON");
register_solve_scenario!(
    solve_flag_overrides_label,
    "the solver flag overrides the problem label"
);
register_solve_scenario!(solve_invalid_json, "rejecting invalid JSON input");
register_solve_scenario!(solve_unknown_label, "rejecting unknown solver labels");
register_solve_scenario!(solve_missing_request, "rejecting missing request paths");
