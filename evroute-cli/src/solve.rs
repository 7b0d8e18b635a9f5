//! Solve command implementation for the evroute CLI.

use std::io::{BufReader, Write};
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use evroute::{
    Problem, ProblemDescription, SolveRequest, SolveResponse, Solver, SolverKind, SolverSettings,
    build_solver, solve_with_time_limit,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::fs::{file_is_file, open_utf8_file};
use crate::{
    ARG_SOLVE_GENERATIONS, ARG_SOLVE_POPULATION, ARG_SOLVE_REQUEST, ARG_SOLVE_SEED,
    ARG_SOLVE_SOLVER, ARG_SOLVE_TIME_LIMIT, CliError, ENV_SOLVE_REQUEST,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Solve an electric-vehicle routing problem. The problem is \
                 read from a JSON file; the solver comes from --solver or, \
                 when unset, from the problem's \"label\" field. Options can \
                 also come from configuration files or EVROUTE_CMDS_SOLVE_* \
                 environment variables.",
    about = "Solve a routing problem"
)]
#[ortho_config(prefix = "EVROUTE")]
pub(crate) struct SolveArgs {
    /// Path to a JSON file containing a problem description.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Solver tag, e.g. "Heuristic(A*)" or a short name: search, genetic, exact.
    #[arg(long = ARG_SOLVE_SOLVER, value_name = "tag")]
    #[serde(default)]
    pub(crate) solver: Option<String>,
    /// Seed for the genetic solver (default 0).
    #[arg(long = ARG_SOLVE_SEED, value_name = "n")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Abandon the solve after this many seconds; 0 disables the limit.
    #[arg(long = ARG_SOLVE_TIME_LIMIT, value_name = "secs")]
    #[serde(default)]
    pub(crate) time_limit_secs: Option<u64>,
    /// Generations evolved by the genetic solver.
    #[arg(long = ARG_SOLVE_GENERATIONS, value_name = "n")]
    #[serde(default)]
    pub(crate) generations: Option<usize>,
    /// Population size of the genetic solver.
    #[arg(long = ARG_SOLVE_POPULATION, value_name = "n")]
    #[serde(default)]
    pub(crate) population_size: Option<usize>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON problem file.
    pub(crate) request_path: Utf8PathBuf,
    /// Explicit solver choice; `None` defers to the problem's label.
    pub(crate) solver: Option<SolverKind>,
    pub(crate) seed: u64,
    pub(crate) time_limit: Option<Duration>,
    pub(crate) settings: SolverSettings,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.request_path, ARG_SOLVE_REQUEST)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Pick the configured solver, falling back to the problem's label.
    pub(crate) fn select_solver(
        &self,
        description: &ProblemDescription,
    ) -> Result<SolverKind, CliError> {
        match (self.solver, description.label.as_deref()) {
            (Some(kind), _) => Ok(kind),
            (None, Some(label)) => Ok(label.parse()?),
            (None, None) => Err(CliError::NoSolverSelected),
        }
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_SOLVE_REQUEST,
            env: ENV_SOLVE_REQUEST,
        })?;
        let solver = args
            .solver
            .as_deref()
            .map(str::parse::<SolverKind>)
            .transpose()?;
        let time_limit = args
            .time_limit_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            request_path,
            solver,
            seed: args.seed.unwrap_or_default(),
            time_limit,
            settings: SolverSettings {
                generations: args.generations,
                population_size: args.population_size,
            },
        })
    }
}

/// Builds a solver instance for the current solve invocation.
pub(super) trait SolveSolverBuilder {
    fn build(
        &self,
        kind: SolverKind,
        settings: SolverSettings,
    ) -> Result<Box<dyn Solver>, CliError>;
}

pub(super) struct DefaultSolveSolverBuilder;

impl SolveSolverBuilder for DefaultSolveSolverBuilder {
    fn build(
        &self,
        kind: SolverKind,
        settings: SolverSettings,
    ) -> Result<Box<dyn Solver>, CliError> {
        Ok(build_solver(kind, settings)?)
    }
}

pub(super) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultSolveSolverBuilder;
    run_solve_with(args, &builder, &mut stdout)
}

pub(super) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn SolveSolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let response = execute_solve(args, builder)?;
    write_solve_response(writer, &response)
}

fn execute_solve(
    args: SolveArgs,
    builder: &dyn SolveSolverBuilder,
) -> Result<SolveResponse, CliError> {
    let config = resolve_solve_config(args)?;
    let description = load_problem(&config.request_path)?;
    let kind = config.select_solver(&description)?;
    let problem =
        Problem::from_description(&description).map_err(|source| CliError::InvalidProblem {
            path: config.request_path.clone(),
            source,
        })?;
    let solver = builder.build(kind, config.settings)?;
    log::info!("solving {} with {kind}", config.request_path);

    let request = SolveRequest::new(problem, config.seed);
    let outcome = match config.time_limit {
        Some(limit) => solve_with_time_limit(Arc::from(solver), Arc::new(request), limit),
        None => solver.solve(&request),
    };
    outcome.map_err(|source| CliError::Solve { source })
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`ProblemDescription`] from disk.
pub(super) fn load_problem(path: &Utf8Path) -> Result<ProblemDescription, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenProblem {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseProblem {
        path: path.to_path_buf(),
        source,
    })
}

fn write_solve_response(writer: &mut dyn Write, response: &SolveResponse) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(response).map_err(CliError::SerialiseSolveResponse)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteSolveOutput)?;
    writer
        .write_all(b"\n")
        .map_err(CliError::WriteSolveOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
