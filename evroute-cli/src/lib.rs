//! Command-line interface for the evroute solvers.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

mod error;
mod fs;
mod solve;

pub use error::CliError;
use solve::{SolveArgs, run_solve};

const ARG_SOLVE_REQUEST: &str = "request-path";
const ARG_SOLVE_SOLVER: &str = "solver";
const ARG_SOLVE_SEED: &str = "seed";
const ARG_SOLVE_TIME_LIMIT: &str = "time-limit-secs";
const ARG_SOLVE_GENERATIONS: &str = "generations";
const ARG_SOLVE_POPULATION: &str = "population-size";
const ENV_SOLVE_REQUEST: &str = "EVROUTE_CMDS_SOLVE_REQUEST_PATH";

/// Run the evroute CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when argument parsing, configuration, ingestion,
/// solving or output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.debug);
    match cli.command {
        Command::Solve(args) => run_solve(args),
    }
}

/// Route `log` records from the library crates to stderr.
fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_err() {
        log::debug!("a global subscriber was already installed");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "evroute",
    about = "Plan electric-vehicle pickup and delivery routes",
    version
)]
struct Cli {
    /// Emit debug-level solver logs on stderr.
    #[arg(short, long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a routing problem described in a JSON file.
    Solve(SolveArgs),
}

#[cfg(test)]
mod tests;
