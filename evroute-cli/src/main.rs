//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use std::process::ExitCode;

#[expect(clippy::print_stderr, reason = "the binary reports fatal errors on stderr")]
fn main() -> ExitCode {
    match evroute_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(evroute_cli::CliError::ArgumentParsing(err)) => {
            let code = err.exit_code();
            let printed = err.print();
            if printed.is_err() {
                eprintln!("evroute: {err}");
            }
            ExitCode::from(u8::try_from(code).unwrap_or(2))
        }
        Err(err) => {
            eprintln!("evroute: {err}");
            ExitCode::FAILURE
        }
    }
}
