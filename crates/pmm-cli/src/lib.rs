//! `pmm-cli` - Drivers for the `mm-mpi` and `mm-omp` binaries.
//!
//! Both take `<N> [<printFlag>]`, build their inputs, time one multiply, and
//! print a short report. Argument errors exit with status 1 after printing
//! the usage text.

pub mod args;
pub mod error;
pub mod logging;
pub mod report;
pub mod run;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

pub use args::{parse_from, MatrixArgs, MpiArgs, OmpArgs, Parsed, RunSettings, USAGE};
pub use error::{CliError, Result};
pub use run::{run_mpi, run_omp};

/// Shared `main` body: parse the process arguments, run, and map failures to
/// an exit status.
pub fn main_with<T, F>(run: F) -> ExitCode
where
    T: Parser,
    F: FnOnce(&T, &mut io::StdoutLock<'_>) -> Result<()>,
{
    logging::init();

    let args = match parse_from::<T, _, _>(std::env::args_os()) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Info(text)) => {
            print!("{text}");
            return ExitCode::SUCCESS;
        }
        Err(e) => return fail(&e),
    };

    let mut out = io::stdout().lock();
    let result = run(&args, &mut out).and_then(|()| out.flush().map_err(CliError::from));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn fail(e: &CliError) -> ExitCode {
    match e {
        CliError::Usage(reason) => {
            eprint!("{reason}");
            println!("{USAGE}");
        }
        CliError::NonPositiveSize => println!("{e}"),
        _ => {
            debug!(error = ?e, "run aborted");
            eprintln!("{e}");
        }
    }
    ExitCode::from(e.exit_code())
}
