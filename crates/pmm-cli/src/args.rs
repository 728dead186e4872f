use std::ffi::OsString;
use std::num::NonZeroUsize;

use clap::{Args, Parser};
use pmm_core::Schedule;

use crate::error::{CliError, Result};

/// Usage text printed when the positional arguments are missing or invalid.
pub const USAGE: &str = "Arguments:<X> [<Y>]
X : Matrix size [X x X]
Y = 1: print the input/output matrix if X < 10
Y <> 1 or missing: does not print the input/output matrix";

/// Largest dimension for which matrices are printed.
pub const MAX_PRINT_DIM: usize = 9;

/// Positional arguments shared by both drivers.
#[derive(Args, Debug, Clone)]
pub struct MatrixArgs {
    /// Matrix size [N x N]
    #[arg(allow_negative_numbers = true)]
    pub size: i64,

    /// 1 prints the input and output matrices when N <= 9
    #[arg(allow_negative_numbers = true)]
    pub print: Option<String>,

    /// Anything after the print flag is accepted and ignored.
    #[arg(hide = true, allow_negative_numbers = true)]
    pub rest: Vec<String>,
}

/// Validated run parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub n: usize,
    pub print: bool,
}

impl MatrixArgs {
    /// Check N and resolve the print flag.
    ///
    /// # Errors
    /// Returns [`CliError::NonPositiveSize`] if N <= 0.
    pub fn settings(&self) -> Result<RunSettings> {
        if self.size <= 0 {
            return Err(CliError::NonPositiveSize);
        }
        let n = usize::try_from(self.size).map_err(|_| CliError::NonPositiveSize)?;
        let flag_set = self
            .print
            .as_deref()
            .is_some_and(|p| p.trim().parse::<i64>() == Ok(1));
        Ok(RunSettings {
            n,
            print: flag_set && n <= MAX_PRINT_DIM,
        })
    }
}

/// Distributed driver: one coordinator plus workers, each on its own unit.
#[derive(Parser, Debug, Clone)]
#[command(name = "mm-mpi", version, about = "Message-passing dense matrix multiply")]
pub struct MpiArgs {
    #[command(flatten)]
    pub matrix: MatrixArgs,

    /// Total execution units, coordinator included (default: cores + 1)
    #[arg(long = "np", env = "PMM_NUM_TASKS")]
    pub units: Option<usize>,
}

impl MpiArgs {
    pub fn resolved_units(&self) -> usize {
        self.units.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
                + 1
        })
    }
}

/// Shared-memory driver: one process, a pool of threads over one C buffer.
#[derive(Parser, Debug, Clone)]
#[command(name = "mm-omp", version, about = "Thread-parallel dense matrix multiply")]
pub struct OmpArgs {
    #[command(flatten)]
    pub matrix: MatrixArgs,

    /// Worker threads (default: available parallelism)
    #[arg(long, env = "PMM_NUM_THREADS")]
    pub threads: Option<NonZeroUsize>,

    /// Row scheduling: static or dynamic
    #[arg(long, default_value_t = Schedule::Static)]
    pub schedule: Schedule,

    /// Seed for the input generator (default: random)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Outcome of a successful parse.
#[derive(Debug)]
pub enum Parsed<T> {
    Run(T),
    /// `--help` or `--version` output to print before exiting successfully.
    Info(String),
}

/// Parse `argv`, folding every clap failure into [`CliError::Usage`].
pub fn parse_from<T, I, S>(argv: I) -> Result<Parsed<T>>
where
    T: Parser,
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    match T::try_parse_from(argv) {
        Ok(args) => Ok(Parsed::Run(args)),
        Err(e) if !e.use_stderr() => Ok(Parsed::Info(e.to_string())),
        Err(e) => Err(CliError::Usage(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<T: Parser>(argv: &[&str]) -> Result<T> {
        match parse_from::<T, _, _>(argv.iter().copied())? {
            Parsed::Run(args) => Ok(args),
            Parsed::Info(text) => panic!("unexpected info output: {text}"),
        }
    }

    fn mpi(argv: &[&str]) -> Result<MpiArgs> {
        run(argv)
    }

    fn omp(argv: &[&str]) -> Result<OmpArgs> {
        run(argv)
    }

    #[test]
    fn test_missing_size_is_usage_error() {
        assert!(matches!(mpi(&["mm-mpi"]), Err(CliError::Usage(_))));
        assert!(matches!(omp(&["mm-omp"]), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_non_numeric_size_is_usage_error() {
        assert!(matches!(mpi(&["mm-mpi", "abc"]), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_non_positive_size_rejected() {
        for size in ["0", "-4"] {
            let args = mpi(&["mm-mpi", size]).unwrap();
            assert!(matches!(
                args.matrix.settings(),
                Err(CliError::NonPositiveSize)
            ));
        }
    }

    #[test]
    fn test_print_flag() {
        let s = mpi(&["mm-mpi", "4", "1"]).unwrap().matrix.settings().unwrap();
        assert_eq!(s, RunSettings { n: 4, print: true });

        let s = mpi(&["mm-mpi", "4", "2"]).unwrap().matrix.settings().unwrap();
        assert!(!s.print);

        let s = mpi(&["mm-mpi", "4"]).unwrap().matrix.settings().unwrap();
        assert!(!s.print);
    }

    #[test]
    fn test_negative_print_flag_disables_printing() {
        let args = omp(&["mm-omp", "4", "-1"]).unwrap();
        assert_eq!(args.matrix.print.as_deref(), Some("-1"));
        let s = args.matrix.settings().unwrap();
        assert_eq!(s, RunSettings { n: 4, print: false });

        let args = mpi(&["mm-mpi", "4", "-1", "--np", "3"]).unwrap();
        assert!(!args.matrix.settings().unwrap().print);
        assert_eq!(args.resolved_units(), 3);
    }

    #[test]
    fn test_trailing_arguments_are_ignored() {
        let args = mpi(&["mm-mpi", "4", "1", "extra", "-7"]).unwrap();
        assert_eq!(args.matrix.rest, ["extra", "-7"]);
        assert_eq!(args.matrix.settings().unwrap(), RunSettings { n: 4, print: true });
    }

    #[test]
    fn test_print_suppressed_for_large_matrices() {
        let s = mpi(&["mm-mpi", "10", "1"]).unwrap().matrix.settings().unwrap();
        assert_eq!(s, RunSettings { n: 10, print: false });
        let s = mpi(&["mm-mpi", "9", "1"]).unwrap().matrix.settings().unwrap();
        assert!(s.print);
    }

    #[test]
    fn test_mpi_units() {
        let args = mpi(&["mm-mpi", "8", "--np", "3"]).unwrap();
        assert_eq!(args.resolved_units(), 3);
    }

    #[test]
    fn test_omp_options() {
        let args = omp(&[
            "mm-omp",
            "8",
            "--threads",
            "2",
            "--schedule",
            "dynamic",
            "--seed",
            "5",
        ])
        .unwrap();
        assert_eq!(args.threads, NonZeroUsize::new(2));
        assert_eq!(args.schedule, Schedule::Dynamic);
        assert_eq!(args.seed, Some(5));
    }

    #[test]
    fn test_omp_rejects_zero_threads() {
        assert!(matches!(
            omp(&["mm-omp", "8", "--threads", "0"]),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn test_help_is_not_an_error() {
        let parsed = parse_from::<OmpArgs, _, _>(["mm-omp", "--help"]).unwrap();
        assert!(matches!(parsed, Parsed::Info(text) if text.contains("--threads")));
    }
}
