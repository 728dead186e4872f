use std::io::Write;
use std::time::Instant;

use pmm_core::{Matrix, MultiplyEngine, SharedConfig, SharedMemoryEngine};
use pmm_dist::DistributedEngine;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::args::{MpiArgs, OmpArgs};
use crate::error::Result;
use crate::report::{format_seconds, write_matrix, RULE};

/// Run the distributed driver and write its report to `out`.
///
/// A is filled with `i + j` and B with `i * j`.
pub fn run_mpi<W: Write>(args: &MpiArgs, out: &mut W) -> Result<()> {
    let settings = args.matrix.settings()?;
    let units = args.resolved_units();
    let engine = DistributedEngine::new(units)?;
    let n = settings.n;

    writeln!(out, "mm-mpi has started with {units} tasks.")?;
    writeln!(out, "Initializing arrays...")?;
    let a = Matrix::from_fn(n, |i, j| (i + j) as f64)?;
    let b = Matrix::from_fn(n, |i, j| (i * j) as f64)?;
    if settings.print {
        writeln!(out, "Matrix a[n][n]:")?;
        write_matrix(out, &a)?;
        writeln!(out, "Matrix b[n][n]:")?;
        write_matrix(out, &b)?;
    }

    let start = Instant::now();
    let c = engine.multiply(&a, &b)?;
    let runtime = start.elapsed().as_secs_f64();
    info!(n, units, runtime, "distributed multiply finished");

    if settings.print {
        writeln!(out, "Result Matrix:")?;
        write_matrix(out, &c)?;
    }
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, " Matrix size is {n}")?;
    writeln!(
        out,
        "mm-mpi matrix multiplication runs in {} seconds",
        format_seconds(runtime)
    )?;
    writeln!(out, "Done.")?;
    Ok(())
}

/// Run the shared-memory driver and write its report to `out`.
///
/// A and B are drawn from [`Matrix::random_halves`], seeded by `--seed` when
/// given.
pub fn run_omp<W: Write>(args: &OmpArgs, out: &mut W) -> Result<()> {
    let settings = args.matrix.settings()?;
    let mut config = SharedConfig::default().with_schedule(args.schedule);
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    let engine = SharedMemoryEngine::new(config);
    let n = settings.n;

    writeln!(
        out,
        "Matrix multiplication is computed using max of threads = {} threads or cores",
        engine.threads()
    )?;
    writeln!(out, " Matrix size  = {n}")?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let a = Matrix::random_halves(n, &mut rng)?;
    let b = Matrix::random_halves(n, &mut rng)?;
    let mut c = Matrix::zeros(n)?;

    if settings.print {
        writeln!(out, "Matrix a[n][n]:")?;
        write_matrix(out, &a)?;
        writeln!(out, "Matrix b[n][n]:")?;
        write_matrix(out, &b)?;
    }

    let start = Instant::now();
    engine.multiply_into(&a, &b, &mut c)?;
    let runtime = start.elapsed().as_secs_f64();
    info!(n, threads = engine.threads(), runtime, "shared-memory multiply finished");

    if settings.print {
        writeln!(out, "Output matrix:")?;
        write_matrix(out, &c)?;
    }
    writeln!(out, "Program runs in {} seconds", format_seconds(runtime))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{parse_from, Parsed};
    use crate::error::CliError;

    fn parse<T: clap::Parser>(argv: &[&str]) -> T {
        match parse_from::<T, _, _>(argv.iter().copied()).unwrap() {
            Parsed::Run(args) => args,
            Parsed::Info(text) => panic!("unexpected info output: {text}"),
        }
    }

    #[test]
    fn test_run_mpi_prints_product() {
        let args: MpiArgs = parse(&["mm-mpi", "4", "1", "--np", "3"]);
        let mut out = Vec::new();
        run_mpi(&args, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("mm-mpi has started with 3 tasks.\n"));
        assert!(text.contains("Result Matrix:\n"));
        // A = i + j, B = i * j: the first row of C is 14 * j.
        assert!(text.contains("Row 1:\t0.00\t14.00\t28.00\t42.00\t\n"));
        assert!(text.contains(" Matrix size is 4\n"));
        assert!(text.ends_with("Done.\n"));
    }

    #[test]
    fn test_run_mpi_single_unit_is_fatal() {
        let args: MpiArgs = parse(&["mm-mpi", "4", "--np", "1"]);
        let mut out = Vec::new();
        let err = run_mpi(&args, &mut out).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_omp_seeded_output_is_stable() {
        let args: OmpArgs = parse(&["mm-omp", "3", "1", "--threads", "2", "--seed", "9"]);
        let mut first = Vec::new();
        let mut second = Vec::new();
        run_omp(&args, &mut first).unwrap();
        run_omp(&args, &mut second).unwrap();

        let strip = |buf: &[u8]| -> String {
            let text = String::from_utf8(buf.to_vec()).unwrap();
            text.lines()
                .filter(|l| !l.starts_with("Program runs in"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        assert_eq!(strip(&first), strip(&second));
        assert!(strip(&first).contains("Output matrix:"));
    }

    #[test]
    fn test_run_omp_rejects_zero_size() {
        let args: OmpArgs = parse(&["mm-omp", "0"]);
        let err = run_omp(&args, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::NonPositiveSize));
    }
}
