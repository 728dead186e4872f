use std::process::ExitCode;

use pmm_cli::{main_with, run_omp, OmpArgs};

fn main() -> ExitCode {
    main_with::<OmpArgs, _>(|args, out| run_omp(args, out))
}
