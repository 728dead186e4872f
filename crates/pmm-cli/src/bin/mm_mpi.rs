use std::process::ExitCode;

use pmm_cli::{main_with, run_mpi, MpiArgs};

fn main() -> ExitCode {
    main_with::<MpiArgs, _>(|args, out| run_mpi(args, out))
}
