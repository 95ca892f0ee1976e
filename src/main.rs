use clap::Parser;
use filesort::cli::{Args, run_cli};
use filesort::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(logging::level_from_verbosity(args.verbose, args.quiet));
    run_cli(&args)
}
