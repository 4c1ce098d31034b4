use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use trefoil::cli::{self, args::TrefoilArgs};

fn main() -> ExitCode {
    let args = TrefoilArgs::parse();
    let default_directive = cli::directive_for_verbosity(args.verbose);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli::run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            ExitCode::FAILURE
        }
    }
}
