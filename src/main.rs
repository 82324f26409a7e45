//! hiera command line
//!
//! Resolves a hierarchy config and prints the flattened result.

use std::process::ExitCode;

use clap::Parser;
use hiera::cli::{self, Cli};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {e}");
    }

    match cli::run(&cli) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", cli::report(&err, cli.traceback));
            ExitCode::FAILURE
        }
    }
}
