//! pgsafe - lock-aware PostgreSQL migrations
//!
//! Main entry point for the command-line tool.

use std::process::ExitCode;

use clap::Parser;
use pgsafe_cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match pgsafe_cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "pgsafe failed");
            report(&err);
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::print_stderr)]
fn report(err: &anyhow::Error) {
    eprintln!("error: {err:#}");
}
