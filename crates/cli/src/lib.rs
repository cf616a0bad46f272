//! # pgsafe CLI
//!
//! Command-line layer - argument parsing, commands and wiring.
//!
//! This crate contains:
//! - The `pgsafe` argument model (clap derive)
//! - `plan` and `apply` commands
//! - Application context (configuration and cancellation)
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the tokio-postgres dispatcher through the wrapper gate
//! - `anyhow` is used at this edge only

pub mod commands;
pub mod context;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub use context::AppContext;

/// Lock-aware PostgreSQL schema migrations.
#[derive(Parser, Debug)]
#[command(name = "pgsafe", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the statements a plan would run, without connecting.
    Plan(PlanArgs),
    /// Run a plan against the configured database.
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Plan file (`.toml` or `.json`).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Plan file (`.toml` or `.json`).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Config file; otherwise the environment, then probed locations.
    #[arg(long, value_name = "PATH", env = "PGSAFE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Do not retry statements that fail with a lock timeout.
    #[arg(long)]
    pub no_retry: bool,
}

/// Dispatch a parsed command line.
///
/// # Errors
/// Any failure from the selected command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    match cli.command {
        Command::Plan(args) => commands::plan::execute(&args, &mut stdout),
        Command::Apply(args) => {
            let context = AppContext::load(args.config.clone(), args.no_retry)?;
            context.init_logging()?;
            context.cancel_on_ctrl_c();
            commands::apply::execute(&context, &args, &mut stdout).await
        }
    }
}
