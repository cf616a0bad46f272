use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use pgsafe_core::MigrationRunner;
use pgsafe_domain::PgSafeError;
use pgsafe_infra::plans::load_plan;
use pgsafe_infra::PgDispatcher;
use tracing::info;

use crate::{AppContext, ApplyArgs};

/// Validate a plan, connect, and run it through the wrapper gate.
///
/// Authoring errors are reported before any connection is opened.
///
/// # Errors
/// Plan, connection or execution failures.
pub async fn execute(
    context: &AppContext,
    args: &ApplyArgs,
    out: &mut (impl Write + Send),
) -> anyhow::Result<()> {
    let plan = load_plan(&args.file)?;
    let script = plan
        .into_script()
        .with_context(|| format!("invalid migration plan {}", args.file.display()))?;

    let gate = context.gate();
    info!(
        migration = script.name(),
        retry = gate.is_enabled(),
        "applying migration"
    );

    let dispatcher = PgDispatcher::connect(&context.config.database)
        .await
        .map_err(PgSafeError::from)
        .context("failed to connect to the database")?;

    let runner = MigrationRunner::new(gate.wrap(Arc::new(dispatcher)))
        .with_cancellation(context.cancel.clone());
    let report = runner.run(&script).await?;

    writeln!(
        out,
        "applied {} ({} statements, {} rows) in {:.1}s",
        report.migration,
        report.statements,
        report.rows_affected,
        report.elapsed.as_secs_f64()
    )?;
    Ok(())
}
