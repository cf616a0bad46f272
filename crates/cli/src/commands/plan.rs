use std::io::Write;

use anyhow::Context;
use pgsafe_core::MigrationRunner;
use pgsafe_infra::plans::load_plan;

use crate::PlanArgs;

/// Validate a plan and print its statements, one per line, `;`-terminated.
///
/// # Errors
/// The plan cannot be loaded or fails authoring validation.
pub fn execute(args: &PlanArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let plan = load_plan(&args.file)?;
    let script = plan
        .into_script()
        .with_context(|| format!("invalid migration plan {}", args.file.display()))?;

    writeln!(out, "-- migration: {}", script.name())?;
    for sql in MigrationRunner::render(&script) {
        writeln!(out, "{sql};")?;
    }
    Ok(())
}
