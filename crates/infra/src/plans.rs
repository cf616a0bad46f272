//! Migration plan files
//!
//! Plans are TOML or JSON, chosen by file extension. See
//! `pgsafe_core::authoring::plan` for the format.

use std::path::Path;

use pgsafe_core::MigrationPlan;
use pgsafe_domain::{PgSafeError, Result};

use crate::errors::InfraError;

/// Read and parse a plan file.
///
/// # Errors
/// Returns `PgSafeError::Config` when the file cannot be read, has an
/// unsupported extension, or does not describe a valid plan.
pub fn load_plan(path: &Path) -> Result<MigrationPlan> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        PgSafeError::Config(format!("Failed to read plan file {}: {e}", path.display()))
    })?;

    let plan = parse_plan(&contents, path)?;
    tracing::debug!(
        path = %path.display(),
        migration = %plan.name,
        operations = plan.operations.len(),
        "Loaded migration plan"
    );
    Ok(plan)
}

/// Parse plan text, detecting the format from `path`'s extension.
///
/// # Errors
/// Returns `PgSafeError::Config` for unsupported extensions or invalid
/// content.
pub fn parse_plan(contents: &str, path: &Path) -> Result<MigrationPlan> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    let parsed = match extension {
        "toml" => toml::from_str(contents).map_err(InfraError::from),
        "json" => serde_json::from_str(contents).map_err(InfraError::from),
        _ => return Err(PgSafeError::Config(format!("Unsupported plan format: {extension}"))),
    };
    parsed.map_err(PgSafeError::from)
}
