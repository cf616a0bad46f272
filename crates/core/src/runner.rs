//! Sequential migration runner

use std::sync::Arc;
use std::time::Duration;

use pgsafe_domain::{ExecutionError, PgSafeError};
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::authoring::MigrationScript;
use crate::dispatch::ports::StatementDispatcher;

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub migration: String,
    pub statements: usize,
    pub rows_affected: u64,
    pub elapsed: Duration,
}

/// A statement failed; everything before `index` was applied.
#[derive(Debug, Error)]
#[error("migration `{migration}` failed at statement {index} ({sql}): {source}")]
pub struct RunError {
    pub migration: String,
    pub index: usize,
    pub sql: String,
    #[source]
    pub source: ExecutionError,
}

impl From<RunError> for PgSafeError {
    fn from(err: RunError) -> Self {
        match err.source {
            ExecutionError::Cancelled => Self::Cancelled,
            _ => Self::Database(err.to_string()),
        }
    }
}

/// Dispatches a script's statements one at a time through a single
/// dispatcher, which is usually a connection wrapped by the gate.
pub struct MigrationRunner {
    dispatcher: Arc<dyn StatementDispatcher>,
    cancel: CancellationToken,
}

impl MigrationRunner {
    pub fn new(dispatcher: Arc<dyn StatementDispatcher>) -> Self {
        Self { dispatcher, cancel: CancellationToken::new() }
    }

    /// Stop before the next statement once `cancel` fires. A statement
    /// already sent runs to completion.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// SQL text of every statement `run` would dispatch, in order.
    pub fn render(script: &MigrationScript) -> Vec<String> {
        script.statements().iter().map(|statement| statement.sql().to_owned()).collect()
    }

    /// Run every statement, stopping at the first failure or cancellation.
    ///
    /// # Errors
    /// [`RunError`] naming the failed statement and wrapping its
    /// [`ExecutionError`]; [`ExecutionError::Cancelled`] names the first
    /// statement that was not sent.
    #[instrument(skip_all, fields(migration = script.name()))]
    pub async fn run(&self, script: &MigrationScript) -> Result<RunReport, RunError> {
        let started = Instant::now();
        let statements = script.statements();
        let mut rows_affected = 0u64;

        for (index, statement) in statements.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(index, sql = statement.sql(), "migration cancelled");
                return Err(RunError {
                    migration: script.name().to_owned(),
                    index,
                    sql: statement.sql().to_owned(),
                    source: ExecutionError::Cancelled,
                });
            }

            match self.dispatcher.dispatch(statement).await {
                Ok(rows) => rows_affected += rows,
                Err(source) => {
                    error!(index, sql = statement.sql(), error = %source, "migration statement failed");
                    return Err(RunError {
                        migration: script.name().to_owned(),
                        index,
                        sql: statement.sql().to_owned(),
                        source,
                    });
                }
            }
        }

        let report = RunReport {
            migration: script.name().to_owned(),
            statements: statements.len(),
            rows_affected,
            elapsed: started.elapsed(),
        };
        info!(
            statements = report.statements,
            rows_affected = report.rows_affected,
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "migration applied"
        );
        Ok(report)
    }
}
