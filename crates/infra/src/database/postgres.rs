//! tokio-postgres implementation of the statement dispatcher port.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pgsafe_core::{StatementDispatcher, TransactionInspector};
use pgsafe_domain::{DatabaseConfig, ExecutionError, PgSafeError, Statement};
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, error, info};

use super::params::{bind_all, pg_type};
use crate::errors::{execution_error, InfraError};

/// One PostgreSQL session.
///
/// Tracks whether a transaction is open from the `BEGIN`/`COMMIT`/`ROLLBACK`
/// statements it sends, including every statement of a batch, so the retry coordinator can refuse to replay a
/// statement inside an aborted transaction.
pub struct PgDispatcher {
    client: Client,
    connection: JoinHandle<()>,
    in_transaction: AtomicBool,
}

impl PgDispatcher {
    /// Open a session and spawn its connection driver.
    ///
    /// # Errors
    /// Returns `PgSafeError::Config` for an unparsable URL and
    /// `PgSafeError::Database` when the server cannot be reached.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, InfraError> {
        let mut pg_config = config
            .url
            .parse::<tokio_postgres::Config>()
            .map_err(|e| PgSafeError::Config(format!("Invalid database URL: {e}")))?;
        pg_config.connect_timeout(config.connect_timeout());

        let (client, connection) = pg_config.connect(NoTls).await?;
        let connection = tokio::spawn(async move {
            if let Err(err) = connection.await {
                error!(error = %err, "postgres connection terminated");
            }
        });

        info!("connected to postgres");
        Ok(Self { client, connection, in_transaction: AtomicBool::new(false) })
    }

    /// # Errors
    /// The driver error, as a [`ExecutionError::Database`].
    pub async fn begin(&self) -> Result<(), ExecutionError> {
        self.batch_execute("BEGIN").await
    }

    /// # Errors
    /// The driver error, as a [`ExecutionError::Database`].
    pub async fn commit(&self) -> Result<(), ExecutionError> {
        self.batch_execute("COMMIT").await
    }

    /// # Errors
    /// The driver error, as a [`ExecutionError::Database`].
    pub async fn rollback(&self) -> Result<(), ExecutionError> {
        self.batch_execute("ROLLBACK").await
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    fn track(&self, sql: &str) {
        if let Some(open) = transaction_effect(sql) {
            self.in_transaction.store(open, Ordering::Relaxed);
        }
    }

    fn track_failure(&self, sql: &str) {
        if let Some(open) = failed_transaction_effect(sql) {
            self.in_transaction.store(open, Ordering::Relaxed);
        }
    }
}

#[async_trait]
impl StatementDispatcher for PgDispatcher {
    async fn dispatch(&self, statement: &Statement) -> Result<u64, ExecutionError> {
        debug!(sql = statement.sql(), params = statement.params().len(), "dispatching statement");

        let rows = if statement.params().is_empty() {
            self.client.execute(statement.sql(), &[]).await
        } else {
            let types: Vec<_> = statement.param_types().iter().copied().map(pg_type).collect();
            let prepared =
                self.client.prepare_typed(statement.sql(), &types).await.map_err(execution_error)?;
            let params = bind_all(statement.params(), statement.param_types())?;
            let refs: Vec<&(dyn ToSql + Sync)> =
                params.iter().map(|p| &**p as &(dyn ToSql + Sync)).collect();
            self.client.execute(&prepared, &refs).await
        };

        match rows {
            Ok(rows) => {
                self.track(statement.sql());
                Ok(rows)
            }
            Err(err) => {
                self.track_failure(statement.sql());
                Err(execution_error(err))
            }
        }
    }

    async fn batch_execute(&self, sql: &str) -> Result<(), ExecutionError> {
        debug!(sql, "executing batch");
        match self.client.batch_execute(sql).await {
            Ok(()) => {
                self.track(sql);
                Ok(())
            }
            Err(err) => {
                self.track_failure(sql);
                Err(execution_error(err))
            }
        }
    }

    fn transaction_inspector(&self) -> Option<&dyn TransactionInspector> {
        Some(self)
    }
}

impl TransactionInspector for PgDispatcher {
    fn in_transaction(&self) -> bool {
        self.in_transaction.load(Ordering::Relaxed)
    }
}

impl Drop for PgDispatcher {
    fn drop(&mut self) {
        self.connection.abort();
    }
}

/// Net effect of `sql` on the session's transaction state: `Some(true)` when
/// the last transaction-control statement opens one, `Some(false)` when it
/// ends one, `None` when the text contains no transaction control.
fn transaction_effect(sql: &str) -> Option<bool> {
    split_statements(sql).filter_map(statement_effect).last()
}

/// State after `sql` failed part way.
///
/// A failed `COMMIT`/`END`/`ROLLBACK`/`ABORT` on its own still ends the
/// transaction. Text that opens a transaction and then fails leaves it open
/// in the aborted state, since the statements after the error never ran.
fn failed_transaction_effect(sql: &str) -> Option<bool> {
    let effects: Vec<bool> = split_statements(sql).filter_map(statement_effect).collect();
    match effects.as_slice() {
        [] => None,
        [false] if split_statements(sql).count() == 1 => Some(false),
        _ if effects.contains(&true) => Some(true),
        _ => None,
    }
}

fn statement_effect(statement: &str) -> Option<bool> {
    let mut words = statement.split_whitespace().map(str::to_ascii_uppercase);
    match words.next()?.as_str() {
        "BEGIN" => Some(true),
        "START" if words.next().as_deref() == Some("TRANSACTION") => Some(true),
        "COMMIT" | "END" | "ROLLBACK" | "ABORT" => {
            // `ROLLBACK TO SAVEPOINT` keeps the transaction open.
            if words.next().as_deref() == Some("TO") {
                None
            } else {
                Some(false)
            }
        }
        _ => None,
    }
}

/// Non-blank statements of `sql`, split on `;` outside single-quoted literals.
fn split_statements(sql: &str) -> impl Iterator<Item = &str> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut quoted = false;

    for (index, ch) in sql.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            ';' if !quoted => {
                statements.push(&sql[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    statements.push(&sql[start..]);

    statements.into_iter().map(str::trim).filter(|statement| !statement.is_empty())
}
