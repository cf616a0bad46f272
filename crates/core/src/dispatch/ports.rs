//! Port interfaces for statement dispatch

use async_trait::async_trait;
use pgsafe_domain::{ExecutionError, Statement};

/// Issues one SQL statement at a time against a database connection.
///
/// Implementations own no retry logic. Failures reported by the server are
/// returned as [`ExecutionError::Database`] with the SQLSTATE preserved.
#[async_trait]
pub trait StatementDispatcher: Send + Sync {
    /// Execute a single statement with its parameters and return the number
    /// of affected rows.
    async fn dispatch(&self, statement: &Statement) -> Result<u64, ExecutionError>;

    /// Execute parameterless SQL text over the simple query protocol.
    ///
    /// This path is never retried by the coordinator. Migration statements
    /// must go through [`StatementDispatcher::dispatch`].
    async fn batch_execute(&self, sql: &str) -> Result<(), ExecutionError>;

    /// Native transaction state of the underlying connection, when the driver
    /// can report it. `None` is treated as "no open transaction".
    fn transaction_inspector(&self) -> Option<&dyn TransactionInspector> {
        None
    }
}

/// Reports whether a transaction is currently open on a connection.
pub trait TransactionInspector: Send + Sync {
    fn in_transaction(&self) -> bool;
}
