//! Error types used throughout the workspace

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::DatabaseFailure;

/// Failures raised while executing a statement through a dispatcher.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The database rejected the statement. Exhausted lock-timeout retries
    /// surface here too, carrying the last failure as reported by the driver.
    #[error(transparent)]
    Database(#[from] DatabaseFailure),

    /// A lock timeout occurred while a transaction was open on the connection.
    #[error(
        "cannot retry statement inside an open transaction (SQLSTATE {code}): {message}; \
         the transaction must be rolled back and the migration restarted"
    )]
    UnsafeRetryInTransaction { code: String, message: String },

    /// The run was cancelled while waiting to retry.
    #[error("statement execution cancelled while waiting to retry")]
    Cancelled,
}

impl ExecutionError {
    /// SQLSTATE carried by this error, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Database(failure) => failure.code(),
            Self::UnsafeRetryInTransaction { code, .. } => Some(code),
            Self::Cancelled => None,
        }
    }
}

/// Misuse of the authoring surface, detected before anything is dispatched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthoringError {
    #[error(
        "raw SQL cannot be added to a migration script: use `execute` or a schema helper \
         so the statement runs through the lock-timeout retry path ({sql})"
    )]
    ForbiddenRawStatementUsage { sql: String },

    #[error("{kind} name `{name}` is {length} bytes long, the maximum is {max}")]
    IdentifierTooLong { kind: &'static str, name: String, length: usize, max: usize },

    #[error("{kind} name must not be empty")]
    EmptyIdentifier { kind: &'static str },

    #[error(
        "table `{table}` declares a foreign key inline; add it with `add_foreign_key` instead"
    )]
    InlineForeignKey { table: String },

    #[error("{context} requires at least one column")]
    EmptyColumnList { context: String },

    #[error("statement has {values} parameter values but {types} type hints")]
    ParameterMismatch { values: usize, types: usize },
}

/// Main error type for pgsafe
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PgSafeError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ExecutionError> for PgSafeError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::Cancelled => Self::Cancelled,
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<AuthoringError> for PgSafeError {
    fn from(err: AuthoringError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result type alias for pgsafe operations
pub type Result<T> = std::result::Result<T, PgSafeError>;
