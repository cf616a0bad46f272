//! Conversions from external infrastructure errors into domain errors.

use pgsafe_domain::{DatabaseFailure, ExecutionError, PgSafeError};
use tokio_postgres::Error as PgError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PgSafeError);

impl From<InfraError> for PgSafeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PgSafeError> for InfraError {
    fn from(value: PgSafeError) -> Self {
        Self(value)
    }
}

/// Turns driver errors into the failure shape the retry classifier reads.
pub trait IntoDatabaseFailure {
    fn into_failure(self) -> DatabaseFailure;
}

/* -------------------------------------------------------------------------- */
/* tokio_postgres::Error → DatabaseFailure */
/* -------------------------------------------------------------------------- */

impl IntoDatabaseFailure for PgError {
    fn into_failure(self) -> DatabaseFailure {
        // Server errors carry the SQLSTATE and the bare server message;
        // client-side errors (closed connection, protocol) have no code.
        match self.as_db_error() {
            Some(db) => DatabaseFailure::new(Some(db.code().code()), db.message()),
            None => DatabaseFailure::client(self.to_string()),
        }
    }
}

/// Shorthand used by the dispatcher on every driver call.
pub fn execution_error(err: PgError) -> ExecutionError {
    ExecutionError::Database(err.into_failure())
}

impl From<PgError> for InfraError {
    fn from(value: PgError) -> Self {
        Self(PgSafeError::Database(value.into_failure().to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* File and format errors → PgSafeError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        Self(PgSafeError::Config(format!("I/O error: {value}")))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        Self(PgSafeError::Config(format!("Invalid TOML format: {value}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        Self(PgSafeError::Config(format!("Invalid JSON format: {value}")))
    }
}
