//! PostgreSQL adapter
//!
//! Implements `StatementDispatcher` and `TransactionInspector` on top of a
//! single tokio-postgres session.

pub mod params;
pub mod postgres;

pub use postgres::PgDispatcher;
