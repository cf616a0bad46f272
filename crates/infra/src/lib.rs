//! # pgsafe Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The tokio-postgres statement dispatcher
//! - Configuration loading (environment, TOML, JSON)
//! - Migration plan file loading
//! - Logging initialisation
//!
//! ## Architecture
//! - Implements traits defined in `pgsafe-core`
//! - Contains all "impure" code (network, file system, process environment)

pub mod config;
pub mod database;
pub mod errors;
pub mod logging;
pub mod plans;

// Re-export commonly used items
pub use database::PgDispatcher;
pub use errors::InfraError;
