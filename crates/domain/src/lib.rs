//! # pgsafe Domain
//!
//! Data model shared by every pgsafe crate.
//!
//! This crate contains:
//! - Statements, parameter values and type hints
//! - Database failures and their classification
//! - Configuration structures
//! - Retry and identifier constants
//! - The top-level error type and `Result` alias
//!
//! ## Architecture
//! - No dependencies on other pgsafe crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
