//! Infrastructure error conversions

pub mod conversions;

pub use conversions::{execution_error, InfraError, IntoDatabaseFailure};
