//! Domain types and models

pub mod failure;
pub mod statement;

pub use failure::{DatabaseFailure, FailureClass};
pub use statement::{ParamType, SqlValue, Statement};
