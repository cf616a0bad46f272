//! CLI commands
//!
//! Each command writes its user-facing output to the given writer; logs go
//! through `tracing`.

pub mod apply;
pub mod plan;
