//! # pgsafe Core
//!
//! Pure migration-safety logic - no database driver dependencies.
//!
//! This crate contains:
//! - Port interfaces for statement dispatch, transaction inspection and
//!   retry observation (traits)
//! - The lock-timeout classifier and retry coordinator
//! - The wrapper composition gate
//! - The migration authoring surface and runner
//!
//! ## Architecture Principles
//! - Only depends on `pgsafe-domain`
//! - No database, network or file-system code
//! - All external dependencies via traits
//! - Pure, testable logic

pub mod authoring;
pub mod dispatch;
pub mod gate;
pub mod retry;
pub mod runner;

// Re-export specific items to avoid ambiguity
pub use authoring::{
    ForeignKeySpec, IndexSpec, MigrationPlan, MigrationScript, Operation, PlannedOperation,
};
pub use dispatch::ports::{StatementDispatcher, TransactionInspector};
pub use gate::WrapperGate;
pub use retry::{
    classify, Classify, RetryCoordinator, RetryEvent, RetryObserver, RetryPolicy,
    TracingRetryObserver,
};
pub use runner::{MigrationRunner, RunError, RunReport};
