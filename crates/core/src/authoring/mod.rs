//! Migration authoring surface
//!
//! Builds the ordered statement list a migration runs. Schema helpers emit
//! the lock-friendly form of each change (concurrent index builds, `NOT VALID`
//! constraints validated separately, NOT NULL through a transient CHECK) and
//! validate names before anything is emitted.

pub mod plan;
pub mod script;
pub mod specs;
pub mod validation;

pub use plan::{MigrationPlan, Operation, PlannedOperation};
pub use script::MigrationScript;
pub use specs::{ForeignKeySpec, IndexSpec};
