//! Lock-timeout retry
//!
//! Classifies dispatch failures by SQLSTATE and retries `lock_not_available`
//! (`55P03`) a bounded number of times with a fixed delay, unless a
//! transaction is open on the connection.

pub mod classifier;
pub mod coordinator;
pub mod observer;
pub mod policy;

pub use classifier::{classify, Classify};
pub use coordinator::RetryCoordinator;
pub use observer::{RetryEvent, RetryObserver, TracingRetryObserver};
pub use policy::RetryPolicy;
