//! Lock-timeout classifier

use pgsafe_domain::constants::LOCK_NOT_AVAILABLE;
use pgsafe_domain::{DatabaseFailure, ExecutionError, FailureClass};

/// Classify a failure by its SQLSTATE.
///
/// Only `lock_not_available` is retryable. Missing and unknown codes are not.
pub fn classify(code: Option<&str>) -> FailureClass {
    match code {
        Some(LOCK_NOT_AVAILABLE) => FailureClass::RetryableLockTimeout,
        _ => FailureClass::NonRetryable,
    }
}

/// Failure types that can be classified for retry.
pub trait Classify {
    fn class(&self) -> FailureClass;

    fn is_lock_timeout(&self) -> bool {
        self.class() == FailureClass::RetryableLockTimeout
    }
}

impl Classify for DatabaseFailure {
    fn class(&self) -> FailureClass {
        classify(self.code())
    }
}

impl Classify for ExecutionError {
    /// Only raw database failures are retryable; an escalated or cancelled
    /// execution never is.
    fn class(&self) -> FailureClass {
        match self {
            Self::Database(failure) => failure.class(),
            Self::UnsafeRetryInTransaction { .. } | Self::Cancelled => FailureClass::NonRetryable,
        }
    }
}
