//! Retry policy

use std::time::Duration;

use pgsafe_domain::constants::{MAX_ATTEMPTS, RETRY_DELAY_SECONDS};
use pgsafe_domain::RetryConfig;

/// Attempt cap and fixed delay applied by one coordinator.
///
/// A policy is chosen when a connection is wrapped and never changes per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: MAX_ATTEMPTS, delay: Duration::from_secs(RETRY_DELAY_SECONDS) }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self { max_attempts: config.max_attempts, delay: config.delay() }
    }
}
