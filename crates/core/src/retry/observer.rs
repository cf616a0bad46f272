//! Retry observation
//!
//! One event is emitted per retry attempt, before the delay.

use std::time::Duration;

use tracing::warn;

/// A retry about to happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryEvent<'a> {
    /// 1-based number of this retry.
    pub attempt: u32,
    pub max_attempts: u32,
    pub delay: Duration,
    pub sql: &'a str,
}

/// Sink for retry events.
pub trait RetryObserver: Send + Sync {
    fn on_retry(&self, event: &RetryEvent<'_>);
}

/// Emits each retry as a structured WARN event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRetryObserver;

impl RetryObserver for TracingRetryObserver {
    fn on_retry(&self, event: &RetryEvent<'_>) {
        warn!(
            attempt = event.attempt,
            max_attempts = event.max_attempts,
            delay_secs = event.delay.as_secs(),
            sql = event.sql,
            "retrying statement after lock timeout"
        );
    }
}
