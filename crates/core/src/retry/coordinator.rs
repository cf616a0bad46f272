//! Retry coordinator
//!
//! Decorates a [`StatementDispatcher`] and retries statements that fail with
//! `lock_not_available`:
//!
//! - success resets the attempt counter;
//! - non-retryable failures propagate unchanged;
//! - a lock timeout with the counter at the cap propagates unchanged;
//! - a lock timeout inside an open transaction escalates to
//!   [`ExecutionError::UnsafeRetryInTransaction`];
//! - otherwise the counter is incremented, a retry event is emitted, and the
//!   statement is re-dispatched after the policy delay.
//!
//! The delay races a [`CancellationToken`] so a cancelled run stops waiting
//! immediately.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use pgsafe_domain::constants::LOCK_NOT_AVAILABLE;
use pgsafe_domain::{DatabaseFailure, ExecutionError, Statement};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::classifier::Classify;
use super::observer::{RetryEvent, RetryObserver, TracingRetryObserver};
use super::policy::RetryPolicy;
use crate::dispatch::ports::{StatementDispatcher, TransactionInspector};

/// Lock-timeout retry wrapper around one connection's dispatcher.
///
/// The attempt counter belongs to this instance and lives as long as the
/// connection it wraps. It is only touched by the single sequential caller;
/// the atomic exists so the coordinator can sit behind an `Arc`.
pub struct RetryCoordinator {
    inner: Arc<dyn StatementDispatcher>,
    policy: RetryPolicy,
    observer: Arc<dyn RetryObserver>,
    cancel: CancellationToken,
    attempts: AtomicU32,
}

impl RetryCoordinator {
    /// Wrap a dispatcher with the default policy and tracing observer.
    pub fn new(inner: Arc<dyn StatementDispatcher>) -> Self {
        Self {
            inner,
            policy: RetryPolicy::default(),
            observer: Arc::new(TracingRetryObserver),
            cancel: CancellationToken::new(),
            attempts: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Abort retry waits when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Current value of the attempt counter.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Execute one statement, retrying lock timeouts per the policy.
    ///
    /// # Errors
    /// - [`ExecutionError::Database`] for non-retryable failures and for the
    ///   lock timeout that exhausted the attempt cap
    /// - [`ExecutionError::UnsafeRetryInTransaction`] when a lock timeout hits
    ///   an open transaction
    /// - [`ExecutionError::Cancelled`] when cancelled during a retry wait
    pub async fn execute(&self, statement: &Statement) -> Result<u64, ExecutionError> {
        loop {
            let failure = match self.inner.dispatch(statement).await {
                Ok(rows) => {
                    self.attempts.store(0, Ordering::Relaxed);
                    return Ok(rows);
                }
                Err(ExecutionError::Database(failure)) if failure.is_lock_timeout() => failure,
                Err(err) => return Err(err),
            };

            let attempt = self.attempts.load(Ordering::Relaxed);
            if attempt >= self.policy.max_attempts {
                debug!(
                    attempts = attempt,
                    sql = statement.sql(),
                    "lock timeout retries exhausted"
                );
                return Err(failure.into());
            }

            if self.in_transaction() {
                return Err(escalate(failure));
            }

            let attempt = attempt + 1;
            self.attempts.store(attempt, Ordering::Relaxed);
            self.observer.on_retry(&RetryEvent {
                attempt,
                max_attempts: self.policy.max_attempts,
                delay: self.policy.delay,
                sql: statement.sql(),
            });

            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    debug!(attempt, sql = statement.sql(), "retry wait cancelled");
                    return Err(ExecutionError::Cancelled);
                }
                () = tokio::time::sleep(self.policy.delay) => {}
            }
        }
    }

    /// Evaluated afresh on every failure; drivers that cannot report
    /// transaction state count as "no open transaction".
    fn in_transaction(&self) -> bool {
        self.inner.transaction_inspector().is_some_and(|inspector| inspector.in_transaction())
    }
}

fn escalate(failure: DatabaseFailure) -> ExecutionError {
    ExecutionError::UnsafeRetryInTransaction {
        code: failure.code().unwrap_or(LOCK_NOT_AVAILABLE).to_owned(),
        message: failure.message().to_owned(),
    }
}

#[async_trait]
impl StatementDispatcher for RetryCoordinator {
    async fn dispatch(&self, statement: &Statement) -> Result<u64, ExecutionError> {
        self.execute(statement).await
    }

    async fn batch_execute(&self, sql: &str) -> Result<(), ExecutionError> {
        self.inner.batch_execute(sql).await
    }

    fn transaction_inspector(&self) -> Option<&dyn TransactionInspector> {
        self.inner.transaction_inspector()
    }
}
