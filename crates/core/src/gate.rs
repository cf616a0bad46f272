//! Wrapper composition gate
//!
//! Decides, once per connection, whether the [`RetryCoordinator`] is
//! installed around that connection's dispatcher.

use std::sync::Arc;

use pgsafe_domain::RetryConfig;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::dispatch::ports::StatementDispatcher;
use crate::retry::{RetryCoordinator, RetryObserver, RetryPolicy, TracingRetryObserver};

/// Installs lock-timeout retry on new connections when enabled.
#[derive(Clone)]
pub struct WrapperGate {
    enabled: bool,
    policy: RetryPolicy,
    observer: Arc<dyn RetryObserver>,
    cancel: CancellationToken,
}

impl WrapperGate {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            policy: RetryPolicy::default(),
            observer: Arc::new(TracingRetryObserver),
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.enabled).with_policy(RetryPolicy::from(config))
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

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wrap a freshly acquired connection.
    ///
    /// Each call builds a new coordinator, so every connection starts with its
    /// own zeroed attempt counter. When the gate is disabled the dispatcher is
    /// returned untouched.
    pub fn wrap(&self, dispatcher: Arc<dyn StatementDispatcher>) -> Arc<dyn StatementDispatcher> {
        if !self.enabled {
            debug!("lock-timeout retry disabled, dispatching without retry");
            return dispatcher;
        }

        debug!(
            max_attempts = self.policy.max_attempts,
            delay_secs = self.policy.delay.as_secs(),
            "installing lock-timeout retry"
        );

        Arc::new(
            RetryCoordinator::new(dispatcher)
                .with_policy(self.policy)
                .with_observer(Arc::clone(&self.observer))
                .with_cancellation(self.cancel.clone()),
        )
    }
}

impl Default for WrapperGate {
    fn default() -> Self {
        Self::new(true)
    }
}
