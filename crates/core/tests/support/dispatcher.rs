use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use pgsafe_core::{RetryEvent, RetryObserver, StatementDispatcher, TransactionInspector};
use pgsafe_domain::{DatabaseFailure, ExecutionError, Statement};
use tokio::time::Instant;

/// A `55P03` failure as tokio-postgres reports it.
pub fn lock_timeout() -> Result<u64, ExecutionError> {
    failure("55P03", "canceling statement due to lock timeout")
}

pub fn failure(code: &str, message: &str) -> Result<u64, ExecutionError> {
    Err(DatabaseFailure::new(Some(code), message).into())
}

/// Dispatcher that replays queued outcomes and records every call.
///
/// Once the queue is drained every dispatch succeeds with zero rows.
#[derive(Default)]
pub struct ScriptedDispatcher {
    outcomes: Mutex<VecDeque<Result<u64, ExecutionError>>>,
    batch_outcomes: Mutex<VecDeque<Result<(), ExecutionError>>>,
    dispatched: Mutex<Vec<(String, Instant)>>,
    batches: Mutex<Vec<String>>,
    in_transaction: AtomicBool,
    reports_transactions: bool,
}

impl ScriptedDispatcher {
    /// Driver that cannot report transaction state.
    pub fn new(outcomes: Vec<Result<u64, ExecutionError>>) -> Self {
        Self { outcomes: Mutex::new(outcomes.into()), ..Self::default() }
    }

    /// Driver that exposes a transaction inspector.
    pub fn inspectable(outcomes: Vec<Result<u64, ExecutionError>>) -> Self {
        Self { reports_transactions: true, ..Self::new(outcomes) }
    }

    pub fn with_batch_outcomes(self, outcomes: Vec<Result<(), ExecutionError>>) -> Self {
        *self.batch_outcomes.lock().unwrap() = outcomes.into();
        self
    }

    pub fn push(&self, outcome: Result<u64, ExecutionError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn set_in_transaction(&self, open: bool) {
        self.in_transaction.store(open, Ordering::SeqCst);
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatched.lock().unwrap().len()
    }

    pub fn dispatched_sql(&self) -> Vec<String> {
        self.dispatched.lock().unwrap().iter().map(|(sql, _)| sql.clone()).collect()
    }

    /// Instants at which each dispatch was issued.
    pub fn dispatch_times(&self) -> Vec<Instant> {
        self.dispatched.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    pub fn batches(&self) -> Vec<String> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatementDispatcher for ScriptedDispatcher {
    async fn dispatch(&self, statement: &Statement) -> Result<u64, ExecutionError> {
        self.dispatched.lock().unwrap().push((statement.sql().to_owned(), Instant::now()));
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(0))
    }

    async fn batch_execute(&self, sql: &str) -> Result<(), ExecutionError> {
        self.batches.lock().unwrap().push(sql.to_owned());
        self.batch_outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn transaction_inspector(&self) -> Option<&dyn TransactionInspector> {
        if self.reports_transactions {
            Some(self)
        } else {
            None
        }
    }
}

impl TransactionInspector for ScriptedDispatcher {
    fn in_transaction(&self) -> bool {
        self.in_transaction.load(Ordering::SeqCst)
    }
}

/// Captured retry event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub attempt: u32,
    pub max_attempts: u32,
    pub delay_secs: u64,
    pub sql: String,
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Recorded>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl RetryObserver for RecordingObserver {
    fn on_retry(&self, event: &RetryEvent<'_>) {
        self.events.lock().unwrap().push(Recorded {
            attempt: event.attempt,
            max_attempts: event.max_attempts,
            delay_secs: event.delay.as_secs(),
            sql: event.sql.to_owned(),
        });
    }
}
