//! Database failures as reported by a statement dispatcher.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::impl_domain_str_conversions;

/// A failure reported by the database for one dispatched statement.
///
/// `code` is the five-character SQLSTATE when the server supplied one.
/// Client-side failures (closed connection, parameter conversion) carry no
/// code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseFailure {
    code: Option<String>,
    message: String,
}

impl DatabaseFailure {
    /// Build a failure from an optional SQLSTATE and a message.
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self { code: code.map(str::to_owned), message: message.into() }
    }

    /// Build a failure that never reached the server.
    pub fn client(message: impl Into<String>) -> Self {
        Self { code: None, message: message.into() }
    }

    /// SQLSTATE reported by the server.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Human-readable message reported by the server or client.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DatabaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} (SQLSTATE {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DatabaseFailure {}

/// Retry classification of a [`DatabaseFailure`]. Derived on demand, never
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    RetryableLockTimeout,
    NonRetryable,
}

impl_domain_str_conversions!(FailureClass {
    RetryableLockTimeout => "retryable_lock_timeout",
    NonRetryable => "non_retryable",
});
