//! Domain constants
//!
//! Centralized location for the retry policy defaults and PostgreSQL limits
//! used throughout the workspace.

// Retry policy
pub const MAX_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY_SECONDS: u64 = 10;

// PostgreSQL SQLSTATE for `lock_not_available`
pub const LOCK_NOT_AVAILABLE: &str = "55P03";

// NAMEDATALEN - 1
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

// Database defaults
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";
