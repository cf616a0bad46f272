//! Statement dispatch
//!
//! This module provides the ports a database driver implements so that the
//! retry coordinator and migration runner can issue statements through it.

pub mod ports;

pub use ports::{StatementDispatcher, TransactionInspector};
