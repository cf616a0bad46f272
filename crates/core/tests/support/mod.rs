//! Shared test helpers for `pgsafe-core` integration tests.
//!
//! Lightweight in-memory dispatchers and observers so the retry and runner
//! suites can focus on behaviour instead of plumbing.

#![allow(dead_code)]

pub mod dispatcher;

pub use dispatcher::{lock_timeout, failure, RecordingObserver, ScriptedDispatcher};
