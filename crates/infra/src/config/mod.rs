//! Configuration loading and management
//!
//! This module provides utilities for loading pgsafe configuration
//! from environment variables and files.

pub mod loader;

// Re-export commonly used items
pub use loader::{apply_env_overrides, load, load_from_env, load_from_file, probe_config_paths};
