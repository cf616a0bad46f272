//! Application context - configuration and cancellation for one invocation

use std::path::PathBuf;

use pgsafe_core::WrapperGate;
use pgsafe_domain::{Config, Result};
use pgsafe_infra::{config, logging};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Conventional exit status for a process ended by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Everything a command needs besides its own arguments.
pub struct AppContext {
    pub config: Config,
    pub cancel: CancellationToken,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        Self { config, cancel: CancellationToken::new() }
    }

    /// Load configuration from `path`, or from the environment and probed
    /// files when `None`. `no_retry` forces the wrapper gate off.
    ///
    /// # Errors
    /// Returns `PgSafeError::Config` when no usable configuration is found.
    pub fn load(path: Option<PathBuf>, no_retry: bool) -> Result<Self> {
        let mut config = match path {
            Some(path) => config::load_from_file(Some(path))?,
            None => config::load()?,
        };
        if no_retry {
            config.retry.enabled = false;
        }
        Ok(Self::new(config))
    }

    /// # Errors
    /// Returns `PgSafeError::Config` for an invalid log level.
    pub fn init_logging(&self) -> Result<()> {
        logging::init(&self.config.logging)
    }

    /// Gate configured from `retry.*`, sharing this context's cancellation.
    pub fn gate(&self) -> WrapperGate {
        WrapperGate::from_config(&self.config.retry).with_cancellation(self.cancel.clone())
    }

    /// The first Ctrl-C cancels the run: retry waits end and no further
    /// statement is sent. A second Ctrl-C exits without waiting for the
    /// statement in flight.
    pub fn cancel_on_ctrl_c(&self) {
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            warn!("interrupt received, cancelling migration");
            cancel.cancel();

            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("second interrupt received, exiting");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        });
    }
}
