//! # Observability
//!
//! Tracing subscriber setup for the binary and for embedding applications
//! that do not install their own.

use crate::constants::DEFAULT_LOG_FILTER;
use tracing::warn;

/// Install a `fmt` subscriber filtered by `RUST_LOG`
///
/// Falls back to `aks_exec_auth=info` when `RUST_LOG` is unset or invalid.
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!("Tracing subscriber init returned error (may already be initialized): {}", e);
    }
}
