//! # Runtime Configuration
//!
//! Settings loaded from environment variables.
//!
//! All configuration has sensible defaults and can be overridden via environment variables.

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HTTP_TIMEOUT_SECS};
use std::time::Duration;

/// HTTP settings used when the kubeconfig does not specify them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Request timeout of the base transport (seconds)
    pub http_timeout_secs: u64,
    /// Connect timeout of the base transport (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            http_timeout_secs: env_var_or_default(
                "AKS_EXEC_AUTH_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            ),
            connect_timeout_secs: env_var_or_default(
                "AKS_EXEC_AUTH_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
