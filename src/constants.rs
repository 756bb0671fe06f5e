//! # Constants
//!
//! Fixed identifiers and defaults shared across the crate.

use std::time::Duration;

/// Azure Kubernetes Service AAD server application ID.
///
/// Constant for every AKS cluster. Used as the default `--server-id` when the
/// kubeconfig exec section does not carry one.
pub const AKS_SERVER_ID: &str = "6dae42f8-4368-4678-94ff-3960e28e3630";

/// Suffix appended to the server ID to form the token scope
pub const SCOPE_SUFFIX: &str = "/.default";

/// Default upper bound for a single token acquisition (kubelogin `--timeout`)
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(60);

/// Default request timeout for the HTTP base transport (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout for the HTTP base transport (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "aks_exec_auth=info";

/// Program name used when handing exec arguments to the flag parser
pub const EXEC_PROGRAM_NAME: &str = "kubelogin";

// Keys of the credentials JSON payload
pub const CREDENTIALS_KEY_CLIENT_ID: &str = "clientId";
pub const CREDENTIALS_KEY_CLIENT_SECRET: &str = "clientSecret";
pub const CREDENTIALS_KEY_TENANT_ID: &str = "tenantId";
pub const CREDENTIALS_KEY_CLIENT_CERT: &str = "clientCertificate";
pub const CREDENTIALS_KEY_CLIENT_CERT_PASSWORD: &str = "clientCertificatePassword";
