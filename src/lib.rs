//! # AKS Exec Auth
//!
//! Converts a kubeconfig that authenticates through the kubelogin exec
//! plugin into in-process Azure AD service-principal authentication.
//!
//! ## Overview
//!
//! 1. **Decode credentials** - A flat JSON object with `clientId`,
//!    `clientSecret`, `tenantId`, `clientCertificate` and
//!    `clientCertificatePassword`
//! 2. **Parse exec arguments** - The kubelogin `get-token` flags found in the
//!    kubeconfig exec section
//! 3. **Merge** - Credentials override the arguments and service-principal
//!    login is forced
//! 4. **Build a token provider** - `azure_identity` credentials by default
//! 5. **Rewrite** - The exec section is removed and every request carries a
//!    bearer token
//!
//! ## Usage
//!
//! ```no_run
//! use aks_exec_auth::{wrap_rest_config, RestConfig, RuntimeConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let mut config = RestConfig::from_kubeconfig(None, None).await?;
//! let credentials = std::fs::read("azure-credentials.json")?;
//! wrap_rest_config(&mut config, &credentials)?;
//!
//! let client = config.http_client(&RuntimeConfig::from_env())?;
//! let version = client.get("/version").await?.text().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod observability;
pub mod options;
pub mod rest;
pub mod rewrite;
pub mod token;
pub mod transport;

pub use config::RuntimeConfig;
pub use credentials::CredentialSet;
pub use error::{
    ArgumentParseError, ConversionError, DecodeError, ProviderError, TokenError, TransportError,
};
pub use options::{AuthOptions, AzureEnvironment, LoginMethod};
pub use rest::RestConfig;
pub use rewrite::{merged_options, wrap_rest_config, ConfigRewriter};
pub use token::{AzureIdentityFactory, BearerToken, TokenProvider, TokenProviderFactory};
pub use transport::{BearerTokenTransport, RestClient, SharedTransport, Transport};
