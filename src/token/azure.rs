//! # Azure Identity Token Provider
//!
//! Builds service-principal credentials with `azure_identity` and adapts them
//! to [`TokenProvider`]. Token caching and refresh are done by the credential.

use super::{BearerToken, LoginFlow, ServicePrincipalFlow, ServicePrincipalSecret};
use super::{TokenProvider, TokenProviderFactory};
use crate::error::{ProviderError, TokenError};
use crate::options::{AuthOptions, AzureEnvironment};
use async_trait::async_trait;
use azure_core::credentials::{Secret, TokenCredential};
use azure_identity::ClientSecretCredential;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default [`TokenProviderFactory`] backed by `azure_identity`
#[derive(Debug, Default, Clone, Copy)]
pub struct AzureIdentityFactory;

impl TokenProviderFactory for AzureIdentityFactory {
    fn build(&self, options: &AuthOptions) -> Result<Arc<dyn TokenProvider>, ProviderError> {
        let LoginFlow::ServicePrincipal(flow) = LoginFlow::from_options(options)?;

        // The credential always talks to the public cloud authority
        let public_cloud = AzureEnvironment::PublicCloud.authority_host();
        if flow.authority_host.trim_end_matches('/') != public_cloud.trim_end_matches('/') {
            return Err(ProviderError::Unsupported(format!(
                "authority host {} is not supported, only {public_cloud}",
                flow.authority_host
            )));
        }

        let credential: Arc<dyn TokenCredential> = match &flow.secret {
            ServicePrincipalSecret::ClientSecret(secret) => {
                info!(
                    client_id = %flow.client_id,
                    tenant_id = %flow.tenant_id,
                    "Using Azure service principal authentication with client secret"
                );
                ClientSecretCredential::new(
                    &flow.tenant_id,
                    flow.client_id.clone(),
                    Secret::new(secret.clone()),
                    None,
                )
                .map_err(|e| ProviderError::Credential(Box::new(e)))?
            }
            ServicePrincipalSecret::ClientCertificate {
                certificate,
                password,
            } => {
                info!(
                    client_id = %flow.client_id,
                    tenant_id = %flow.tenant_id,
                    "Using Azure service principal authentication with client certificate"
                );
                certificate_credential(&flow, certificate, password.as_deref())?
            }
        };

        Ok(Arc::new(AzureTokenProvider::new(
            credential,
            flow.scope.clone(),
            flow.timeout,
        )))
    }
}

#[cfg(feature = "client-certificate")]
fn certificate_credential(
    flow: &ServicePrincipalFlow,
    certificate: &str,
    password: Option<&str>,
) -> Result<Arc<dyn TokenCredential>, ProviderError> {
    use azure_identity::{ClientCertificateCredential, ClientCertificateCredentialOptions};

    // Send only the leaf certificate
    let options = ClientCertificateCredentialOptions {
        send_certificate_chain: false,
        ..Default::default()
    };
    let credential: Arc<dyn TokenCredential> = ClientCertificateCredential::new(
        flow.tenant_id.clone(),
        flow.client_id.clone(),
        Secret::new(certificate.to_string()),
        Secret::new(password.unwrap_or_default().to_string()),
        Some(options),
    )
    .map_err(|e| ProviderError::Credential(Box::new(e)))?;

    Ok(credential)
}

#[cfg(not(feature = "client-certificate"))]
fn certificate_credential(
    _flow: &ServicePrincipalFlow,
    _certificate: &str,
    _password: Option<&str>,
) -> Result<Arc<dyn TokenCredential>, ProviderError> {
    Err(ProviderError::Unsupported(
        "client certificate authentication requires the `client-certificate` feature".to_string(),
    ))
}

/// [`TokenProvider`] over an `azure_core` credential for a single scope
pub struct AzureTokenProvider {
    credential: Arc<dyn TokenCredential>,
    scope: String,
    /// Zero means unbounded
    timeout: Duration,
}

impl std::fmt::Debug for AzureTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureTokenProvider")
            .field("scope", &self.scope)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AzureTokenProvider {
    pub fn new(credential: Arc<dyn TokenCredential>, scope: String, timeout: Duration) -> Self {
        Self {
            credential,
            scope,
            timeout,
        }
    }
}

#[async_trait]
impl TokenProvider for AzureTokenProvider {
    async fn token(&self) -> Result<BearerToken, TokenError> {
        let scopes = [self.scope.as_str()];
        let acquisition = self.credential.get_token(&scopes, None);

        let result = if self.timeout.is_zero() {
            acquisition.await
        } else {
            match tokio::time::timeout(self.timeout, acquisition).await {
                Ok(result) => result,
                Err(elapsed) => {
                    debug!(%elapsed, scope = %self.scope, "Azure token acquisition timed out");
                    return Err(TokenError::Timeout(self.timeout));
                }
            }
        };

        let access_token = result.map_err(|e| TokenError::Credential(Box::new(e)))?;
        Ok(BearerToken::new(access_token.token.secret()))
    }
}
