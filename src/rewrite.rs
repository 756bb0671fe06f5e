//! # Exec Plugin Conversion
//!
//! Replaces the kubelogin exec plugin of a [`RestConfig`] with in-process
//! service-principal authentication.
//!
//! ## Steps
//!
//! 1. Decode the credentials payload
//! 2. Parse the exec plugin arguments into [`AuthOptions`]
//! 3. Merge the credentials and force service-principal login
//! 4. Build the token provider
//! 5. Remove the exec plugin and wrap the transport chain with a
//!    [`BearerTokenTransport`]
//!
//! The configuration is only mutated once every fallible step has succeeded.

use crate::credentials::CredentialSet;
use crate::error::ConversionError;
use crate::options::AuthOptions;
use crate::rest::RestConfig;
use crate::token::{AzureIdentityFactory, TokenProvider, TokenProviderFactory};
use crate::transport::{BearerTokenTransport, SharedTransport};
use std::sync::Arc;
use tracing::{info, warn};

/// Converts exec plugin configurations using a [`TokenProviderFactory`]
#[derive(Debug, Clone, Default)]
pub struct ConfigRewriter<F = AzureIdentityFactory> {
    factory: F,
}

impl ConfigRewriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: TokenProviderFactory> ConfigRewriter<F> {
    pub fn with_factory(factory: F) -> Self {
        Self { factory }
    }

    /// Build the token provider the conversion would install
    ///
    /// Runs every conversion step that can fail without touching `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] if the credentials cannot be decoded, the
    /// exec arguments cannot be parsed or the provider cannot be built.
    pub fn token_provider(
        &self,
        config: &RestConfig,
        credentials: &[u8],
    ) -> Result<Arc<dyn TokenProvider>, ConversionError> {
        let options = merged_options(config, credentials)?;
        self.factory.build(&options).map_err(|e| {
            warn!(
                login_method = %options.login_method,
                error = %e,
                "Failed to build token provider"
            );
            ConversionError::ProviderConstruction(e)
        })
    }

    /// Convert `config` in place
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] on any failed step, leaving `config`
    /// unchanged.
    pub fn rewrite(
        &self,
        config: &mut RestConfig,
        credentials: &[u8],
    ) -> Result<(), ConversionError> {
        let provider = self.token_provider(config, credentials)?;

        let removed = config.clear_exec_provider();
        config.wrap(move |base: SharedTransport| {
            Arc::new(BearerTokenTransport::new(Arc::clone(&provider), base)) as SharedTransport
        });

        info!(
            exec_command = removed.as_ref().and_then(|exec| exec.command.as_deref()),
            wrappers = config.wrapper_count(),
            "Replaced exec plugin with service principal bearer token authentication"
        );
        Ok(())
    }
}

/// Decode `credentials` and merge them over the exec arguments of `config`
///
/// # Errors
///
/// Returns [`ConversionError::Decode`] or [`ConversionError::ArgumentParse`].
pub fn merged_options(
    config: &RestConfig,
    credentials: &[u8],
) -> Result<AuthOptions, ConversionError> {
    let credentials = CredentialSet::decode(credentials)?;

    let mut options = AuthOptions::from_exec_args(config.exec_args())
        .map_err(ConversionError::ArgumentParse)?;
    options.merge_credentials(&credentials);
    Ok(options)
}

/// Convert `config` with the default Azure identity factory
///
/// # Errors
///
/// See [`ConfigRewriter::rewrite`].
pub fn wrap_rest_config(config: &mut RestConfig, credentials: &[u8]) -> Result<(), ConversionError> {
    ConfigRewriter::new().rewrite(config, credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProviderError, TokenError, TransportError};
    use crate::options::LoginMethod;
    use crate::token::{BearerToken, LoginFlow};
    use crate::transport::{RestClient, Transport};
    use async_trait::async_trait;
    use reqwest::header::AUTHORIZATION;
    use reqwest::{Request, Response};
    use serde_json::json;
    use std::error::Error as _;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct FixedTokenProvider;

    #[async_trait]
    impl TokenProvider for FixedTokenProvider {
        async fn token(&self) -> Result<BearerToken, TokenError> {
            Ok(BearerToken::new("fixed"))
        }
    }

    /// Validates like the real factory but never talks to Azure AD
    #[derive(Debug, Default)]
    struct FakeFactory {
        seen: Mutex<Vec<AuthOptions>>,
    }

    impl TokenProviderFactory for FakeFactory {
        fn build(&self, options: &AuthOptions) -> Result<Arc<dyn TokenProvider>, ProviderError> {
            self.seen.lock().unwrap().push(options.clone());
            LoginFlow::from_options(options)?;
            Ok(Arc::new(FixedTokenProvider))
        }
    }

    fn config(args: &[&str]) -> RestConfig {
        let mut kube = kube::Config::new("https://aks.example.test".parse().unwrap());
        kube.auth_info.exec = Some(
            serde_json::from_value(json!({
                "apiVersion": "client.authentication.k8s.io/v1beta1",
                "command": "kubelogin",
                "args": args,
            }))
            .unwrap(),
        );
        RestConfig::new(kube)
    }

    const SECRET_PAYLOAD: &[u8] = br#"{"clientId":"abc","clientSecret":"s3cr3t","tenantId":"ten1"}"#;

    #[test]
    fn test_rewrite_clears_exec_and_adds_one_wrapper() {
        let mut config = config(&["get-token", "--login", "devicecode"]);
        let rewriter = ConfigRewriter::with_factory(FakeFactory::default());

        rewriter.rewrite(&mut config, SECRET_PAYLOAD).unwrap();

        assert!(config.exec_provider().is_none());
        assert_eq!(config.wrapper_count(), 1);

        let seen = rewriter.factory.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].login_method, LoginMethod::ServicePrincipal);
        assert_eq!(seen[0].client_id.as_deref(), Some("abc"));
        assert_eq!(seen[0].client_secret.as_deref(), Some("s3cr3t"));
        assert_eq!(seen[0].tenant_id.as_deref(), Some("ten1"));
        assert!(seen[0].client_certificate.is_none());
    }

    /// Records the Authorization header it sees, then delegates or answers 200
    #[derive(Debug)]
    struct HeaderRecorder {
        seen: Arc<Mutex<Vec<Option<String>>>>,
        inner: Option<SharedTransport>,
    }

    #[async_trait]
    impl Transport for HeaderRecorder {
        async fn send(&self, request: Request) -> Result<Response, TransportError> {
            let value = request
                .headers()
                .get(AUTHORIZATION)
                .map(|v| v.to_str().unwrap().to_string());
            self.seen.lock().unwrap().push(value);
            match &self.inner {
                Some(inner) => inner.send(request).await,
                None => Ok(Response::from(
                    ::http::Response::builder().status(200).body("").unwrap(),
                )),
            }
        }
    }

    #[tokio::test]
    async fn test_rewrite_wraps_existing_chain_as_outermost() {
        let mut config = config(&["get-token"]);
        let inner_seen = Arc::new(Mutex::new(Vec::new()));
        {
            let inner_seen = Arc::clone(&inner_seen);
            config.wrap(move |base| {
                Arc::new(HeaderRecorder {
                    seen: Arc::clone(&inner_seen),
                    inner: Some(base),
                }) as SharedTransport
            });
        }
        assert_eq!(config.wrapper_count(), 1);

        ConfigRewriter::with_factory(FakeFactory::default())
            .rewrite(&mut config, SECRET_PAYLOAD)
            .unwrap();
        assert_eq!(config.wrapper_count(), 2);

        let base_seen = Arc::new(Mutex::new(Vec::new()));
        let base: SharedTransport = Arc::new(HeaderRecorder {
            seen: Arc::clone(&base_seen),
            inner: None,
        });
        let client = RestClient::new("https://aks.example.test", config.transport(base)).unwrap();
        client.get("/version").await.unwrap();

        // The earlier wrapper sits inside the bearer decorator
        assert_eq!(
            *inner_seen.lock().unwrap(),
            vec![Some("Bearer fixed".to_string())]
        );
        assert_eq!(
            *base_seen.lock().unwrap(),
            vec![Some("Bearer fixed".to_string())]
        );
    }

    #[test]
    fn test_rewrite_without_exec_section() {
        let mut config = RestConfig::new(kube::Config::new(
            "https://aks.example.test".parse().unwrap(),
        ));
        let rewriter = ConfigRewriter::with_factory(FakeFactory::default());

        rewriter.rewrite(&mut config, SECRET_PAYLOAD).unwrap();
        assert_eq!(config.wrapper_count(), 1);
    }

    #[test]
    fn test_decode_failure_leaves_config_untouched() {
        // Arguments that would not parse either; decoding must fail first
        let mut config = config(&["get-token", "--no-such-flag"]);
        let rewriter = ConfigRewriter::with_factory(FakeFactory::default());

        let err = rewriter.rewrite(&mut config, b"not-json").unwrap_err();

        assert!(matches!(err, ConversionError::Decode(_)));
        assert!(config.exec_provider().is_some());
        assert_eq!(config.wrapper_count(), 0);
        // Decoding fails before the factory is consulted
        assert!(rewriter.factory.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_argument_failure_leaves_config_untouched() {
        let mut config = config(&["get-token", "--no-such-flag"]);
        let rewriter = ConfigRewriter::with_factory(FakeFactory::default());

        let err = rewriter.rewrite(&mut config, SECRET_PAYLOAD).unwrap_err();

        assert!(matches!(err, ConversionError::ArgumentParse(_)));
        assert_eq!(
            err.to_string(),
            "could not parse execProvider arguments in kubeconfig"
        );
        assert!(err.source().is_some());
        assert!(config.exec_provider().is_some());
        assert_eq!(config.wrapper_count(), 0);
    }

    #[test]
    fn test_missing_tenant_is_opaque_provider_error() {
        let mut config = config(&["get-token"]);
        let rewriter = ConfigRewriter::with_factory(FakeFactory::default());

        let err = rewriter
            .rewrite(&mut config, br#"{"clientId":"abc"}"#)
            .unwrap_err();

        assert_eq!(err.to_string(), "cannot build azure token provider");
        let cause = err.source().unwrap();
        assert!(cause.downcast_ref::<ProviderError>().is_some());
        assert!(config.exec_provider().is_some());
        assert_eq!(config.wrapper_count(), 0);
    }

    #[test]
    fn test_merged_options_credentials_override_arguments() {
        let config = config(&[
            "get-token",
            "--login",
            "msi",
            "--client-id",
            "from-args",
            "--tenant-id",
            "tenant-from-args",
        ]);

        let options = merged_options(&config, SECRET_PAYLOAD).unwrap();

        assert_eq!(options.login_method, LoginMethod::ServicePrincipal);
        assert_eq!(options.client_id.as_deref(), Some("abc"));
        assert_eq!(options.tenant_id.as_deref(), Some("ten1"));
    }
}
