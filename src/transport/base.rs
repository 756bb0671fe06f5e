//! # Reqwest Base Transport
//!
//! Innermost transport of a client configuration: sends requests to the API
//! server with `reqwest`, honouring the TLS and timeout settings of the
//! kubeconfig.

use super::Transport;
use crate::config::RuntimeConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Certificate, Client, Proxy, Request, Response};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a transport for the cluster described by a kubeconfig
    ///
    /// Timeouts missing from the kubeconfig fall back to `runtime`. Extra
    /// kubeconfig headers are sent with every request unless the request sets
    /// them itself. A `tls-server-name` override is not supported by reqwest
    /// and is skipped with a warning; the cluster host is verified instead.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Http`] if a root certificate or the proxy URL
    /// is invalid or the client cannot be built.
    pub fn from_kube_config(
        config: &kube::Config,
        runtime: &RuntimeConfig,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout.unwrap_or(runtime.connect_timeout()))
            .timeout(config.read_timeout.unwrap_or(runtime.http_timeout()))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(default_headers(config));

        if let Some(server_name) = &config.tls_server_name {
            warn!(
                tls_server_name = %server_name,
                cluster_url = %config.cluster_url,
                "Ignoring kubeconfig tls-server-name, verifying the cluster host instead"
            );
        }

        if let Some(roots) = &config.root_cert {
            debug!(count = roots.len(), "Adding kubeconfig root certificates");
            for der in roots {
                builder = builder.add_root_certificate(Certificate::from_der(der)?);
            }
        }

        if let Some(proxy_url) = &config.proxy_url {
            debug!(proxy = %proxy_url, "Using proxy from kubeconfig");
            builder = builder.proxy(Proxy::all(proxy_url.to_string())?);
        }

        Ok(Self::new(builder.build()?))
    }
}

/// Headers configured in the kubeconfig, later entries winning
fn default_headers(config: &kube::Config) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(config.headers.len());
    for (name, value) in &config.headers {
        headers.insert(name.clone(), value.clone());
    }
    headers
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        Ok(self.client.execute(request).await?)
    }
}
