//! # REST Client Configuration
//!
//! [`RestConfig`] pairs a `kube::Config` with an ordered chain of transport
//! wrappers. The kubeconfig's exec plugin section lives in
//! `kube.auth_info.exec`; nothing here ever runs it.

use crate::config::RuntimeConfig;
use crate::error::TransportError;
use crate::transport::{ReqwestTransport, RestClient, SharedTransport};
use kube::config::{ExecConfig, KubeConfigOptions, Kubeconfig, KubeconfigError};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Decorates a transport, returning the new outer transport
pub type TransportWrapper = Arc<dyn Fn(SharedTransport) -> SharedTransport + Send + Sync>;

/// Client configuration with a wrappable transport chain
#[derive(Clone)]
pub struct RestConfig {
    pub kube: kube::Config,
    wrappers: Vec<TransportWrapper>,
}

impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("cluster_url", &self.kube.cluster_url)
            .field(
                "exec_command",
                &self.exec_provider().and_then(|exec| exec.command.as_ref()),
            )
            .field("wrappers", &self.wrappers.len())
            .finish_non_exhaustive()
    }
}

impl From<kube::Config> for RestConfig {
    fn from(kube: kube::Config) -> Self {
        Self::new(kube)
    }
}

impl RestConfig {
    pub fn new(kube: kube::Config) -> Self {
        Self {
            kube,
            wrappers: Vec::new(),
        }
    }

    /// Load a kubeconfig without running its exec plugin
    ///
    /// `path` defaults to `KUBECONFIG` or `~/.kube/config`; `context` defaults
    /// to the current context.
    ///
    /// # Errors
    ///
    /// Returns [`KubeconfigError`] if the file cannot be read or the context,
    /// cluster or user cannot be resolved.
    pub async fn from_kubeconfig(
        path: Option<&Path>,
        context: Option<&str>,
    ) -> Result<Self, KubeconfigError> {
        let kubeconfig = match path {
            Some(path) => Kubeconfig::read_from(path)?,
            None => Kubeconfig::read()?,
        };
        Self::from_kubeconfig_value(kubeconfig, context).await
    }

    /// Like [`RestConfig::from_kubeconfig`] for an already parsed kubeconfig
    ///
    /// # Errors
    ///
    /// Returns [`KubeconfigError`] if the context, cluster or user cannot be
    /// resolved.
    pub async fn from_kubeconfig_value(
        kubeconfig: Kubeconfig,
        context: Option<&str>,
    ) -> Result<Self, KubeconfigError> {
        let options = KubeConfigOptions {
            context: context.map(ToString::to_string),
            ..Default::default()
        };
        let kube = kube::Config::from_custom_kubeconfig(kubeconfig, &options).await?;
        debug!(cluster_url = %kube.cluster_url, "Loaded kubeconfig");
        Ok(Self::new(kube))
    }

    pub fn exec_provider(&self) -> Option<&ExecConfig> {
        self.kube.auth_info.exec.as_ref()
    }

    /// Arguments of the exec plugin invocation, empty if there is none
    pub fn exec_args(&self) -> Vec<String> {
        self.exec_provider()
            .and_then(|exec| exec.args.clone())
            .unwrap_or_default()
    }

    /// Remove the exec plugin invocation, returning it
    pub fn clear_exec_provider(&mut self) -> Option<ExecConfig> {
        self.kube.auth_info.exec.take()
    }

    /// Add a wrapper around the current transport chain
    ///
    /// The most recently added wrapper is the outermost one.
    pub fn wrap<F>(&mut self, wrapper: F)
    where
        F: Fn(SharedTransport) -> SharedTransport + Send + Sync + 'static,
    {
        self.wrappers.push(Arc::new(wrapper));
    }

    pub fn wrapper_count(&self) -> usize {
        self.wrappers.len()
    }

    /// Apply every wrapper over `base`
    pub fn transport(&self, base: SharedTransport) -> SharedTransport {
        self.wrappers
            .iter()
            .fold(base, |transport, wrapper| wrapper(transport))
    }

    /// Build a client for the cluster over a reqwest base transport
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the base transport cannot be built from
    /// the kubeconfig settings or the cluster URL is invalid.
    pub fn http_client(&self, runtime: &RuntimeConfig) -> Result<RestClient, TransportError> {
        let base: SharedTransport =
            Arc::new(ReqwestTransport::from_kube_config(&self.kube, runtime)?);
        RestClient::new(&self.kube.cluster_url.to_string(), self.transport(base))
    }
}
