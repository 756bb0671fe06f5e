//! # HTTP Transports
//!
//! A [`Transport`] sends one request and returns the response. Decorators
//! such as [`BearerTokenTransport`] wrap another transport and compose
//! uniformly; [`ReqwestTransport`] is the base that talks to the network.

mod base;
mod bearer;

pub use base::ReqwestTransport;
pub use bearer::BearerTokenTransport;

use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Method, Request, Response, Url};
use std::sync::Arc;

/// Sends HTTP requests
///
/// Implementations are shared between all requests of a client and must be
/// safe to call concurrently.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

pub type SharedTransport = Arc<dyn Transport>;

/// Issues requests relative to the cluster URL through a transport chain
#[derive(Debug, Clone)]
pub struct RestClient {
    base_url: Url,
    transport: SharedTransport,
}

impl RestClient {
    /// # Errors
    ///
    /// Returns [`TransportError::Url`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str, transport: SharedTransport) -> Result<Self, TransportError> {
        // A trailing slash keeps any path prefix of the cluster URL on join
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).map_err(|e| TransportError::Url(format!("{base_url}: {e}")))?;

        Ok(Self {
            base_url,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request for a path below the cluster URL
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Url`] if the path cannot be joined.
    pub fn request(&self, method: Method, path: &str) -> Result<Request, TransportError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::Url(format!("{path}: {e}")))?;

        let mut request = Request::new(method, url);
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(request)
    }

    /// # Errors
    ///
    /// Returns any error of the transport chain.
    pub async fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.transport.send(request).await
    }

    /// `GET` a path below the cluster URL
    ///
    /// # Errors
    ///
    /// Returns any error of the transport chain.
    pub async fn get(&self, path: &str) -> Result<Response, TransportError> {
        let request = self.request(Method::GET, path)?;
        self.send(request).await
    }
}
