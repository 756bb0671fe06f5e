//! # Bearer Token Transport
//!
//! Decorator that authenticates every request with a token from a
//! [`TokenProvider`] before delegating to the wrapped transport.

use super::{SharedTransport, Transport};
use crate::error::TransportError;
use crate::token::TokenProvider;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Request, Response};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug)]
pub struct BearerTokenTransport {
    provider: Arc<dyn TokenProvider>,
    base: SharedTransport,
}

impl BearerTokenTransport {
    pub fn new(provider: Arc<dyn TokenProvider>, base: SharedTransport) -> Self {
        Self { provider, base }
    }
}

#[async_trait]
impl Transport for BearerTokenTransport {
    /// Replaces any existing `Authorization` header. If no token can be
    /// obtained the request fails without reaching the base transport.
    async fn send(&self, mut request: Request) -> Result<Response, TransportError> {
        let token = match self.provider.token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(
                    method = %request.method(),
                    url = %request.url(),
                    error = %e,
                    "Failed to obtain bearer token, request not sent"
                );
                return Err(e.into());
            }
        };

        request
            .headers_mut()
            .insert(AUTHORIZATION, token.header_value()?);
        self.base.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenError;
    use crate::token::BearerToken;
    use reqwest::header::HeaderValue;
    use reqwest::{Method, Url};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct StaticTokenProvider(Option<&'static str>);

    #[async_trait]
    impl TokenProvider for StaticTokenProvider {
        async fn token(&self) -> Result<BearerToken, TokenError> {
            self.0
                .map(BearerToken::new)
                .ok_or_else(|| TokenError::Credential("AADSTS7000215: invalid client secret".into()))
        }
    }

    /// Records the Authorization header of every request it receives
    #[derive(Debug, Default)]
    struct RecordingTransport {
        calls: AtomicUsize,
        authorization: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: Request) -> Result<Response, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(value) = request.headers().get(AUTHORIZATION) {
                self.authorization
                    .lock()
                    .unwrap()
                    .push(value.to_str().unwrap().to_string());
            }
            Ok(Response::from(
                ::http::Response::builder().status(204).body("").unwrap(),
            ))
        }
    }

    fn request() -> Request {
        Request::new(
            Method::GET,
            Url::parse("https://aks.example.test/version").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let base = Arc::new(RecordingTransport::default());
        let transport = BearerTokenTransport::new(
            Arc::new(StaticTokenProvider(Some("token-1"))),
            Arc::clone(&base) as SharedTransport,
        );

        let response = transport.send(request()).await.unwrap();
        assert_eq!(response.status(), 204);
        assert_eq!(*base.authorization.lock().unwrap(), vec!["Bearer token-1"]);
    }

    #[tokio::test]
    async fn test_replaces_existing_authorization() {
        let base = Arc::new(RecordingTransport::default());
        let transport = BearerTokenTransport::new(
            Arc::new(StaticTokenProvider(Some("token-1"))),
            Arc::clone(&base) as SharedTransport,
        );

        let mut req = request();
        req.headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        transport.send(req).await.unwrap();

        assert_eq!(*base.authorization.lock().unwrap(), vec!["Bearer token-1"]);
    }

    #[tokio::test]
    async fn test_token_failure_does_not_reach_base() {
        let base = Arc::new(RecordingTransport::default());
        let transport = BearerTokenTransport::new(
            Arc::new(StaticTokenProvider(None)),
            Arc::clone(&base) as SharedTransport,
        );

        let err = transport.send(request()).await.unwrap_err();
        assert!(matches!(err, TransportError::Auth(TokenError::Credential(_))));
        assert_eq!(base.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_provider() {
        let base = Arc::new(RecordingTransport::default());
        let transport = Arc::new(BearerTokenTransport::new(
            Arc::new(StaticTokenProvider(Some("shared"))),
            Arc::clone(&base) as SharedTransport,
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let transport = Arc::clone(&transport);
                tokio::spawn(async move { transport.send(request()).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(base.calls.load(Ordering::SeqCst), 8);
        assert!(base
            .authorization
            .lock()
            .unwrap()
            .iter()
            .all(|value| value == "Bearer shared"));
    }
}
