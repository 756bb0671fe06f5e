//! # Token Providers
//!
//! A [`TokenProvider`] hands out a currently valid bearer token, refreshing it
//! as needed. Providers are built from merged [`AuthOptions`] by a
//! [`TokenProviderFactory`]; the default factory is [`AzureIdentityFactory`].

mod azure;
mod flow;

pub use azure::{AzureIdentityFactory, AzureTokenProvider};
pub use flow::{LoginFlow, ServicePrincipalFlow, ServicePrincipalSecret};

use crate::error::{ProviderError, TokenError};
use crate::options::AuthOptions;
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An OAuth2 access token
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value, marked sensitive
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidHeader`] if the token contains characters
    /// not allowed in a header.
    pub fn header_value(&self) -> Result<HeaderValue, TokenError> {
        let mut value = HeaderValue::try_from(format!("Bearer {}", self.0))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Produces bearer tokens for outgoing requests
///
/// Called concurrently from every request sharing a client configuration.
/// Dropping the returned future cancels the acquisition.
#[async_trait]
pub trait TokenProvider: Send + Sync + std::fmt::Debug {
    async fn token(&self) -> Result<BearerToken, TokenError>;
}

/// Builds a [`TokenProvider`] from merged options
pub trait TokenProviderFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the options do not describe a usable login.
    fn build(&self, options: &AuthOptions) -> Result<Arc<dyn TokenProvider>, ProviderError>;
}
