//! # Error Types
//!
//! Conversion-time errors (credential decoding, exec argument parsing, token
//! provider construction) and request-time errors (token acquisition,
//! transport failures).

use std::time::Duration;
use thiserror::Error;

/// Boxed error used as the cause of provider and transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The credentials payload is not a flat JSON object of strings
#[derive(Debug, Error)]
#[error("invalid azure credentials payload")]
pub struct DecodeError {
    #[from]
    source: serde_json::Error,
}

/// The kubeconfig exec arguments do not match the kubelogin flag set
#[derive(Debug, Error)]
#[error("{}", render_clap_error(.inner))]
pub struct ArgumentParseError {
    #[source]
    inner: clap::Error,
}

impl ArgumentParseError {
    pub(crate) fn new(inner: clap::Error) -> Self {
        Self { inner }
    }

    /// Classification of the parse failure as reported by clap
    pub fn kind(&self) -> clap::error::ErrorKind {
        self.inner.kind()
    }
}

/// clap renders multi-line text with usage hints; keep the first line only.
/// The full rendering stays reachable through `source()`.
fn render_clap_error(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.trim_start_matches("error: ").to_string()
}

/// Failure to build a token provider from the merged options
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Only service-principal login is wired to a token provider
    #[error("login method {0} is not supported")]
    UnsupportedLoginMethod(String),

    /// A required option is empty
    #[error("{0} cannot be empty")]
    MissingField(&'static str),

    /// Neither a client secret nor a client certificate was supplied
    #[error("client secret or client certificate must be provided")]
    MissingSecret,

    /// An option value this build cannot honour
    #[error("{0}")]
    Unsupported(String),

    /// The client certificate could not be read
    #[error("failed to read client certificate {path}")]
    Certificate {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The credential library rejected the configuration
    #[error("failed to create azure credential")]
    Credential(#[source] BoxError),
}

/// Top-level error of converting an exec-plugin configuration
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("could not parse execProvider arguments in kubeconfig")]
    ArgumentParse(#[source] ArgumentParseError),

    /// Stable message; the underlying reason is kept as the error source
    #[error("cannot build azure token provider")]
    ProviderConstruction(#[source] ProviderError),
}

/// A bearer token could not be obtained for a request
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("timed out after {0:?} acquiring azure access token")]
    Timeout(Duration),

    #[error("failed to acquire azure access token")]
    Credential(#[source] BoxError),

    #[error("access token is not a valid header value")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// A request sent through the transport chain failed
#[derive(Debug, Error)]
pub enum TransportError {
    /// Token acquisition failed; the request was never sent
    #[error("request authentication failed")]
    Auth(#[from] TokenError),

    #[error("http request failed")]
    Http(#[from] reqwest::Error),

    #[error("invalid request url: {0}")]
    Url(String),
}
