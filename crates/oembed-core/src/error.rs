//! Error types for oembed-core.
//!
//! Resolution failures never reach callers of [`Resolver::get`]; they are
//! logged and collapsed into `None`. Loader failures are returned from the
//! `ProviderRegistry::from_*` constructors.
//!
//! [`Resolver::get`]: crate::Resolver::get

use crate::fetch::FetchError;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading providers or resolving a URL.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No registered provider matches the URL.
    #[error("no provider matches {url}")]
    NoProviderMatch { url: String },

    /// The fetch capability failed (network error or timeout).
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The provider endpoint answered with a non-success status.
    #[error("{provider} returned HTTP {status}")]
    Status { provider: String, status: u16 },

    /// The provider response could not be turned into embed data.
    #[error("failed to parse {provider} response: {message}")]
    Parse { provider: String, message: String },

    /// A provider pattern failed to compile.
    #[error("invalid pattern for provider {provider}: {source}")]
    Pattern {
        provider: String,
        #[source]
        source: regex::Error,
    },

    /// A provider endpoint is not a valid URL.
    #[error("invalid endpoint for provider {provider}: {source}")]
    Endpoint {
        provider: String,
        #[source]
        source: url::ParseError,
    },

    /// A provider definition is incomplete or inconsistent.
    #[error("invalid provider configuration: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The provider list is not valid TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a parse error.
    pub fn parse(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns `true` for failures caused by the remote side (transport,
    /// status or body), as opposed to lookup or configuration problems.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Fetch { .. } | Error::Status { .. } | Error::Parse { .. }
        )
    }
}
