//! The fetch capability used by protocol providers.
//!
//! The core only depends on [`Fetch`]; the `http` feature adds
//! [`HttpFetcher`], a blocking `reqwest` implementation with a request
//! timeout.

/// Response returned by a [`Fetch`] implementation.
///
/// Non-success statuses are returned as-is; deciding what counts as a
/// failure is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// Connection, TLS or body read failure.
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

/// Performs a single GET request.
///
/// Implementations must be safe to share between threads; a resolver holds
/// its fetcher behind an `Arc`.
pub trait Fetch: Send + Sync {
    fn request(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

impl<F> Fetch for F
where
    F: Fn(&str) -> Result<FetchResponse, FetchError> + Send + Sync,
{
    fn request(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self(url)
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use reqwest::blocking::Client;

    use super::{Fetch, FetchError, FetchResponse};

    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    const USER_AGENT: &str = concat!("oembed/", env!("CARGO_PKG_VERSION"));

    /// Blocking HTTP fetcher backed by `reqwest`.
    #[derive(Debug, Clone)]
    pub struct HttpFetcher {
        client: Client,
        timeout: Duration,
    }

    impl HttpFetcher {
        /// Create a fetcher with the default timeout and user agent.
        pub fn new() -> Self {
            Self::with_timeout(DEFAULT_TIMEOUT)
        }

        /// Create a fetcher with a custom request timeout.
        pub fn with_timeout(timeout: Duration) -> Self {
            Self::with_options(timeout, USER_AGENT)
        }

        /// Create a fetcher with a custom timeout and user agent.
        pub fn with_options(timeout: Duration, user_agent: &str) -> Self {
            let client = Client::builder()
                .timeout(timeout)
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|e| {
                    tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                    Client::new()
                });

            Self { client, timeout }
        }

        pub fn timeout(&self) -> Duration {
            self.timeout
        }
    }

    impl Default for HttpFetcher {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Fetch for HttpFetcher {
        fn request(&self, url: &str) -> Result<FetchResponse, FetchError> {
            let to_error = |e: reqwest::Error| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    FetchError::Transport {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                }
            };

            let response = self.client.get(url).send().map_err(to_error)?;
            let status = response.status().as_u16();
            let body = response.text().map_err(to_error)?;

            Ok(FetchResponse { status, body })
        }
    }
}

#[cfg(feature = "http")]
pub use http::DEFAULT_TIMEOUT;
