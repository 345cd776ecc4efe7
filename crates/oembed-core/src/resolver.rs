//! The resolver facade: URL in, [`Embed`] (or nothing) out.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::embed::Embed;
use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::provider::FetchOptions;
use crate::registry::ProviderRegistry;
use crate::render::RenderOptions;

/// Construction-time settings for a [`Resolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Render AMP markup from [`Embed::html`] by default.
    #[serde(default)]
    pub amp: bool,

    /// Default render options handed to every embed.
    #[serde(default)]
    pub options: RenderOptions,
}

/// Resolves URLs against a provider registry.
///
/// Every failure (no matching provider, transport error, bad response)
/// yields `None`; the cause is logged.
///
/// # Examples
///
/// ```
/// use oembed_core::{FetchError, FetchResponse, ProviderRegistry, Resolver};
///
/// let offline = |url: &str| -> Result<FetchResponse, FetchError> {
///     Err(FetchError::Transport { url: url.to_string(), message: "offline".into() })
/// };
/// let resolver = Resolver::new(ProviderRegistry::builtin().unwrap(), offline);
///
/// let embed = resolver.get("https://example.com/hello.mp4").unwrap();
/// assert!(embed.html(None).starts_with("<video"));
/// assert!(resolver.get("https://youtu.be/dQw4w9WgXcQ").is_none());
/// ```
#[derive(Clone)]
pub struct Resolver {
    registry: Arc<ProviderRegistry>,
    fetcher: Arc<dyn Fetch>,
    amp: bool,
    options: RenderOptions,
    fetch_options: FetchOptions,
}

impl Resolver {
    /// Create a resolver with default settings.
    pub fn new(registry: impl Into<Arc<ProviderRegistry>>, fetcher: impl Fetch + 'static) -> Self {
        Self::with_config(registry, fetcher, ResolverConfig::default())
    }

    pub fn with_config(
        registry: impl Into<Arc<ProviderRegistry>>,
        fetcher: impl Fetch + 'static,
        config: ResolverConfig,
    ) -> Self {
        Self {
            registry: registry.into(),
            fetcher: Arc::new(fetcher),
            amp: config.amp,
            options: config.options,
            fetch_options: FetchOptions::default(),
        }
    }

    /// Bundled providers with an [`HttpFetcher`](crate::HttpFetcher) using
    /// the default timeout.
    #[cfg(feature = "http")]
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(ProviderRegistry::builtin()?, crate::HttpFetcher::new()))
    }

    /// Size hints sent to oEmbed endpoints as `maxwidth` / `maxheight`.
    pub fn with_fetch_options(mut self, fetch_options: FetchOptions) -> Self {
        self.fetch_options = fetch_options;
        self
    }

    pub fn amp(&self) -> bool {
        self.amp
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    pub fn fetch_options(&self) -> FetchOptions {
        self.fetch_options
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Replace the default render options for subsequent resolutions.
    ///
    /// Options are replaced as a whole, not merged with the previous ones.
    pub fn with_options(&mut self, options: RenderOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Resolve `url` using the resolver's default options.
    pub fn get(&self, url: &str) -> Option<Embed> {
        self.get_with_options(url, self.options)
    }

    /// Resolve `url`, giving the embed `options` as its defaults instead of
    /// the resolver's.
    pub fn get_with_options(&self, url: &str, options: RenderOptions) -> Option<Embed> {
        match self.resolve(url, options) {
            Ok(embed) => Some(embed),
            Err(e @ Error::NoProviderMatch { .. }) => {
                tracing::debug!("{}", e);
                None
            }
            Err(e) => {
                tracing::warn!(%url, "Embed resolution failed: {}", e);
                None
            }
        }
    }

    fn resolve(&self, url: &str, options: RenderOptions) -> Result<Embed> {
        let provider = self.registry.find(url).ok_or_else(|| Error::NoProviderMatch {
            url: url.to_string(),
        })?;
        tracing::debug!(%url, provider = provider.name(), "Matched provider");

        let strategy = provider.strategy();
        let data = strategy.resolve(url, self.fetcher.as_ref(), &self.fetch_options)?;

        Ok(Embed::new(
            url,
            strategy.kind(),
            data,
            options,
            self.amp,
            provider.render_profile(),
        ))
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("providers", &self.registry.len())
            .field("amp", &self.amp)
            .field("options", &self.options)
            .field("fetch_options", &self.fetch_options)
            .finish()
    }
}
