//! # oembed-core
//!
//! Turns a URL into embeddable markup.
//!
//! A [`ProviderRegistry`] holds providers in order. [`Resolver::get`] finds
//! the first provider whose pattern matches the URL and runs its strategy:
//!
//! - **protocol** providers call an oEmbed endpoint through the injected
//!   [`Fetch`] capability and parse the JSON or XML answer;
//! - **template** providers build markup from regex captures, without any
//!   network access.
//!
//! The resulting [`Embed`] renders HTML, AMP HTML and responsive sizes.
//!
//! ## Overview
//!
//! - [`registry`] -- ordered providers, TOML loading, bundled list.
//! - [`provider`] -- definitions, URL patterns, the two strategies.
//! - [`embed`] -- the resolved embed and its data.
//! - [`render`] -- markup rewriting (sizes, attributes, AMP tags).
//! - [`resolver`] -- the facade.
//! - [`fetch`] -- the transport seam, with a blocking `reqwest`
//!   implementation behind the `http` feature.

pub mod embed;
pub mod error;
pub mod fetch;
pub mod provider;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod template;

pub use embed::{Embed, EmbedData, EmbedKind, Thumbnail};
pub use error::{Error, Result};
pub use fetch::{Fetch, FetchError, FetchResponse};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use provider::{
    FetchOptions, Provider, ProviderDefinition, ResponseFormat, Strategy, StrategyKind,
};
pub use registry::ProviderRegistry;
pub use render::RenderOptions;
pub use resolver::{Resolver, ResolverConfig};
pub use template::TemplateContext;
