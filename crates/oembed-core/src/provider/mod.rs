//! Provider definitions and the strategies that resolve them.
//!
//! - [`ProviderDefinition`] -- the serialized form, as written in a
//!   providers file.
//! - [`Provider`] -- a validated definition with its pattern and strategy
//!   compiled.
//! - [`Strategy`] -- protocol (oEmbed endpoint) or template (regex + HTML),
//!   chosen once when the provider is compiled.

pub mod pattern;
pub mod protocol;
pub mod template;

use serde::{Deserialize, Serialize};

use crate::embed::{EmbedData, EmbedKind, RenderProfile};
use crate::error::{Error, Result};
use crate::fetch::Fetch;

pub use pattern::UrlPattern;
pub use protocol::{FetchOptions, ProtocolStrategy, ResponseFormat};
pub use template::TemplateStrategy;

/// Which strategy a provider uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Protocol,
    Template,
}

/// A provider as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDefinition {
    pub name: String,

    pub strategy: StrategyKind,

    /// oEmbed-style URL schemes (`https://youtu.be/*`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,

    /// Raw regex. Required for template providers, whose capture groups
    /// feed the HTML templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// oEmbed endpoint, optionally with `{url}` / `{format}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub format: ResponseFormat,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amp_html: Option<String>,

    /// Root tag used for the AMP rendering of fetched markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amp_tag: Option<String>,

    /// External loader script the markup needs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    /// Attributes appended to single-element markup when missing, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
}

/// Strategy selected for a provider at compile time.
#[derive(Debug, Clone)]
pub enum Strategy {
    Protocol(ProtocolStrategy),
    Template(TemplateStrategy),
}

impl Strategy {
    pub fn kind(&self) -> EmbedKind {
        match self {
            Strategy::Protocol(_) => EmbedKind::OEmbed,
            Strategy::Template(_) => EmbedKind::Regex,
        }
    }

    /// Produce embed data for `url`. Only protocol strategies use the
    /// fetcher.
    pub fn resolve(&self, url: &str, fetcher: &dyn Fetch, options: &FetchOptions) -> Result<EmbedData> {
        match self {
            Strategy::Protocol(s) => s.resolve(url, fetcher, options),
            Strategy::Template(s) => s.resolve(url),
        }
    }
}

/// A compiled, immutable provider.
#[derive(Debug, Clone)]
pub struct Provider {
    definition: ProviderDefinition,
    pattern: UrlPattern,
    strategy: Strategy,
}

impl Provider {
    /// Validate and compile a definition.
    pub fn compile(definition: ProviderDefinition) -> Result<Self> {
        let name = definition.name.trim();
        if name.is_empty() {
            return Err(Error::config("provider name cannot be empty"));
        }

        let (pattern, strategy) = match definition.strategy {
            StrategyKind::Protocol => {
                let endpoint = definition.endpoint.as_deref().ok_or_else(|| {
                    Error::config(format!("protocol provider '{}' has no endpoint", name))
                })?;
                let pattern = UrlPattern::compile(name, &definition.schemes, definition.pattern.as_deref())?;
                let strategy = ProtocolStrategy::new(name, endpoint, definition.format)?;
                (pattern, Strategy::Protocol(strategy))
            }
            StrategyKind::Template => {
                let regex = definition.pattern.as_deref().ok_or_else(|| {
                    Error::config(format!("template provider '{}' has no pattern", name))
                })?;
                let html = definition.html.as_deref().ok_or_else(|| {
                    Error::config(format!("template provider '{}' has no html template", name))
                })?;
                if !definition.schemes.is_empty() {
                    return Err(Error::config(format!(
                        "template provider '{}' matches by pattern only; remove its schemes",
                        name
                    )));
                }
                let pattern = UrlPattern::compile(name, &[], Some(regex))?;
                let strategy = TemplateStrategy::new(
                    name,
                    regex,
                    definition.media_type.as_deref(),
                    html,
                    definition.amp_html.as_deref(),
                )?;
                (pattern, Strategy::Template(strategy))
            }
        };

        Ok(Self {
            definition,
            pattern,
            strategy,
        })
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &ProviderDefinition {
        &self.definition
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn script(&self) -> Option<&str> {
        self.definition.script.as_deref()
    }

    pub fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }

    pub(crate) fn render_profile(&self) -> RenderProfile {
        RenderProfile {
            provider: self.definition.name.clone(),
            script: self.definition.script.clone(),
            attributes: self.definition.attributes.clone(),
            amp_tag: self.definition.amp_tag.clone(),
        }
    }
}
