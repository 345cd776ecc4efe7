//! Ordered provider registry.
//!
//! The [`ProviderRegistry`] holds compiled providers in configuration order
//! and answers "which provider handles this URL?". The first provider whose
//! pattern matches wins, so more specific providers must come first.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::provider::{Provider, ProviderDefinition};

/// Provider list shipped with the crate.
pub const BUILTIN_PROVIDERS: &str = include_str!("../providers.toml");

#[derive(Debug, Deserialize)]
struct ProvidersFile {
    #[serde(default)]
    provider: Vec<ProviderDefinition>,
}

/// An immutable, ordered list of providers.
///
/// # Examples
///
/// ```
/// use oembed_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::builtin().unwrap();
/// let provider = registry.find("https://youtu.be/dQw4w9WgXcQ").unwrap();
/// assert_eq!(provider.name(), "YouTube");
/// assert!(registry.find("https://example.com/page").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// Create an empty registry with no providers.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Compile definitions, keeping their order.
    ///
    /// Fails on the first invalid definition or on duplicate names.
    pub fn from_definitions(definitions: Vec<ProviderDefinition>) -> Result<Self> {
        let mut providers: Vec<Provider> = Vec::with_capacity(definitions.len());
        for definition in definitions {
            if providers.iter().any(|p| p.name() == definition.name) {
                return Err(Error::config(format!(
                    "duplicate provider name '{}'",
                    definition.name
                )));
            }
            providers.push(Provider::compile(definition)?);
        }

        tracing::debug!(count = providers.len(), "Loaded providers");
        Ok(Self { providers })
    }

    /// Parse a TOML document with `[[provider]]` entries.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ProvidersFile = toml::from_str(content)?;
        Self::from_definitions(file.provider)
    }

    /// Load a TOML providers file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The providers bundled with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_PROVIDERS)
    }

    /// First provider whose pattern matches `url`.
    pub fn find(&self, url: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.matches(url))
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.providers.iter().find(|p| p.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
