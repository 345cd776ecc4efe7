use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use oembed_core::{FetchOptions, RenderOptions, ResolverConfig};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Providers file that replaces the bundled list. `~` is expanded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<PathBuf>,

    #[serde(default)]
    pub resolver: ResolverSettings,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolverSettings {
    /// Render AMP markup by default
    #[serde(default)]
    pub amp: bool,

    /// Default render width in pixels (heights are rounded)
    #[serde(default)]
    pub width: Option<u32>,

    /// Sent to oEmbed endpoints as `maxwidth`
    #[serde(default)]
    pub max_width: Option<u32>,

    /// Sent to oEmbed endpoints as `maxheight`
    #[serde(default)]
    pub max_height: Option<u32>,
}

impl ResolverSettings {
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            amp: self.amp,
            options: RenderOptions {
                width: self.width,
                amp: None,
            },
        }
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header; the library default is used when unset
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}
