mod types;

pub use types::*;

use anyhow::{Context, Result};
use oembed_core::{HttpFetcher, ProviderRegistry, Resolver};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./oembed.toml",
        "~/.config/oembed/config.toml",
        "/etc/oembed/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.http.timeout_secs == 0 {
        anyhow::bail!("HTTP timeout cannot be 0");
    }

    let widths = [
        ("width", config.resolver.width),
        ("max_width", config.resolver.max_width),
        ("max_height", config.resolver.max_height),
    ];
    for (name, value) in widths {
        if value == Some(0) {
            anyhow::bail!("resolver.{} cannot be 0", name);
        }
    }

    if let Some(ref path) = config.providers {
        let path = expand_path(path);
        if !path.exists() {
            tracing::warn!("Providers file does not exist: {:?}", path);
        }
    }

    Ok(())
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

/// Load the configured providers file, or the bundled list.
pub fn build_registry(config: &Config) -> Result<ProviderRegistry> {
    match config.providers {
        Some(ref path) => {
            let path = expand_path(path);
            ProviderRegistry::from_path(&path)
                .with_context(|| format!("Failed to load providers file: {:?}", path))
        }
        None => ProviderRegistry::builtin().context("Failed to load bundled providers"),
    }
}

/// Build a resolver with an HTTP fetcher from the configuration.
pub fn build_resolver(config: &Config) -> Result<Resolver> {
    let registry = build_registry(config)?;

    let timeout = Duration::from_secs(config.http.timeout_secs);
    let fetcher = match config.http.user_agent {
        Some(ref user_agent) => HttpFetcher::with_options(timeout, user_agent),
        None => HttpFetcher::with_timeout(timeout),
    };

    tracing::debug!(
        providers = registry.len(),
        timeout_secs = config.http.timeout_secs,
        "Building resolver"
    );

    Ok(
        Resolver::with_config(registry, fetcher, config.resolver.resolver_config())
            .with_fetch_options(config.resolver.fetch_options()),
    )
}
