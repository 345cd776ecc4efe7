mod cli;

use oembed::config;
use oembed_core::{ProviderRegistry, RenderOptions, Strategy};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "oembed=debug,oembed_core=debug".to_string()
        } else {
            "oembed=info,oembed_core=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve {
            url,
            width,
            amp,
            json,
        } => resolve(&url, width, amp, json, cli.config.as_deref()),
        Commands::Match { url } => match_url(&url, cli.config.as_deref()),
        Commands::Providers => list_providers(cli.config.as_deref()),
        Commands::Validate { path } => validate_providers(path.as_deref(), cli.config.as_deref()),
        Commands::Version => {
            println!("oembed {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn resolve(
    url: &str,
    width: Option<u32>,
    amp: bool,
    json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let resolver = config::build_resolver(&config)?;

    tracing::info!("Resolving {}", url);
    let Some(embed) = resolver.get(url) else {
        anyhow::bail!("No embed found for {}", url);
    };

    let mut options = RenderOptions::new();
    if let Some(width) = width {
        options = options.width(width);
    }
    let options = (!options.is_empty()).then_some(options);
    let html = if amp {
        embed.amp_html(options)
    } else {
        embed.html(options)
    };

    if json {
        let output = serde_json::json!({
            "url": embed.url(),
            "provider": embed.provider_name(),
            "kind": embed.kind(),
            "type": embed.media_type(),
            "html": html,
            "script": embed.script(),
            "thumbnail": embed.thumbnail(),
            "data": embed.data(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", html);
        if let Some(script) = embed.script() {
            println!("<script async src=\"{}\"></script>", script);
        }
    }

    Ok(())
}

fn match_url(url: &str, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let registry = config::build_registry(&config)?;

    match registry.find(url) {
        Some(provider) => {
            println!("{} ({})", provider.name(), strategy_label(provider.strategy()));
            Ok(())
        }
        None => anyhow::bail!("No provider matches {}", url),
    }
}

fn list_providers(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let registry = config::build_registry(&config)?;
    print_providers(&registry);
    Ok(())
}

fn validate_providers(path: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let registry = match path {
        Some(p) => {
            println!("Validating providers: {:?}", p);
            ProviderRegistry::from_path(p)
                .with_context(|| format!("Invalid providers file: {:?}", p))?
        }
        None => {
            let config = config::load_config_or_default(config_path)?;
            config::build_registry(&config)?
        }
    };

    println!("✓ Providers are valid");
    println!("  Providers: {}", registry.len());
    println!(
        "    Protocol: {}",
        registry
            .iter()
            .filter(|p| matches!(p.strategy(), Strategy::Protocol(_)))
            .count()
    );
    println!(
        "    Template: {}",
        registry
            .iter()
            .filter(|p| matches!(p.strategy(), Strategy::Template(_)))
            .count()
    );

    Ok(())
}

fn print_providers(registry: &ProviderRegistry) {
    for (i, provider) in registry.iter().enumerate() {
        print!("{:>3}. {} ({})", i + 1, provider.name(), strategy_label(provider.strategy()));
        if let Some(script) = provider.script() {
            print!(" [script: {}]", script);
        }
        println!();
    }
}

fn strategy_label(strategy: &Strategy) -> &'static str {
    match strategy {
        Strategy::Protocol(_) => "protocol",
        Strategy::Template(_) => "template",
    }
}
