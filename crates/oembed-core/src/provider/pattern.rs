//! URL patterns used to match providers.

use regex::Regex;

use crate::error::{Error, Result};

/// A compiled set of URL patterns. A URL matches when any pattern does.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    regexes: Vec<Regex>,
}

impl UrlPattern {
    /// Compile oEmbed-style schemes (`https://youtu.be/*`) and an optional
    /// raw regex.
    ///
    /// `*` in a scheme matches any run of characters. Schemes starting with
    /// `http://` or `https://` accept either protocol.
    pub fn compile(provider: &str, schemes: &[String], pattern: Option<&str>) -> Result<Self> {
        let mut sources: Vec<String> = schemes.iter().map(|s| scheme_to_regex(s)).collect();
        if let Some(pattern) = pattern {
            sources.push(pattern.to_string());
        }
        if sources.is_empty() {
            return Err(Error::config(format!(
                "provider '{}' needs at least one scheme or a pattern",
                provider
            )));
        }

        let regexes = sources
            .iter()
            .map(|source| {
                Regex::new(source).map_err(|source| Error::Pattern {
                    provider: provider.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { regexes })
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.regexes.iter().any(|re| re.is_match(url))
    }

    /// The first regex that matches `url`.
    pub fn find(&self, url: &str) -> Option<&Regex> {
        self.regexes.iter().find(|re| re.is_match(url))
    }
}

/// Translate an oEmbed scheme into an anchored, case-insensitive regex.
pub fn scheme_to_regex(scheme: &str) -> String {
    let (prefix, rest) = if let Some(rest) = scheme.strip_prefix("https://") {
        ("https?://", rest)
    } else if let Some(rest) = scheme.strip_prefix("http://") {
        ("https?://", rest)
    } else {
        ("", scheme)
    };

    let body = rest
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    format!("(?i)^{}{}$", prefix, body)
}
