//! Placeholder substitution for HTML templates.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder regex is valid"));

/// Variable substitution context for provider HTML templates.
///
/// Supports variable substitution in strings using the `{varname}` syntax.
///
/// # Example
///
/// ```
/// use oembed_core::TemplateContext;
/// use regex::Regex;
///
/// let re = Regex::new(r"^(?P<base>.+)\.mp4$").unwrap();
/// let ctx = TemplateContext::from_match(&re, "https://example.com/clip.mp4").unwrap();
///
/// assert_eq!(ctx.substitute("{base}.webm"), "https://example.com/clip.webm");
/// assert_eq!(ctx.substitute("{1}.ogg"), "https://example.com/clip.ogg");
/// assert_eq!(ctx.substitute("{url}"), "https://example.com/clip.mp4");
/// ```
#[derive(Debug, Clone)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty template context.
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    /// Build a context from a regex match against `url`.
    ///
    /// This adds the following variables:
    /// - `{url}` - The full input URL
    /// - `{0}`, `{1}`, ... - Numbered capture groups that participated
    /// - `{name}` - Named capture groups that participated
    ///
    /// Returns `None` when the regex does not match.
    pub fn from_match(regex: &Regex, url: &str) -> Option<Self> {
        let caps = regex.captures(url)?;
        Some(Self::new().with_var("url", url).with_captures(regex, &caps))
    }

    fn with_captures(mut self, regex: &Regex, caps: &Captures<'_>) -> Self {
        for (index, group) in caps.iter().enumerate() {
            if let Some(group) = group {
                self.vars.insert(index.to_string(), group.as_str().to_string());
            }
        }
        for name in regex.capture_names().flatten() {
            if let Some(group) = caps.name(name) {
                self.vars.insert(name.to_string(), group.as_str().to_string());
            }
        }
        self
    }

    /// Add a custom variable.
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Get a variable value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    /// HTML-escape every value so the context can fill markup and quoted
    /// attributes.
    pub fn escaped(mut self) -> Self {
        for value in self.vars.values_mut() {
            *value = htmlescape::encode_minimal(value);
        }
        self
    }

    /// Substitute variables in a string.
    ///
    /// Variables are in the form `{varname}`. Unknown placeholders are left
    /// untouched. The template is scanned once; substituted values are never
    /// rescanned.
    pub fn substitute(&self, template: &str) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| match self.vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_and_named_groups() {
        let re = Regex::new(r"^(?P<base>https?://.+)\.(?P<ext>mp4|webm)$").unwrap();
        let ctx = TemplateContext::from_match(&re, "https://cdn.example.com/a/b.webm").unwrap();

        assert_eq!(ctx.get("base"), Some("https://cdn.example.com/a/b"));
        assert_eq!(ctx.get("ext"), Some("webm"));
        assert_eq!(ctx.get("1"), Some("https://cdn.example.com/a/b"));
        assert_eq!(ctx.get("0"), Some("https://cdn.example.com/a/b.webm"));
    }

    #[test]
    fn test_no_match() {
        let re = Regex::new(r"\.mp4$").unwrap();
        assert!(TemplateContext::from_match(&re, "https://example.com/page").is_none());
    }

    #[test]
    fn test_custom_var() {
        let ctx = TemplateContext::new()
            .with_var("src", "movie.mp4")
            .with_var("kind", "video/mp4");

        assert_eq!(
            ctx.substitute(r#"<source src="{src}" type="{kind}">"#),
            r#"<source src="movie.mp4" type="video/mp4">"#
        );
    }

    #[test]
    fn test_unknown_placeholder_untouched() {
        let ctx = TemplateContext::new().with_var("a", "x");
        assert_eq!(ctx.substitute("{a}-{b}"), "x-{b}");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let ctx = TemplateContext::new()
            .with_var("a", "{b}")
            .with_var("b", "{a}");
        for _ in 0..8 {
            assert_eq!(ctx.substitute("{a}|{b}"), "{b}|{a}");
        }
    }

    #[test]
    fn test_escaped_values() {
        let ctx = TemplateContext::new()
            .with_var("src", r#"a"><script>x</script>&"#)
            .escaped();
        assert_eq!(
            ctx.substitute(r#"<source src="{src}">"#),
            r#"<source src="a&quot;&gt;&lt;script&gt;x&lt;/script&gt;&amp;">"#
        );
    }

    #[test]
    fn test_optional_group_absent() {
        let re = Regex::new(r"^(?P<base>.+?)(?P<query>\?.*)?$").unwrap();
        let ctx = TemplateContext::from_match(&re, "https://example.com/x.mp4").unwrap();
        assert_eq!(ctx.get("query"), None);
        assert_eq!(ctx.substitute("{base}"), "https://example.com/x.mp4");
    }
}
