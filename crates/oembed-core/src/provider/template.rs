//! Template strategy: derive embed markup from the URL itself.

use regex::Regex;
use serde_json::{Map, Value};

use crate::embed::EmbedData;
use crate::error::{Error, Result};
use crate::template::TemplateContext;

/// Media type used when a template provider does not declare one.
pub const DEFAULT_MEDIA_TYPE: &str = "video";

/// Builds embed data from regex captures and HTML templates. Never touches
/// the network.
#[derive(Debug, Clone)]
pub struct TemplateStrategy {
    provider: String,
    regex: Regex,
    media_type: String,
    html: String,
    amp_html: Option<String>,
}

impl TemplateStrategy {
    pub fn new(
        provider: &str,
        pattern: &str,
        media_type: Option<&str>,
        html: &str,
        amp_html: Option<&str>,
    ) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| Error::Pattern {
            provider: provider.to_string(),
            source,
        })?;

        Ok(Self {
            provider: provider.to_string(),
            regex,
            media_type: media_type.unwrap_or(DEFAULT_MEDIA_TYPE).to_string(),
            html: html.to_string(),
            amp_html: amp_html.map(str::to_string),
        })
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Populate the templates from `url`.
    ///
    /// The resulting data carries `type`, `provider_name`, `html` and, when
    /// the provider declares one, `amp_html`. There is never a `title`.
    pub fn resolve(&self, url: &str) -> Result<EmbedData> {
        let ctx = TemplateContext::from_match(&self.regex, url)
            .ok_or_else(|| Error::NoProviderMatch {
                url: url.to_string(),
            })?
            .escaped();

        let mut map = Map::new();
        map.insert("type".into(), Value::String(self.media_type.clone()));
        map.insert("provider_name".into(), Value::String(self.provider.clone()));
        map.insert("html".into(), Value::String(ctx.substitute(&self.html)));
        if let Some(amp_html) = &self.amp_html {
            map.insert("amp_html".into(), Value::String(ctx.substitute(amp_html)));
        }

        Ok(EmbedData::new(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<video controls="controls" layout="responsive"><source src="{base}.webm" type="video/webm"><source src="{base}.ogg" type="video/ogg"><source src="{base}.mp4" type="video/mp4"></video>"#;

    fn html5_video() -> TemplateStrategy {
        TemplateStrategy::new(
            "HTML5 video",
            r"(?i)^(?P<base>https?://.+)\.(?:mp4|ogg|webm)$",
            None,
            HTML,
            None,
        )
        .unwrap()
    }

    #[test]
    fn populates_sources() {
        let data = html5_video().resolve("https://example.com/hello.webm").unwrap();
        assert_eq!(
            data.html(),
            Some(r#"<video controls="controls" layout="responsive"><source src="https://example.com/hello.webm" type="video/webm"><source src="https://example.com/hello.ogg" type="video/ogg"><source src="https://example.com/hello.mp4" type="video/mp4"></video>"#)
        );
        assert_eq!(data.media_type(), Some("video"));
        assert!(!data.contains_key("title"));
        assert!(!data.contains_key("amp_html"));
    }

    #[test]
    fn captures_are_escaped() {
        let data = html5_video()
            .resolve(r#"https://example.com/a"><b>x</b>.mp4"#)
            .unwrap();
        let html = data.html().unwrap();
        assert!(!html.contains("<b>"));
        assert!(html.contains(r#"src="https://example.com/a&quot;&gt;&lt;b&gt;x&lt;/b&gt;.webm""#));
    }

    #[test]
    fn unmatched_url() {
        let err = html5_video().resolve("https://example.com/hello.mp3").unwrap_err();
        assert!(matches!(err, Error::NoProviderMatch { .. }));
    }

    #[test]
    fn custom_media_type() {
        let s = TemplateStrategy::new("audio", r"\.mp3$", Some("audio"), "<audio src=\"{url}\"></audio>", None)
            .unwrap();
        assert_eq!(s.media_type(), "audio");
        let data = s.resolve("https://example.com/a.mp3").unwrap();
        assert_eq!(data.html(), Some("<audio src=\"https://example.com/a.mp3\"></audio>"));
    }
}
