//! The resolved embed and the data it carries.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::render::{self, Dimension, Element, RenderOptions, WidthSource};

/// How an embed was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedKind {
    /// Fetched from a provider's oEmbed endpoint.
    OEmbed,
    /// Derived locally from a URL pattern and an HTML template.
    Regex,
}

impl fmt::Display for EmbedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedKind::OEmbed => write!(f, "oembed"),
            EmbedKind::Regex => write!(f, "regex"),
        }
    }
}

/// Key/value data describing an embed (`type`, `title`, `width`, `html`,
/// and any provider-specific fields).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbedData(Map<String, Value>);

impl EmbedData {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// String value for `key`.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Numeric value for `key`, accepting numbers and numeric strings.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.str("title")
    }

    pub fn media_type(&self) -> Option<&str> {
        self.str("type")
    }

    pub fn html(&self) -> Option<&str> {
        self.str("html")
    }

    pub fn width(&self) -> Option<f64> {
        self.number("width")
    }

    pub fn height(&self) -> Option<f64> {
        self.number("height")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for EmbedData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Thumbnail advertised by an oEmbed response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Provider settings an embed needs at render time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RenderProfile {
    pub provider: String,
    pub script: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub amp_tag: Option<String>,
}

/// A resolved, renderable embed.
///
/// Built only by [`Resolver`](crate::Resolver). Everything is fixed at
/// construction; the render methods are pure.
#[derive(Debug, Clone)]
pub struct Embed {
    url: String,
    kind: EmbedKind,
    media_type: String,
    data: EmbedData,
    options: RenderOptions,
    amp: bool,
    profile: RenderProfile,
}

impl Embed {
    pub(crate) fn new(
        url: &str,
        kind: EmbedKind,
        data: EmbedData,
        options: RenderOptions,
        amp: bool,
        profile: RenderProfile,
    ) -> Self {
        let media_type = data.media_type().unwrap_or("rich").to_string();
        Self {
            url: url.to_string(),
            kind,
            media_type,
            data,
            options,
            amp,
            profile,
        }
    }

    /// The data as returned by the provider (or derived from the template).
    pub fn data(&self) -> &EmbedData {
        &self.data
    }

    pub fn kind(&self) -> EmbedKind {
        self.kind
    }

    /// Media type label: `video`, `photo`, `rich` or `link`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The URL that was resolved, verbatim.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Name of the provider that produced this embed.
    pub fn provider_name(&self) -> &str {
        &self.profile.provider
    }

    /// External script the provider's markup depends on, if any.
    pub fn script(&self) -> Option<&str> {
        self.profile.script.as_deref()
    }

    /// Default render options carried over from the resolver.
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Whether plain [`html`](Self::html) renders the AMP variant by default.
    pub fn amp(&self) -> bool {
        self.amp
    }

    /// Render the embed markup.
    ///
    /// An explicit `options.width` rescales the height without rounding; a
    /// default width from the resolver rescales it rounded to whole pixels.
    /// When AMP is enabled (per call, else on the embed) this is the same
    /// as [`amp_html`](Self::amp_html).
    pub fn html(&self, options: Option<RenderOptions>) -> String {
        let amp = options
            .and_then(|o| o.amp)
            .or(self.options.amp)
            .unwrap_or(self.amp);
        self.render(options, amp)
    }

    /// Render the AMP variant, falling back to plain markup when the
    /// provider has none.
    pub fn amp_html(&self, options: Option<RenderOptions>) -> String {
        self.render(options, true)
    }

    /// `src` of the rendered root element, or of its first `<source>`.
    pub fn src(&self) -> Option<String> {
        Element::parse(&self.base_html()).and_then(|el| el.src())
    }

    pub fn thumbnail(&self) -> Option<Thumbnail> {
        Some(Thumbnail {
            url: self.data.str("thumbnail_url")?.to_string(),
            width: self.data.number("thumbnail_width"),
            height: self.data.number("thumbnail_height"),
        })
    }

    fn render(&self, options: Option<RenderOptions>, amp: bool) -> String {
        match self.kind {
            EmbedKind::Regex => {
                let html = self.data.html().unwrap_or_default();
                if amp {
                    self.data.str("amp_html").unwrap_or(html).to_string()
                } else {
                    html.to_string()
                }
            }
            EmbedKind::OEmbed => {
                let amp_tag = if amp { self.profile.amp_tag.as_deref() } else { None };
                render::rewrite(
                    &self.base_html(),
                    &self.profile.attributes,
                    self.resize(options),
                    amp_tag,
                )
            }
        }
    }

    fn resize(&self, options: Option<RenderOptions>) -> Option<(Option<u32>, Dimension)> {
        let target = match (options.and_then(|o| o.width), self.options.width) {
            (Some(w), _) => WidthSource::Explicit(w),
            (None, Some(w)) => WidthSource::Default(w),
            (None, None) => return None,
        };
        let width = match target {
            WidthSource::Explicit(w) | WidthSource::Default(w) => w,
        };
        let height = render::scale_height(self.data.width()?, self.data.height()?, target)?;
        Some((Some(width), height))
    }

    /// Provider markup, or markup synthesized for photo and link responses
    /// that carry none.
    fn base_html(&self) -> String {
        if let Some(html) = self.data.html() {
            return html.to_string();
        }

        match (self.media_type.as_str(), self.data.str("url")) {
            ("photo", Some(src)) => {
                let mut img = Element::new("img").with_attr("src", src);
                if let Some(w) = self.data.get("width").and_then(display_number) {
                    img.set("width", w);
                }
                if let Some(h) = self.data.get("height").and_then(display_number) {
                    img.set("height", h);
                }
                img.with_attr("alt", self.data.title().unwrap_or_default())
                    .to_string()
            }
            (_, Some(href)) => Element::new("a")
                .with_attr("href", href)
                .with_inner(htmlescape::encode_minimal(self.data.title().unwrap_or(href)))
                .to_string(),
            _ => String::new(),
        }
    }
}

fn display_number(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
