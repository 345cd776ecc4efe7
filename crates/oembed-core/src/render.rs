//! HTML rendering for resolved embeds.
//!
//! Provider fragments that consist of a single element (an `<iframe>`, a
//! `<video>` with `<source>` children, ...) are parsed into an [`Element`]
//! so that their `width`/`height` attributes can be rewritten and their
//! root tag swapped for an AMP equivalent. Anything else is passed through
//! verbatim.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static ROOT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*<([a-zA-Z][a-zA-Z0-9-]*)((?:\s+[^\s=/>]+(?:\s*=\s*(?:\x22[^\x22]*\x22|'[^']*'|[^\s\x22'>]+))?)*)\s*(/?)>(.*)$")
        .expect("root tag regex is valid")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/>]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("attribute regex is valid")
});

static SOURCE_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<source\b[^>]*?\ssrc\s*=\s*"([^"]*)""#).expect("source regex is valid")
});

/// Elements that never have a closing tag.
const VOID_TAGS: &[&str] = &["img", "source", "embed", "br", "hr", "input", "meta", "link"];

/// Per-call (or per-resolver default) rendering options.
///
/// Every field is optional; an empty value means "use whatever the
/// provider supplied".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Requested output width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Render the AMP variant instead of plain HTML.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amp: Option<bool>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested width.
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the AMP override.
    pub fn amp(mut self, amp: bool) -> Self {
        self.amp = Some(amp);
        self
    }

    /// `true` when no option is set.
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.amp.is_none()
    }
}

/// Output dimension: either taken verbatim or computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Pixels(u32),
    Exact(f64),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Dimension::Pixels(px) => write!(f, "{}", px),
            Dimension::Exact(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                write!(f, "{}", value as i64)
            }
            Dimension::Exact(value) => write!(f, "{}", value),
        }
    }
}

/// How a requested width was supplied, which decides rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthSource {
    /// Width passed to the render call itself: height is kept exact.
    Explicit(u32),
    /// Width from the resolver's default options: height is rounded.
    Default(u32),
}

/// Compute the height that keeps the original aspect ratio at `target`.
///
/// Returns `None` when the width is unchanged or the original dimensions
/// cannot produce a ratio.
pub fn scale_height(original_width: f64, original_height: f64, target: WidthSource) -> Option<Dimension> {
    if original_width <= 0.0 || original_height <= 0.0 {
        return None;
    }

    let (width, round) = match target {
        WidthSource::Explicit(w) => (w, false),
        WidthSource::Default(w) => (w, true),
    };
    if f64::from(width) == original_width {
        return None;
    }

    // width / (w0 / h0), multiplied out to keep exact halves exact.
    let height = f64::from(width) * original_height / original_width;
    Some(if round {
        Dimension::Pixels(height.round() as u32)
    } else {
        Dimension::Exact(height)
    })
}

/// A single parsed HTML element with ordered attributes.
///
/// Attributes without a value are stored with an empty string and rendered
/// as `name=""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub inner: String,
    void: bool,
}

impl Element {
    /// Parse a fragment that consists of exactly one element.
    ///
    /// Returns `None` for empty input, text, or multiple top-level
    /// elements.
    pub fn parse(fragment: &str) -> Option<Self> {
        let caps = ROOT_TAG.captures(fragment)?;
        let tag = caps.get(1)?.as_str().to_string();
        let attrs = caps.get(2).map_or("", |m| m.as_str());
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
        let rest = caps.get(4).map_or("", |m| m.as_str()).trim_end();

        let lower = tag.to_ascii_lowercase();
        let (inner, void) = if self_closing || (VOID_TAGS.contains(&lower.as_str()) && rest.is_empty()) {
            (String::new(), true)
        } else {
            let close = format!("</{}>", tag);
            let inner = strip_suffix_ignore_case(rest, &close)?;
            // `<a></a><a></a>` leaves an unbalanced `</a><a>` inside.
            if !is_balanced(inner, &lower) {
                return None;
            }
            (inner.to_string(), false)
        };

        let attributes = ATTRIBUTE
            .captures_iter(attrs)
            .filter_map(|c| {
                let name = c.get(1)?.as_str().to_string();
                let value = c
                    .get(2)
                    .or_else(|| c.get(3))
                    .or_else(|| c.get(4))
                    .map_or("", |m| m.as_str());
                Some((name, htmlescape::decode_html(value).unwrap_or_else(|_| value.to_string())))
            })
            .collect();

        Some(Self {
            tag,
            attributes,
            inner,
            void,
        })
    }

    /// Build an element from parts.
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let void = VOID_TAGS.contains(&tag.to_ascii_lowercase().as_str());
        Self {
            tag,
            attributes: Vec::new(),
            inner: String::new(),
            void,
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_inner(mut self, inner: impl Into<String>) -> Self {
        self.inner = inner.into();
        self.void = false;
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace an attribute in place, or append it.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Append an attribute only when it is absent.
    pub fn set_default(&mut self, name: &str, value: &str) {
        if self.get(name).is_none() {
            self.attributes.push((name.to_string(), value.to_string()));
        }
    }

    /// Rename the root tag, keeping attributes and children.
    pub fn rename(&mut self, tag: &str) {
        self.tag = tag.to_string();
        // amp-img and friends need an explicit closing tag.
        self.void = false;
    }

    /// `src` of the element, or of its first `<source>` child.
    pub fn src(&self) -> Option<String> {
        self.get("src").map(str::to_string).or_else(|| {
            SOURCE_SRC
                .captures(&self.inner)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (name, value) in &self.attributes {
            write!(f, " {}=\"{}\"", name, escape_attribute(value))?;
        }
        if self.void {
            write!(f, ">")
        } else {
            write!(f, ">{}</{}>", self.inner, self.tag)
        }
    }
}

/// Resize a single-element fragment and/or swap its root tag.
///
/// `extra` attributes are appended when the element lacks them. Returns the
/// fragment untouched when it is not a single element.
pub fn rewrite(
    fragment: &str,
    extra: &[(String, String)],
    size: Option<(Option<u32>, Dimension)>,
    amp_tag: Option<&str>,
) -> String {
    let Some(mut element) = Element::parse(fragment) else {
        return fragment.to_string();
    };

    for (name, value) in extra {
        element.set_default(name, value);
    }
    if let Some((width, height)) = size {
        if let Some(width) = width {
            element.set("width", width.to_string());
        }
        element.set("height", height.to_string());
    }
    if let Some(tag) = amp_tag {
        element.rename(tag);
    }

    element.to_string()
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = s.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// Checks that every `<tag` inside `inner` is closed before any stray
/// `</tag>` appears. `tag` must be lowercase.
fn is_balanced(inner: &str, tag: &str) -> bool {
    let lower = inner.to_ascii_lowercase();
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut depth = 0usize;
    let mut i = 0;

    while i < lower.len() {
        let rest = &lower[i..];
        if rest.starts_with(&close) {
            if depth == 0 {
                return false;
            }
            depth -= 1;
            i += close.len();
        } else if rest.starts_with(&open)
            && rest[open.len()..].starts_with(|c: char| c.is_whitespace() || c == '>' || c == '/')
        {
            depth += 1;
            i += open.len();
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
        }
    }

    depth == 0
}
