//! oEmbed protocol strategy: build the endpoint URL, fetch it, parse the
//! JSON or XML response.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use url::Url;

use crate::embed::EmbedData;
use crate::error::{Error, Result};
use crate::fetch::Fetch;

/// Fields whose values are numbers in the JSON flavour of the protocol.
const NUMERIC_FIELDS: &[&str] = &[
    "width",
    "height",
    "thumbnail_width",
    "thumbnail_height",
    "cache_age",
];

/// Response format requested from the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Xml,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Json => "json",
            ResponseFormat::Xml => "xml",
        }
    }
}

/// Size hints forwarded to providers as `maxwidth` / `maxheight`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(default)]
    pub max_height: Option<u32>,
}

/// Resolves URLs through a provider's oEmbed endpoint.
#[derive(Debug, Clone)]
pub struct ProtocolStrategy {
    provider: String,
    endpoint: String,
    format: ResponseFormat,
}

impl ProtocolStrategy {
    /// Validate the endpoint template and build the strategy.
    pub fn new(provider: &str, endpoint: &str, format: ResponseFormat) -> Result<Self> {
        let probe = endpoint
            .replace("{url}", "x")
            .replace("{format}", format.as_str());
        Url::parse(&probe).map_err(|source| Error::Endpoint {
            provider: provider.to_string(),
            source,
        })?;

        Ok(Self {
            provider: provider.to_string(),
            endpoint: endpoint.to_string(),
            format,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    /// Build the request URL for `url`.
    ///
    /// `{url}` and `{format}` placeholders are substituted; missing `url`
    /// and `format` query parameters are appended, followed by the size
    /// hints.
    pub fn request_url(&self, url: &str, options: &FetchOptions) -> Result<String> {
        let has_url = self.endpoint.contains("{url}");
        let has_format = self.endpoint.contains("{format}");
        let substituted = self
            .endpoint
            .replace("{url}", &encode_component(url))
            .replace("{format}", self.format.as_str());

        let mut request = Url::parse(&substituted).map_err(|source| Error::Endpoint {
            provider: self.provider.clone(),
            source,
        })?;

        let has_format_param = request.query_pairs().any(|(k, _)| k == "format");
        {
            let mut query = request.query_pairs_mut();
            if !has_url {
                query.append_pair("url", url);
            }
            if !has_format && !has_format_param {
                query.append_pair("format", self.format.as_str());
            }
            if let Some(w) = options.max_width {
                query.append_pair("maxwidth", &w.to_string());
            }
            if let Some(h) = options.max_height {
                query.append_pair("maxheight", &h.to_string());
            }
        }

        Ok(request.into())
    }

    /// Fetch and parse embed data for `url`. One request, no retries.
    pub fn resolve(&self, url: &str, fetcher: &dyn Fetch, options: &FetchOptions) -> Result<EmbedData> {
        let request = self.request_url(url, options)?;
        tracing::debug!(provider = %self.provider, %request, "Requesting oEmbed endpoint");

        let response = fetcher.request(&request).map_err(|source| Error::Fetch {
            url: request.clone(),
            source,
        })?;
        if !response.is_success() {
            return Err(Error::Status {
                provider: self.provider.clone(),
                status: response.status,
            });
        }

        self.parse(&response.body)
    }

    /// Parse a response body into embed data.
    pub fn parse(&self, body: &str) -> Result<EmbedData> {
        let mut map = match self.format {
            ResponseFormat::Json => parse_json(body).map_err(|m| Error::parse(&self.provider, m))?,
            ResponseFormat::Xml => parse_xml(body).map_err(|m| Error::parse(&self.provider, m))?,
        };

        match map.get("type") {
            Some(Value::String(t)) if !t.is_empty() => {}
            _ => return Err(Error::parse(&self.provider, "response has no type")),
        }
        if !map.contains_key("provider_name") {
            map.insert("provider_name".into(), Value::String(self.provider.clone()));
        }

        Ok(EmbedData::new(map))
    }
}

fn parse_json(body: &str) -> std::result::Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("response is not a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Parse the flat `<oembed>` document. Text and CDATA content is kept,
/// entities are decoded, numeric fields become numbers. Elements nested
/// below a field are ignored.
fn parse_xml(body: &str) -> std::result::Result<Map<String, Value>, String> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut map = Map::new();
    let mut seen_root = false;
    let mut depth = 0usize;
    let mut field: Option<(String, String)> = None;

    loop {
        match reader.read_event().map_err(|e| format!("malformed XML: {}", e))? {
            Event::Start(e) => {
                depth += 1;
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match depth {
                    1 if name == "oembed" => seen_root = true,
                    1 => return Err(format!("unexpected root element <{}>", name)),
                    2 => field = Some((name, String::new())),
                    _ => {}
                }
            }
            Event::Empty(e) if depth == 1 => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                map.insert(name, Value::String(String::new()));
            }
            Event::Text(e) if depth == 2 => {
                let raw = std::str::from_utf8(&e).map_err(|e| e.to_string())?;
                let text = htmlescape::decode_html(raw).map_err(|e| format!("bad entity: {:?}", e))?;
                if let Some((_, value)) = field.as_mut() {
                    value.push_str(&text);
                }
            }
            Event::CData(e) if depth == 2 => {
                let raw = std::str::from_utf8(&e).map_err(|e| e.to_string())?;
                if let Some((_, value)) = field.as_mut() {
                    value.push_str(raw);
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some((name, text)) = field.take() {
                        let value = field_value(&name, text);
                        map.insert(name, value);
                    }
                }
                depth = depth.saturating_sub(1);
                if depth == 0 && seen_root {
                    break;
                }
            }
            Event::Eof if depth > 0 => return Err("unterminated <oembed> element".to_string()),
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err("response has no <oembed> element".to_string());
    }
    if map.is_empty() {
        return Err("empty <oembed> element".to_string());
    }
    Ok(map)
}

fn field_value(name: &str, text: String) -> Value {
    if NUMERIC_FIELDS.contains(&name) {
        if let Ok(n) = text.parse::<u64>() {
            return Value::Number(Number::from(n));
        }
    }
    Value::String(text)
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchError, FetchResponse};

    fn youtube() -> ProtocolStrategy {
        ProtocolStrategy::new("YouTube", "https://www.youtube.com/oembed", ResponseFormat::Json).unwrap()
    }

    #[test]
    fn appends_url_and_format() {
        let url = youtube()
            .request_url("http://youtu.be/dQw4w9WgXcQ", &FetchOptions::default())
            .unwrap();
        assert_eq!(
            url,
            "https://www.youtube.com/oembed?url=http%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ&format=json"
        );
    }

    #[test]
    fn substitutes_placeholders() {
        let s = ProtocolStrategy::new(
            "Example",
            "https://example.com/oembed.{format}?url={url}",
            ResponseFormat::Xml,
        )
        .unwrap();
        let url = s
            .request_url(
                "https://example.com/v/1?a=b",
                &FetchOptions {
                    max_width: Some(640),
                    max_height: None,
                },
            )
            .unwrap();
        assert_eq!(
            url,
            "https://example.com/oembed.xml?url=https%3A%2F%2Fexample.com%2Fv%2F1%3Fa%3Db&maxwidth=640"
        );
    }

    #[test]
    fn keeps_existing_format_param() {
        let s = ProtocolStrategy::new("X", "https://x.test/oembed?format=json", ResponseFormat::Json).unwrap();
        let url = s.request_url("https://x.test/1", &FetchOptions::default()).unwrap();
        assert_eq!(url, "https://x.test/oembed?format=json&url=https%3A%2F%2Fx.test%2F1");
    }

    #[test]
    fn rejects_bad_endpoint() {
        let err = ProtocolStrategy::new("Bad", "not a url", ResponseFormat::Json).unwrap_err();
        assert!(matches!(err, Error::Endpoint { .. }));
    }

    #[test]
    fn parse_json_fills_provider_name() {
        let data = youtube()
            .parse(r#"{"type":"video","title":"t","width":560,"height":315,"html":"<iframe></iframe>"}"#)
            .unwrap();
        assert_eq!(data.str("provider_name"), Some("YouTube"));
        assert_eq!(data.title(), Some("t"));
    }

    #[test]
    fn parse_requires_type() {
        let err = youtube().parse(r#"{"title":"t"}"#).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(youtube().parse("[1,2]").is_err());
        assert!(youtube().parse("<html>").is_err());
    }

    #[test]
    fn parse_xml_document() {
        let s = ProtocolStrategy::new("Flickr", "https://www.flickr.com/services/oembed/", ResponseFormat::Xml)
            .unwrap();
        let body = r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<oembed>
  <version>1.0</version>
  <type>video</type>
  <title>Tom &amp; Jerry</title>
  <width>640</width>
  <height>360</height>
  <html>&lt;iframe src="https://example.com/e/1"&gt;&lt;/iframe&gt;</html>
</oembed>"#;
        let data = s.parse(body).unwrap();
        assert_eq!(data.media_type(), Some("video"));
        assert_eq!(data.title(), Some("Tom & Jerry"));
        assert_eq!(data.get("width"), Some(&Value::from(640u64)));
        assert_eq!(data.html(), Some(r#"<iframe src="https://example.com/e/1"></iframe>"#));
        assert_eq!(data.str("provider_name"), Some("Flickr"));
    }

    fn flickr() -> ProtocolStrategy {
        ProtocolStrategy::new("Flickr", "https://www.flickr.com/services/oembed/", ResponseFormat::Xml)
            .unwrap()
    }

    #[test]
    fn parse_xml_cdata_html() {
        let body = r#"<oembed>
  <type>video</type>
  <width>640</width>
  <html><![CDATA[<iframe src="https://x.test/e/1"></iframe>]]></html>
</oembed>"#;
        let data = flickr().parse(body).unwrap();
        assert_eq!(data.html(), Some(r#"<iframe src="https://x.test/e/1"></iframe>"#));
        assert_eq!(data.width(), Some(640.0));
    }

    #[test]
    fn parse_xml_rejects_malformed_documents() {
        let mismatched = "<oembed><type>video</kind></oembed>";
        assert!(matches!(flickr().parse(mismatched), Err(Error::Parse { .. })));

        let wrong_root = "<response><type>video</type></response>";
        assert!(matches!(flickr().parse(wrong_root), Err(Error::Parse { .. })));

        let unterminated = "<oembed><type>video</type>";
        assert!(matches!(flickr().parse(unterminated), Err(Error::Parse { .. })));
    }

    #[test]
    fn parse_xml_ignores_nested_elements() {
        let body = "<oembed><type>photo</type><extra><inner>1</inner></extra><url>https://x.test/p.jpg</url></oembed>";
        let data = flickr().parse(body).unwrap();
        assert_eq!(data.str("url"), Some("https://x.test/p.jpg"));
        assert_eq!(data.str("extra"), Some(""));
        assert!(!data.contains_key("inner"));
    }

    #[test]
    fn resolve_non_success_status() {
        let fetcher = |_: &str| -> std::result::Result<FetchResponse, FetchError> {
            Ok(FetchResponse::new(404, "Not Found"))
        };
        let err = youtube()
            .resolve("http://youtu.be/x", &fetcher, &FetchOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }

    #[test]
    fn resolve_transport_failure() {
        let fetcher = |url: &str| -> std::result::Result<FetchResponse, FetchError> {
            Err(FetchError::Timeout { url: url.to_string() })
        };
        let err = youtube()
            .resolve("http://youtu.be/x", &fetcher, &FetchOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Fetch { source: FetchError::Timeout { .. }, .. }));
    }
}
