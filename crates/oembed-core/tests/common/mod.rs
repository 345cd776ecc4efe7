//! Shared test harness for integration tests.
//!
//! Provides [`StubFetcher`], a [`Fetch`] implementation that answers from
//! canned responses keyed by URL prefix and records every request, plus
//! the provider payloads used across tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use oembed_core::{Fetch, FetchError, FetchResponse, ProviderRegistry, Resolver, ResolverConfig};
use serde_json::json;

pub const YOUTUBE_URL: &str = "http://youtu.be/dQw4w9WgXcQ";
pub const TIKTOK_URL: &str = "https://www.tiktok.com/@art._.gorl/video/6702887440236940549";
pub const TWITTER_URL: &str = "https://twitter.com/DariuszPrzada/status/1333130982774468608";
pub const VIDEO_URL: &str = "https://example.com/hello.mp4";

pub const YOUTUBE_IFRAME: &str = r#"<iframe width="560" height="315" src="https://www.youtube.com/embed/dQw4w9WgXcQ?feature=oembed" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe>"#;

pub const TIKTOK_HTML: &str = r#"<blockquote class="tiktok-embed" cite="https://www.tiktok.com/@art._.gorl/video/6702887440236940549" data-video-id="6702887440236940549" style="max-width: 605px;min-width: 325px;" > <section> <a target="_blank" title="@art._.gorl" href="https://www.tiktok.com/@art._.gorl">@art._.gorl</a> <p>pt. 1 of turning my room into my own space // <a title="bed" target="_blank" href="https://www.tiktok.com/tag/bed">#bed</a> <a title="redoingmyroom" target="_blank" href="https://www.tiktok.com/tag/redoingmyroom">#redoingmyroom</a></p> <a target="_blank" title="♬ original sound - tiff" href="https://www.tiktok.com/music/original-sound-6689804660171082501">♬ original sound - tiff</a> </section> </blockquote> <script async src="https://www.tiktok.com/embed.js"></script>"#;

pub const TWITTER_HTML: &str = "<blockquote class=\"twitter-tweet\"><p lang=\"en\" dir=\"ltr\">Hello</p>&mdash; Dariusz Przada (@DariuszPrzada) <a href=\"https://twitter.com/DariuszPrzada/status/1333130982774468608?ref_src=twsrc%5Etfw\">November 29, 2020</a></blockquote>\n<script async src=\"https://platform.twitter.com/widgets.js\" charset=\"utf-8\"></script>\n";

pub fn youtube_body() -> String {
    json!({
        "title": "Rick Astley - Never Gonna Give You Up (Video)",
        "author_name": "RickAstleyVEVO",
        "author_url": "https://www.youtube.com/user/RickAstleyVEVO",
        "type": "video",
        "height": 315,
        "width": 560,
        "version": "1.0",
        "provider_name": "YouTube",
        "provider_url": "https://www.youtube.com/",
        "thumbnail_height": 360,
        "thumbnail_width": 480,
        "thumbnail_url": "https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg",
        "html": YOUTUBE_IFRAME,
    })
    .to_string()
}

pub fn tiktok_body() -> String {
    json!({
        "version": "1.0",
        "type": "video",
        "title": "pt. 1 of turning my room into my own space",
        "author_name": "tiff",
        "provider_name": "TikTok",
        "width": "100%",
        "height": "100%",
        "html": TIKTOK_HTML,
    })
    .to_string()
}

pub fn twitter_body() -> String {
    json!({
        "url": TWITTER_URL,
        "author_name": "Dariusz Przada",
        "html": TWITTER_HTML,
        "width": 550,
        "height": null,
        "type": "rich",
        "provider_name": "Twitter",
        "version": "1.0",
    })
    .to_string()
}

/// Canned-response fetcher. Unknown URLs get a 404.
#[derive(Clone, Default)]
pub struct StubFetcher {
    responses: Vec<(String, FetchResponse)>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher that knows the YouTube, TikTok and Twitter endpoints.
    pub fn with_providers() -> Self {
        Self::new()
            .respond("https://www.youtube.com/oembed", 200, youtube_body())
            .respond("https://www.tiktok.com/oembed", 200, tiktok_body())
            .respond("https://publish.twitter.com/oembed", 200, twitter_body())
    }

    pub fn respond(mut self, prefix: &str, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .push((prefix.to_string(), FetchResponse::new(status, body)));
        self
    }

    /// Shared handle to the list of requested URLs.
    pub fn requests(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.requests)
    }
}

impl Fetch for StubFetcher {
    fn request(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        Ok(self
            .responses
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| FetchResponse::new(404, "Not Found")))
    }
}

/// Resolver over the bundled providers and [`StubFetcher::with_providers`].
pub fn resolver() -> Resolver {
    resolver_with(ResolverConfig::default())
}

pub fn resolver_with(config: ResolverConfig) -> Resolver {
    Resolver::with_config(
        ProviderRegistry::builtin().expect("bundled providers load"),
        StubFetcher::with_providers(),
        config,
    )
}
