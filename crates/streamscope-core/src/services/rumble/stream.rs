//! Rumble video extractor

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use scraper::{ElementRef, Html};
use serde_json::Value;

use crate::client::Downloader;
use crate::error::{ExtractorError, Result};
use crate::extractor::{Extractor, FetchStatus, PageState, StreamExtractor};
use crate::linkhandler::LinkHandler;
use crate::parser::{html, json, text};
use crate::types::{
    DeliveryMethod, Description, InfoItem, MediaFormat, StreamInfoItem, StreamType, UNKNOWN_COUNT,
    VideoStream,
};
use crate::url::absolutize;

use super::{BASE_URL, RUMBLE_ID};

const EMBED_JS_URL: &str = "https://rumble.com/embedJS/u3/?request=video&ver=2&v=";

/// JSON pointers into the embed player response
struct EmbedFields {
    title: &'static str,
    thumbnail: &'static str,
    pub_date: &'static str,
    duration: &'static str,
    author_name: &'static str,
    author_url: &'static str,
    live: &'static str,
    formats: &'static str,
    hls: &'static str,
}

const FIELDS: EmbedFields = EmbedFields {
    title: "/title",
    thumbnail: "/i",
    pub_date: "/pubDate",
    duration: "/duration",
    author_name: "/author/name",
    author_url: "/author/url",
    live: "/live",
    formats: "/ua",
    hls: "/ua/hls/auto/url",
};

/// CSS selectors into the watch page
struct PageSelectors {
    view_count: &'static str,
    description: &'static str,
    uploader_link: &'static str,
    related: &'static str,
}

const SELECTORS: PageSelectors = PageSelectors {
    view_count: "span.media-heading-info",
    description: "p.media-description",
    uploader_link: "a.media-by--a",
    related: "ul.mediaList-list li.mediaList-item",
};

const AVATAR_CLASS_PREFIX: &str = "user-image--img--id-";

#[derive(Debug)]
struct VideoPage {
    html: String,
    embed: Value,
}

impl VideoPage {
    fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Extracts one video or live stream
pub struct RumbleStreamExtractor {
    link: LinkHandler,
    downloader: Arc<dyn Downloader>,
    state: PageState<VideoPage>,
    video_streams: OnceLock<Vec<VideoStream>>,
    related_items: OnceLock<Vec<InfoItem>>,
}

impl RumbleStreamExtractor {
    pub fn new(link: LinkHandler, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            link,
            downloader,
            state: PageState::new(),
            video_streams: OnceLock::new(),
            related_items: OnceLock::new(),
        }
    }

    fn embed(&self) -> Result<&Value> {
        Ok(&self.state.page()?.embed)
    }

    fn document(&self) -> Result<Html> {
        Ok(self.state.page()?.document())
    }

    fn extract_video_streams(&self) -> Result<Vec<VideoStream>> {
        let embed = self.embed()?;
        let formats = json::object_at(embed, FIELDS.formats)?;

        if self.stream_type()? == StreamType::LiveStream
            && let Some(url) = json::opt_str_at(embed, FIELDS.hls)?
        {
            return Ok(vec![VideoStream {
                url: url.to_string(),
                resolution: String::new(),
                format: MediaFormat::Mpeg4,
                delivery: DeliveryMethod::Hls,
                video_only: false,
            }]);
        }

        let mut streams = Vec::new();
        for (key, resolutions) in formats {
            let format = MediaFormat::from_suffix(key);
            if key == "hls" || format == MediaFormat::Unknown {
                continue;
            }
            let Some(resolutions) = resolutions.as_object() else {
                return Err(ExtractorError::structural(
                    format!("{}/{}", FIELDS.formats, key),
                    "expected object",
                ));
            };

            let mut entries = Vec::with_capacity(resolutions.len());
            for (resolution, entry) in resolutions {
                let url = json::str_at(entry, "/url")?;
                entries.push((resolution.parse::<u32>().unwrap_or(0), resolution, url));
            }
            entries.sort_by_key(|(height, _, _)| *height);

            streams.extend(entries.into_iter().map(|(_, resolution, url)| VideoStream {
                url: url.to_string(),
                resolution: format!("{}p", resolution),
                format,
                delivery: DeliveryMethod::ProgressiveHttp,
                video_only: false,
            }));
        }
        Ok(streams)
    }

    fn extract_related_items(&self) -> Result<Vec<InfoItem>> {
        let document = self.document()?;
        let sel = html::selector(SELECTORS.related)?;
        Ok(document
            .select(&sel)
            .filter_map(|el| parse_related(&el))
            .collect())
    }
}

fn parse_related(element: &ElementRef) -> Option<InfoItem> {
    let href = html::child_attr(element, "a.mediaList-link", "href")?;
    let name = html::child_text(element, "h3.mediaList-heading")?;
    Some(InfoItem::Stream(StreamInfoItem {
        name: text::unescape_entities(&name),
        url: absolutize(BASE_URL, &href),
        thumbnail_url: html::child_attr(element, "img.mediaList-image", "src"),
        uploader_name: html::child_text(element, "h4.mediaList-by-heading").unwrap_or_default(),
        uploader_url: None,
        duration: html::child_text(element, "small.mediaList-duration")
            .and_then(|d| text::parse_duration(&d))
            .unwrap_or(UNKNOWN_COUNT),
        view_count: html::child_text(element, "small.mediaList-plays")
            .and_then(|v| text::parse_count(&v))
            .unwrap_or(UNKNOWN_COUNT),
        textual_upload_date: html::child_attr(element, "time", "datetime"),
        stream_type: StreamType::VideoStream,
    }))
}

/// Player id from the `ld+json` block (`.../embed/<id>/`)
fn embed_id(ld_json: &Value) -> Result<String> {
    let pointer = if ld_json.is_array() { "/0/embedUrl" } else { "/embedUrl" };
    let embed_url = json::str_at(ld_json, pointer)?;
    let parsed = reqwest::Url::parse(embed_url)
        .map_err(|e| ExtractorError::structural(pointer, e.to_string()))?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();
    match segments.as_slice() {
        [kind, id] if kind.eq_ignore_ascii_case("embed") => Ok(id.to_string()),
        _ => Err(ExtractorError::structural(
            pointer,
            format!("unexpected embed url {}", embed_url),
        )),
    }
}

async fn fetch_video(downloader: Arc<dyn Downloader>, url: String) -> Result<VideoPage> {
    let page = downloader.get(&url, &[]).await?;
    let id = {
        let document = Html::parse_document(&page.body);
        embed_id(&html::json_script(&document, "application/ld+json")?)?
    };

    let player = downloader.get(&format!("{}{}", EMBED_JS_URL, id), &[]).await?;
    let embed = json::parse(&player.body, "embedJS")?;
    if !embed.is_object() {
        return Err(ExtractorError::structural("embedJS", "expected object"));
    }
    Ok(VideoPage {
        html: page.body,
        embed,
    })
}

#[async_trait]
impl Extractor for RumbleStreamExtractor {
    fn service_id(&self) -> u32 {
        RUMBLE_ID
    }

    fn link_handler(&self) -> &LinkHandler {
        &self.link
    }

    fn status(&self) -> FetchStatus {
        self.state.status()
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let url = self.link.url.clone();
        let fetch = fetch_video(Arc::clone(&self.downloader), url.clone());
        self.state.fetch_with(&url, fetch).await
    }

    fn name(&self) -> Result<String> {
        Ok(text::unescape_entities(json::str_at(self.embed()?, FIELDS.title)?))
    }
}

impl StreamExtractor for RumbleStreamExtractor {
    fn textual_upload_date(&self) -> Result<Option<String>> {
        Ok(json::opt_str_at(self.embed()?, FIELDS.pub_date)?.map(str::to_string))
    }

    /// `pubDate` is ISO 8601 with offset ("2021-02-08T19:37:25+00:00")
    fn upload_date(&self) -> Result<Option<DateTime<FixedOffset>>> {
        self.textual_upload_date()?
            .filter(|date| !date.is_empty())
            .map(|date| {
                DateTime::parse_from_rfc3339(&date)
                    .map_err(|e| ExtractorError::structural(FIELDS.pub_date, e.to_string()))
            })
            .transpose()
    }

    fn thumbnail_url(&self) -> Result<Option<String>> {
        Ok(json::opt_str_at(self.embed()?, FIELDS.thumbnail)?.map(str::to_string))
    }

    /// Direct text of the description paragraph; nested markup is skipped
    fn description(&self) -> Result<Description> {
        let document = self.document()?;
        let sel = html::selector(SELECTORS.description)?;
        let mut content = String::new();
        if let Some(paragraph) = document.select(&sel).next() {
            for child in paragraph.children() {
                if let Some(node) = child.value().as_text()
                    && !node.trim().is_empty()
                {
                    content.push_str(node);
                }
            }
        }
        Ok(Description::plain(content))
    }

    fn length(&self) -> Result<i64> {
        json::i64_at(self.embed()?, FIELDS.duration)
    }

    /// Watch pages show "<n> Views" in one of the heading info spans
    ///
    /// # Errors
    /// `StructuralMismatch` if the spans are gone entirely; a page without a
    /// views span reports [`UNKNOWN_COUNT`]
    fn view_count(&self) -> Result<i64> {
        let document = self.document()?;
        let sel = html::selector(SELECTORS.view_count)?;
        let spans: Vec<String> = document.select(&sel).map(|el| html::text_of(&el)).collect();
        if spans.is_empty() {
            return Err(ExtractorError::structural(SELECTORS.view_count, "element missing"));
        }
        match spans.iter().find(|span| span.contains("Views")) {
            Some(views) => text::parse_count(views).ok_or_else(|| {
                ExtractorError::structural(SELECTORS.view_count, format!("not a count: {}", views))
            }),
            None => Ok(UNKNOWN_COUNT),
        }
    }

    fn uploader_name(&self) -> Result<String> {
        Ok(json::str_at(self.embed()?, FIELDS.author_name)?.to_string())
    }

    fn uploader_url(&self) -> Result<String> {
        Ok(json::str_at(self.embed()?, FIELDS.author_url)?.to_string())
    }

    /// Avatars are CSS backgrounds keyed by a per-user class on the byline icon
    fn uploader_avatar_url(&self) -> Result<Option<String>> {
        let page = self.state.page()?;
        let class = {
            let document = page.document();
            let sel = html::selector(SELECTORS.uploader_link)?;
            let link = document
                .select(&sel)
                .next()
                .ok_or_else(|| {
                    ExtractorError::structural(SELECTORS.uploader_link, "element missing")
                })?;
            html::child_attr(&link, "i", "class").and_then(|classes| {
                classes
                    .split_whitespace()
                    .find(|c| c.starts_with(AVATAR_CLASS_PREFIX))
                    .map(str::to_string)
            })
        };
        let Some(class) = class else {
            return Ok(None);
        };

        let pattern = format!(
            r"\.{}\s*\{{\s*background-image:\s*url\(([^)]+)\)",
            regex::escape(&class)
        );
        let Ok(re) = Regex::new(&pattern) else {
            return Err(ExtractorError::Parsing(format!("Invalid avatar pattern for {}", class)));
        };
        re.captures(&page.html)
            .and_then(|caps| caps.get(1))
            .map(|url| Some(url.as_str().trim_matches(['"', '\'']).to_string()))
            .ok_or_else(|| ExtractorError::structural(class, "no avatar style rule"))
    }

    /// `live` is 1 or 2 while a stream is on air
    fn stream_type(&self) -> Result<StreamType> {
        match json::i64_at(self.embed()?, FIELDS.live)? {
            1 | 2 => Ok(StreamType::LiveStream),
            _ => Ok(StreamType::VideoStream),
        }
    }

    fn video_streams(&self) -> Result<&[VideoStream]> {
        self.ensure_fetched()?;
        if let Some(streams) = self.video_streams.get() {
            return Ok(streams);
        }
        let streams = self.extract_video_streams()?;
        Ok(self.video_streams.get_or_init(|| streams))
    }

    fn hls_url(&self) -> Result<String> {
        let embed = self.embed()?;
        Ok(json::opt_str_at(embed, FIELDS.hls)
            .ok()
            .flatten()
            .unwrap_or_default()
            .to_string())
    }

    fn related_items(&self) -> Result<&[InfoItem]> {
        self.ensure_fetched()?;
        if let Some(items) = self.related_items.get() {
            return Ok(items);
        }
        let items = self.extract_related_items()?;
        Ok(self.related_items.get_or_init(|| items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::StreamInfo;
    use crate::linkhandler::LinkHandlerFactory;
    use crate::services::rumble::RumbleStreamLinkHandlerFactory;
    use crate::testing::FakeDownloader;
    use crate::types::NO_AGE_LIMIT;

    const VIDEO_URL: &str = "https://rumble.com/vdofb7";
    const PLAYER_URL: &str = "https://rumble.com/embedJS/u3/?request=video&ver=2&v=v9ab12";

    const WATCH_PAGE: &str = r#"<html><head>
        <style>.user-image--img--id-5f3a{background-image: url(https://sp.rmbl.ws/z0/avatar.jpg);}</style>
        <script type="application/ld+json">[{"@type":"VideoObject","embedUrl":"https://rumble.com/embed/v9ab12/"}]</script>
        </head><body>
        <a class="media-by--a" href="/c/Pets"><i class="user-image user-image--img user-image--img--id-5f3a"></i></a>
        <span class="media-heading-info">Published Feb 8, 2021</span>
        <span class="media-heading-info">2,043 Views</span>
        <p class="media-description">Pony &amp; car <a href="/x">link</a> ride</p>
        <ul class="mediaList-list">
            <li class="mediaList-item">
                <a class="mediaList-link" href="/v1b00j9-other.html">
                    <img class="mediaList-image" src="https://sp.rmbl.ws/thumb.jpg">
                    <h3 class="mediaList-heading">Other &amp; video</h3>
                    <h4 class="mediaList-by-heading">Pets</h4>
                    <small class="mediaList-duration">4:20</small>
                    <small class="mediaList-plays">1,000 plays</small>
                </a>
            </li>
        </ul>
        </body></html>"#;

    const PLAYER_JSON: &str = r#"{
        "title": "1 Year Old Pulls Pony &amp; Car",
        "author": { "name": "Pets", "url": "https://rumble.com/c/Pets" },
        "i": "https://sp.rmbl.ws/cover.jpg",
        "pubDate": "2021-02-08T19:37:25+00:00",
        "duration": 35,
        "live": 0,
        "ua": {
            "mp4": {
                "720": { "url": "https://rumble.com/720.mp4", "meta": { "h": 720 } },
                "1080": { "url": "https://rumble.com/1080.mp4", "meta": { "h": 1080 } },
                "240": { "url": "https://rumble.com/240.mp4", "meta": { "h": 240 } }
            },
            "webm": {
                "480": { "url": "https://rumble.com/480.webm" }
            },
            "timeline": {
                "180": { "url": "https://rumble.com/timeline.mp4" }
            },
            "hls": {
                "auto": { "url": "https://rumble.com/live.m3u8" }
            }
        }
    }"#;

    fn downloader(page: &str, player: &str) -> Arc<FakeDownloader> {
        Arc::new(
            FakeDownloader::new()
                .with_page(VIDEO_URL, page)
                .with_page(PLAYER_URL, player),
        )
    }

    fn extractor(downloader: Arc<FakeDownloader>) -> RumbleStreamExtractor {
        let link = RumbleStreamLinkHandlerFactory
            .from_url("https://rumble.com/vdofb7-1-year-old-pulls-pony-behind-electric-car.html")
            .unwrap();
        RumbleStreamExtractor::new(link, downloader)
    }

    async fn fetched(page: &str, player: &str) -> RumbleStreamExtractor {
        let mut video = extractor(downloader(page, player));
        video.fetch_page().await.unwrap();
        video
    }

    #[tokio::test]
    async fn test_video_fields() {
        let video = fetched(WATCH_PAGE, PLAYER_JSON).await;
        assert_eq!(video.id(), "vdofb7");
        assert_eq!(video.url(), VIDEO_URL);
        assert_eq!(video.name().unwrap(), "1 Year Old Pulls Pony & Car");
        assert_eq!(video.uploader_name().unwrap(), "Pets");
        assert_eq!(video.uploader_url().unwrap(), "https://rumble.com/c/Pets");
        assert_eq!(video.length().unwrap(), 35);
        assert_eq!(video.view_count().unwrap(), 2043);
        assert_eq!(video.like_count().unwrap(), UNKNOWN_COUNT);
        assert_eq!(video.dislike_count().unwrap(), UNKNOWN_COUNT);
        assert_eq!(video.age_limit().unwrap(), NO_AGE_LIMIT);
        assert_eq!(video.stream_type().unwrap(), StreamType::VideoStream);
        assert_eq!(video.thumbnail_url().unwrap().as_deref(), Some("https://sp.rmbl.ws/cover.jpg"));
        assert_eq!(video.description().unwrap().content, "Pony & car  ride");
        assert_eq!(video.hls_url().unwrap(), "https://rumble.com/live.m3u8");
        assert_eq!(
            video.uploader_avatar_url().unwrap().as_deref(),
            Some("https://sp.rmbl.ws/z0/avatar.jpg")
        );
        let date = video.upload_date().unwrap().unwrap();
        assert_eq!(date.to_rfc3339(), "2021-02-08T19:37:25+00:00");
    }

    #[tokio::test]
    async fn test_video_streams_sorted_and_cached() {
        let video = fetched(WATCH_PAGE, PLAYER_JSON).await;
        let streams = video.video_streams().unwrap();
        let labels: Vec<(&str, MediaFormat)> = streams
            .iter()
            .map(|s| (s.resolution.as_str(), s.format))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("240p", MediaFormat::Mpeg4),
                ("720p", MediaFormat::Mpeg4),
                ("1080p", MediaFormat::Mpeg4),
                ("480p", MediaFormat::WebM),
            ]
        );
        assert!(streams.iter().all(|s| s.delivery == DeliveryMethod::ProgressiveHttp));
        assert!(std::ptr::eq(streams, video.video_streams().unwrap()));
        assert!(video.audio_streams().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_live_stream_uses_hls() {
        let player = PLAYER_JSON.replace("\"live\": 0", "\"live\": 2");
        let video = fetched(WATCH_PAGE, &player).await;
        assert_eq!(video.stream_type().unwrap(), StreamType::LiveStream);
        let streams = video.video_streams().unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].delivery, DeliveryMethod::Hls);
        assert_eq!(streams[0].url, "https://rumble.com/live.m3u8");
        assert_eq!(streams[0].resolution, "");
    }

    #[tokio::test]
    async fn test_related_items() {
        let video = fetched(WATCH_PAGE, PLAYER_JSON).await;
        let related = video.related_items().unwrap();
        assert_eq!(related.len(), 1);
        let InfoItem::Stream(item) = &related[0] else {
            panic!("expected a stream item");
        };
        assert_eq!(item.name, "Other & video");
        assert_eq!(item.url, "https://rumble.com/v1b00j9-other.html");
        assert_eq!(item.duration, 260);
        assert_eq!(item.view_count, 1000);
        assert_eq!(item.uploader_name, "Pets");
    }

    #[tokio::test]
    async fn test_second_fetch_reuses_page() {
        let downloader = downloader(WATCH_PAGE, PLAYER_JSON);
        let mut video = extractor(Arc::clone(&downloader));
        video.fetch_page().await.unwrap();
        let requests = downloader.calls();
        assert_eq!(requests, 2);

        video.fetch_page().await.unwrap();
        assert_eq!(downloader.calls(), requests);
        assert_eq!(video.status(), FetchStatus::Fetched);
        assert_eq!(video.name().unwrap(), "1 Year Old Pulls Pony & Car");
    }

    #[tokio::test]
    async fn test_accessors_before_fetch() {
        let video = extractor(downloader(WATCH_PAGE, PLAYER_JSON));
        assert_eq!(video.status(), FetchStatus::Created);
        assert!(matches!(video.name(), Err(ExtractorError::IllegalLifecycle(_))));
        assert!(matches!(video.view_count(), Err(ExtractorError::IllegalLifecycle(_))));
        assert!(matches!(video.dislike_count(), Err(ExtractorError::IllegalLifecycle(_))));
        assert!(matches!(video.video_streams(), Err(ExtractorError::IllegalLifecycle(_))));
        assert!(matches!(
            StreamInfo::from_extractor(&video),
            Err(ExtractorError::IllegalLifecycle(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_author_fails_only_uploader_fields() {
        let player = r#"{"title":"Untitled","duration":12,"live":0,"ua":{}}"#;
        let video = fetched(WATCH_PAGE, player).await;

        assert!(video.uploader_name().unwrap_err().is_structural());
        assert!(video.uploader_url().unwrap_err().is_structural());
        assert_eq!(video.name().unwrap(), "Untitled");
        assert_eq!(video.length().unwrap(), 12);
        assert_eq!(video.thumbnail_url().unwrap(), None);
    }

    #[tokio::test]
    async fn test_view_count_variants() {
        let no_views = WATCH_PAGE.replace("2,043 Views", "Streamed live");
        let video = fetched(&no_views, PLAYER_JSON).await;
        assert_eq!(video.view_count().unwrap(), UNKNOWN_COUNT);

        let no_spans = WATCH_PAGE.replace("media-heading-info", "media-heading-other");
        let video = fetched(&no_spans, PLAYER_JSON).await;
        assert!(video.view_count().unwrap_err().is_structural());
    }

    #[tokio::test]
    async fn test_challenge_page_blocks_fetch() {
        let downloader = Arc::new(FakeDownloader::new().with_status(
            VIDEO_URL,
            403,
            "<html><title>Just a moment...</title><div id=\"cf-chl-widget\"></div></html>",
        ));
        let mut video = extractor(Arc::clone(&downloader));

        let error = video.fetch_page().await.unwrap_err();
        assert!(error.is_blocked());
        assert_eq!(video.status(), FetchStatus::FetchFailed);

        let replay = video.fetch_page().await.unwrap_err();
        assert!(replay.is_blocked());
        assert_eq!(downloader.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_ld_json_is_structural() {
        let page = WATCH_PAGE.replace("application/ld+json", "text/plain");
        let mut video = extractor(downloader(&page, PLAYER_JSON));
        let error = video.fetch_page().await.unwrap_err();
        assert!(matches!(error, ExtractorError::Extraction(_)));
        assert!(error.is_structural());
    }

    #[tokio::test]
    async fn test_stream_info_keeps_working_fields() {
        let player = r#"{"title":"Untitled","duration":12,"live":0,"ua":{}}"#;
        let video = fetched(WATCH_PAGE, player).await;
        let info = StreamInfo::from_extractor(&video).unwrap();

        assert_eq!(info.name, "Untitled");
        assert_eq!(info.length, 12);
        assert_eq!(info.view_count, 2043);
        assert_eq!(info.stream_type, Some(StreamType::VideoStream));
        let failed: Vec<&str> = info.errors.iter().map(|e| e.field).collect();
        assert_eq!(failed, vec!["uploader_name", "uploader_url"]);
        assert!(info.video_streams.is_empty());
    }
}
