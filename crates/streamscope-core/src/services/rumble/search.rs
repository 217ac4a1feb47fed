//! Rumble search results

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use scraper::{ElementRef, Html};

use crate::client::Downloader;
use crate::error::Result;
use crate::extractor::{Extractor, FetchStatus, PageState, SearchExtractor};
use crate::linkhandler::{LinkHandler, SearchQueryHandler};
use crate::parser::{html, text};
use crate::types::{ChannelInfoItem, InfoItem, StreamInfoItem, StreamType, UNKNOWN_COUNT};
use crate::url::absolutize;

use super::{BASE_URL, RUMBLE_ID};

/// Video results and channel results use different markup
const RESULT_SELECTOR: &str = "article.video-item, li.channel-item";
const NEXT_PAGE_SELECTOR: &str = "li.paginator--li--next a";

pub struct RumbleSearchExtractor {
    query: SearchQueryHandler,
    downloader: Arc<dyn Downloader>,
    state: PageState<String>,
    items: OnceLock<Vec<InfoItem>>,
}

impl RumbleSearchExtractor {
    pub fn new(query: SearchQueryHandler, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            query,
            downloader,
            state: PageState::new(),
            items: OnceLock::new(),
        }
    }

    fn document(&self) -> Result<Html> {
        Ok(Html::parse_document(self.state.page()?))
    }

    fn extract_items(&self) -> Result<Vec<InfoItem>> {
        let document = self.document()?;
        let sel = html::selector(RESULT_SELECTOR)?;
        Ok(document
            .select(&sel)
            .filter_map(|el| {
                if el.value().classes().any(|class| class == "channel-item") {
                    parse_channel(&el)
                } else {
                    parse_video(&el)
                }
            })
            .collect())
    }
}

fn parse_video(element: &ElementRef) -> Option<InfoItem> {
    let href = html::child_attr(element, "a.video-item--a", "href")?;
    let name = html::child_text(element, "h3.video-item--title")?;
    let live = html::child_text(element, ".video-item--live").is_some();
    Some(InfoItem::Stream(StreamInfoItem {
        name,
        url: absolutize(BASE_URL, &href),
        thumbnail_url: html::child_attr(element, "img.video-item--img", "src"),
        uploader_name: html::child_text(element, ".video-item--by a").unwrap_or_default(),
        uploader_url: html::child_attr(element, ".video-item--by a", "href")
            .map(|href| absolutize(BASE_URL, &href)),
        duration: html::child_attr(element, ".video-item--duration", "data-value")
            .and_then(|d| text::parse_duration(&d))
            .unwrap_or(UNKNOWN_COUNT),
        view_count: html::child_attr(element, ".video-item--views", "data-value")
            .and_then(|v| text::parse_count(&v))
            .unwrap_or(UNKNOWN_COUNT),
        textual_upload_date: html::child_attr(element, "time.video-item--meta", "datetime"),
        stream_type: if live {
            StreamType::LiveStream
        } else {
            StreamType::VideoStream
        },
    }))
}

fn parse_channel(element: &ElementRef) -> Option<InfoItem> {
    let href = html::child_attr(element, "a.channel-item--a", "href")?;
    let name = html::child_text(element, "h3.channel-item--title")?;
    Some(InfoItem::Channel(ChannelInfoItem {
        name,
        url: absolutize(BASE_URL, &href),
        thumbnail_url: html::child_attr(element, "img.channel-item--img", "src"),
        description: String::new(),
        subscriber_count: html::child_text(element, ".channel-item--subscribers")
            .and_then(|s| text::parse_count(&s))
            .unwrap_or(UNKNOWN_COUNT),
    }))
}

async fn fetch_results(downloader: Arc<dyn Downloader>, url: String) -> Result<String> {
    Ok(downloader.get(&url, &[]).await?.body)
}

#[async_trait]
impl Extractor for RumbleSearchExtractor {
    fn service_id(&self) -> u32 {
        RUMBLE_ID
    }

    fn link_handler(&self) -> &LinkHandler {
        self.query.link_handler()
    }

    fn status(&self) -> FetchStatus {
        self.state.status()
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let url = self.query.url().to_string();
        let fetch = fetch_results(Arc::clone(&self.downloader), url.clone());
        self.state.fetch_with(&url, fetch).await
    }

    fn name(&self) -> Result<String> {
        self.ensure_fetched()?;
        Ok(self.query.query().to_string())
    }
}

impl SearchExtractor for RumbleSearchExtractor {
    fn query_handler(&self) -> &SearchQueryHandler {
        &self.query
    }

    fn items(&self) -> Result<&[InfoItem]> {
        self.ensure_fetched()?;
        if let Some(items) = self.items.get() {
            return Ok(items);
        }
        let items = self.extract_items()?;
        Ok(self.items.get_or_init(|| items))
    }

    fn has_next_page(&self) -> Result<bool> {
        let document = self.document()?;
        Ok(html::first_attr(&document, NEXT_PAGE_SELECTOR, "href")?.is_some())
    }
}
