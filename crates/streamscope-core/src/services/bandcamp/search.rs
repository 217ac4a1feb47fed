//! Bandcamp search results

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use scraper::{ElementRef, Html};

use crate::client::Downloader;
use crate::error::Result;
use crate::extractor::{Extractor, FetchStatus, PageState, SearchExtractor};
use crate::linkhandler::{LinkHandler, SearchQueryHandler};
use crate::parser::{html, text};
use crate::types::{
    ChannelInfoItem, InfoItem, PlaylistInfoItem, StreamInfoItem, StreamType, UNKNOWN_COUNT,
};
use crate::url::strip_query;

use super::BANDCAMP_ID;

const RESULT_SELECTOR: &str = "li.searchresult";
const NEXT_PAGE_SELECTOR: &str = "a.next";

pub struct BandcampSearchExtractor {
    query: SearchQueryHandler,
    downloader: Arc<dyn Downloader>,
    state: PageState<String>,
    items: OnceLock<Vec<InfoItem>>,
}

impl BandcampSearchExtractor {
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
        Ok(document.select(&sel).filter_map(|el| parse_result(&el)).collect())
    }
}

/// Parses one `li.searchresult`; fans and unknown kinds are skipped
fn parse_result(element: &ElementRef) -> Option<InfoItem> {
    let kind = html::child_text(element, ".itemtype")?.to_uppercase();
    let name = html::child_text(element, ".heading a")?;
    let href = html::child_attr(element, ".heading a", "href")?;
    let url = strip_query(&href).to_string();
    let thumbnail_url = html::child_attr(element, ".art img", "src");
    let subhead = html::child_text(element, ".subhead").unwrap_or_default();

    match kind.as_str() {
        "TRACK" => Some(InfoItem::Stream(StreamInfoItem {
            name,
            url,
            thumbnail_url,
            uploader_name: artist_from_subhead(&subhead),
            uploader_url: None,
            duration: UNKNOWN_COUNT,
            view_count: UNKNOWN_COUNT,
            textual_upload_date: html::child_text(element, ".released")
                .map(|r| r.trim_start_matches("released").trim().to_string()),
            stream_type: StreamType::AudioStream,
        })),
        "ALBUM" => Some(InfoItem::Playlist(PlaylistInfoItem {
            name,
            url,
            thumbnail_url,
            uploader_name: artist_from_subhead(&subhead),
            stream_count: html::child_text(element, ".length")
                .and_then(|length| {
                    length
                        .split_whitespace()
                        .next()
                        .and_then(text::parse_count)
                })
                .unwrap_or(UNKNOWN_COUNT),
        })),
        "ARTIST" | "LABEL" => Some(InfoItem::Channel(ChannelInfoItem {
            name,
            url,
            thumbnail_url,
            description: html::child_text(element, ".genre")
                .map(|g| g.trim_start_matches("genre:").trim().to_string())
                .unwrap_or_default(),
            subscriber_count: UNKNOWN_COUNT,
        })),
        _ => None,
    }
}

/// "from Album by Artist" / "by Artist" → "Artist"
fn artist_from_subhead(subhead: &str) -> String {
    let subhead = subhead.trim();
    let artist = match subhead.strip_prefix("by ") {
        Some(artist) => Some(artist),
        None => subhead
            .strip_prefix("from ")
            .and_then(|rest| rest.split_once(" by "))
            .map(|(_, artist)| artist),
    };
    artist.map(|a| a.trim().to_string()).unwrap_or_default()
}

async fn fetch_results(downloader: Arc<dyn Downloader>, url: String) -> Result<String> {
    Ok(downloader.get(&url, &[]).await?.body)
}

#[async_trait]
impl Extractor for BandcampSearchExtractor {
    fn service_id(&self) -> u32 {
        BANDCAMP_ID
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

impl SearchExtractor for BandcampSearchExtractor {
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
