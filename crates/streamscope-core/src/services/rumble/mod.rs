//! Rumble
//!
//! The watch page only carries an `ld+json` block pointing at the embed
//! player; stream metadata comes from the player's JSON endpoint. Counters,
//! the description and related videos are scraped from the watch page HTML.

mod filters;
mod link;
mod search;
mod stream;

use std::sync::Arc;

use crate::client::Downloader;
use crate::error::Result;
use crate::extractor::{SearchExtractor, StreamExtractor};
use crate::linkhandler::{
    LinkHandler, LinkHandlerFactory, SearchQueryHandler, SearchQueryHandlerFactory,
};
use crate::service::{MediaCapability, ServiceInfo, StreamingService};

pub use filters::{
    ANY_DATE, ANY_DURATION, CHANNELS, LONG, NEWEST, RELEVANCE, SHORT, THIS_MONTH, THIS_WEEK,
    THIS_YEAR, TODAY, VIDEOS, VIEWS,
};
pub use link::{RumbleSearchQueryHandlerFactory, RumbleStreamLinkHandlerFactory};
pub use search::RumbleSearchExtractor;
pub use stream::RumbleStreamExtractor;

pub const RUMBLE_ID: u32 = 2;

const BASE_URL: &str = "https://rumble.com";

pub struct RumbleService {
    info: ServiceInfo,
    links: RumbleStreamLinkHandlerFactory,
    search: RumbleSearchQueryHandlerFactory,
}

impl RumbleService {
    pub fn new() -> Result<Self> {
        Ok(Self {
            info: ServiceInfo {
                id: RUMBLE_ID,
                name: "Rumble",
                base_url: BASE_URL,
                capabilities: vec![MediaCapability::Video, MediaCapability::Live],
            },
            links: RumbleStreamLinkHandlerFactory,
            search: RumbleSearchQueryHandlerFactory::new()?,
        })
    }
}

impl StreamingService for RumbleService {
    fn info(&self) -> &ServiceInfo {
        &self.info
    }

    fn stream_link_handler(&self) -> &dyn LinkHandlerFactory {
        &self.links
    }

    fn search_query_handler(&self) -> &dyn SearchQueryHandlerFactory {
        &self.search
    }

    fn stream_extractor(
        &self,
        link: LinkHandler,
        downloader: Arc<dyn Downloader>,
    ) -> Box<dyn StreamExtractor> {
        Box::new(RumbleStreamExtractor::new(link, downloader))
    }

    fn search_extractor(
        &self,
        query: SearchQueryHandler,
        downloader: Arc<dyn Downloader>,
    ) -> Box<dyn SearchExtractor> {
        Box::new(RumbleSearchExtractor::new(query, downloader))
    }
}
