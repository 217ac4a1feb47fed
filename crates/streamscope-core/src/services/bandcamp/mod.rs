//! Bandcamp
//!
//! Track pages embed everything we need as JSON in the `data-tralbum`
//! attribute, so a single request per track is enough. Search is plain HTML.

mod filters;
mod link;
mod search;
mod stream;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::client::Downloader;
use crate::error::{ExtractorError, Result};
use crate::extractor::{SearchExtractor, StreamExtractor};
use crate::linkhandler::{
    LinkHandler, LinkHandlerFactory, SearchQueryHandler, SearchQueryHandlerFactory,
};
use crate::service::{MediaCapability, ServiceInfo, StreamingService};

pub use filters::{ALBUMS, ALL, ARTISTS, TRACKS};
pub use link::{BandcampSearchQueryHandlerFactory, BandcampStreamLinkHandlerFactory};
pub use search::BandcampSearchExtractor;
pub use stream::BandcampStreamExtractor;

pub const BANDCAMP_ID: u32 = 1;

const BASE_URL: &str = "https://bandcamp.com";

/// Format of `publish_date` in the tralbum JSON ("27 Jul 2019 00:00:00 GMT")
const DATE_FORMAT: &str = "%d %b %Y %H:%M:%S GMT";

pub struct BandcampService {
    info: ServiceInfo,
    links: BandcampStreamLinkHandlerFactory,
    search: BandcampSearchQueryHandlerFactory,
}

impl BandcampService {
    pub fn new() -> Result<Self> {
        Ok(Self {
            info: ServiceInfo {
                id: BANDCAMP_ID,
                name: "Bandcamp",
                base_url: BASE_URL,
                capabilities: vec![MediaCapability::Audio],
            },
            links: BandcampStreamLinkHandlerFactory,
            search: BandcampSearchQueryHandlerFactory::new()?,
        })
    }
}

impl StreamingService for BandcampService {
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
        Box::new(BandcampStreamExtractor::new(link, downloader))
    }

    fn search_extractor(
        &self,
        query: SearchQueryHandler,
        downloader: Arc<dyn Downloader>,
    ) -> Box<dyn SearchExtractor> {
        Box::new(BandcampSearchExtractor::new(query, downloader))
    }
}

/// Cover art URL for an art id; `_10` is the full-size variant
pub fn image_url(art_id: i64) -> String {
    format!("https://f4.bcbits.com/img/a{}_10.jpg", art_id)
}

/// Parses a tralbum date as UTC
///
/// # Errors
/// Returns `StructuralMismatch` if the text doesn't match the site's format
pub fn parse_date(text: &str) -> Result<DateTime<FixedOffset>> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT)
        .map(|date| date.and_utc().fixed_offset())
        .map_err(|e| ExtractorError::structural("publish_date", format!("{}: {}", text, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_image_url() {
        assert_eq!(image_url(1234), "https://f4.bcbits.com/img/a1234_10.jpg");
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("27 Jul 2019 14:05:09 GMT").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2019, 7, 27));
        assert_eq!((date.hour(), date.minute(), date.second()), (14, 5, 9));
        assert_eq!(date.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        let error = parse_date("2019-07-27").unwrap_err();
        assert!(error.is_structural());
    }
}
