//! Bandcamp link handlers
//!
//! Tracks live on the artist's subdomain (`<artist>.bandcamp.com/track/<slug>`),
//! so the canonical id is the normalized track URL itself.

use crate::error::{ExtractorError, Result};
use crate::filter::{FilterItem, SearchFilters};
use crate::linkhandler::{LinkHandlerFactory, Page, SearchQueryHandlerFactory};
use crate::url::{decode_query, encode_query, query_param};

use super::{BASE_URL, filters};

/// Resolves `https://<artist>.bandcamp.com/track/<slug>` links
#[derive(Debug, Clone, Copy, Default)]
pub struct BandcampStreamLinkHandlerFactory;

impl LinkHandlerFactory for BandcampStreamLinkHandlerFactory {
    fn id(&self, url: &str) -> Result<String> {
        let unsupported = || ExtractorError::UnsupportedUrl(url.to_string());
        let parsed = reqwest::Url::parse(url.trim()).map_err(|_| unsupported())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(unsupported());
        }
        let host = parsed
            .host_str()
            .map(str::to_lowercase)
            .filter(|host| host.ends_with(".bandcamp.com"))
            .ok_or_else(unsupported)?;

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            ["track", slug] => Ok(format!("https://{}/track/{}", host, slug)),
            _ => Err(ExtractorError::structural(
                "url",
                format!("not a track link: {}", url),
            )),
        }
    }

    fn url(&self, id: &str) -> String {
        id.to_string()
    }
}

/// Builds `https://bandcamp.com/search?q=...` URLs
#[derive(Debug, Clone)]
pub struct BandcampSearchQueryHandlerFactory {
    filters: SearchFilters,
}

impl BandcampSearchQueryHandlerFactory {
    pub fn new() -> Result<Self> {
        Ok(Self {
            filters: filters::build()?,
        })
    }
}

impl SearchQueryHandlerFactory for BandcampSearchQueryHandlerFactory {
    fn search_filters(&self) -> &SearchFilters {
        &self.filters
    }

    fn search_url(
        &self,
        query: &str,
        content_filters: &[FilterItem],
        sort_filters: &[FilterItem],
        page: Option<Page>,
    ) -> Result<String> {
        let fragment = self.filters.evaluate_filters(content_filters, sort_filters)?;
        let mut url = format!("{}/search?q={}{}", BASE_URL, encode_query(query), fragment);
        if let Some(page) = page {
            url.push_str(&format!("&page={}", page.number));
        }
        Ok(url)
    }

    fn search_string(&self, url: &str) -> String {
        query_param(url, "q")
            .and_then(decode_query)
            .unwrap_or_default()
    }
}
