//! Rumble link handlers

use regex::Regex;

use crate::error::{ExtractorError, Result};
use crate::filter::{FilterItem, SearchFilters};
use crate::linkhandler::{LinkHandlerFactory, Page, SearchQueryHandlerFactory};
use crate::url::{decode_query, encode_query, query_param};

use super::{BASE_URL, filters};

/// Watch page path: `/v<id>`, optionally followed by `-<slug>` and `.html`
///
/// The id carries at least one digit, which keeps `/videos` and friends out.
const VIDEO_PATH_PATTERN: &str = r"^/(v[0-9a-z]*[0-9][0-9a-z]*)(?:-[^/]*)?(?:\.html)?/?$";

/// Resolves `https://rumble.com/v<id>-<slug>.html` links
#[derive(Debug, Clone, Copy, Default)]
pub struct RumbleStreamLinkHandlerFactory;

impl LinkHandlerFactory for RumbleStreamLinkHandlerFactory {
    fn id(&self, url: &str) -> Result<String> {
        let unsupported = || ExtractorError::UnsupportedUrl(url.to_string());
        let parsed = reqwest::Url::parse(url.trim()).map_err(|_| unsupported())?;
        let host = parsed.host_str().map(str::to_lowercase).unwrap_or_default();
        if !matches!(parsed.scheme(), "http" | "https")
            || !matches!(host.as_str(), "rumble.com" | "www.rumble.com")
        {
            return Err(unsupported());
        }

        let Ok(re) = Regex::new(VIDEO_PATH_PATTERN) else {
            return Err(ExtractorError::Parsing("Invalid video path pattern".to_string()));
        };
        re.captures(parsed.path())
            .and_then(|caps| caps.get(1))
            .map(|id| id.as_str().to_string())
            .ok_or_else(|| {
                ExtractorError::structural("url", format!("no video id in {}", url))
            })
    }

    fn url(&self, id: &str) -> String {
        format!("{}/{}", BASE_URL, id)
    }
}

/// Builds `https://rumble.com/search/<kind>?q=...` URLs
#[derive(Debug, Clone)]
pub struct RumbleSearchQueryHandlerFactory {
    filters: SearchFilters,
}

impl RumbleSearchQueryHandlerFactory {
    pub fn new() -> Result<Self> {
        Ok(Self {
            filters: filters::build()?,
        })
    }
}

impl SearchQueryHandlerFactory for RumbleSearchQueryHandlerFactory {
    fn search_filters(&self) -> &SearchFilters {
        &self.filters
    }

    /// Content filter goes into the path, sort filters into the query
    fn search_url(
        &self,
        query: &str,
        content_filters: &[FilterItem],
        sort_filters: &[FilterItem],
        page: Option<Page>,
    ) -> Result<String> {
        let kind = self.filters.evaluate_content_filters(content_filters)?;
        let sort = self.filters.evaluate_sort_filters(content_filters, sort_filters)?;
        let mut url = format!("{}/search/{}?q={}{}", BASE_URL, kind, encode_query(query), sort);
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
