//! Service registry
//!
//! A [`StreamingService`] bundles everything one site needs: its link
//! handler, its search query handler (with filter registry) and its extractor
//! factories. [`ServiceList`] is the ordered, immutable set of services built
//! once at startup and handed to whoever needs to route URLs.

use std::sync::Arc;

use serde::Serialize;

use crate::client::Downloader;
use crate::error::{ExtractorError, Result};
use crate::extractor::{SearchExtractor, StreamExtractor};
use crate::filter::FilterItem;
use crate::linkhandler::{
    LinkHandler, LinkHandlerFactory, SearchQueryHandler, SearchQueryHandlerFactory,
};
use crate::services::{BandcampService, RumbleService};

/// Kind of media a service serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaCapability {
    Audio,
    Video,
    Live,
}

/// Static description of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub id: u32,
    pub name: &'static str,
    pub base_url: &'static str,
    pub capabilities: Vec<MediaCapability>,
}

/// What a URL points at within a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkType {
    Stream,
    None,
}

/// One supported site
pub trait StreamingService: Send + Sync {
    fn info(&self) -> &ServiceInfo;

    fn stream_link_handler(&self) -> &dyn LinkHandlerFactory;

    fn search_query_handler(&self) -> &dyn SearchQueryHandlerFactory;

    /// New, unfetched extractor for one stream
    fn stream_extractor(
        &self,
        link: LinkHandler,
        downloader: Arc<dyn Downloader>,
    ) -> Box<dyn StreamExtractor>;

    /// New, unfetched extractor for one page of search results
    fn search_extractor(
        &self,
        query: SearchQueryHandler,
        downloader: Arc<dyn Downloader>,
    ) -> Box<dyn SearchExtractor>;

    fn id(&self) -> u32 {
        self.info().id
    }

    fn link_type(&self, url: &str) -> LinkType {
        if self.stream_link_handler().accepts_url(url) {
            LinkType::Stream
        } else {
            LinkType::None
        }
    }

    /// Resolves `url` and binds a stream extractor to it
    fn stream_extractor_for_url(
        &self,
        url: &str,
        downloader: Arc<dyn Downloader>,
    ) -> Result<Box<dyn StreamExtractor>> {
        let link = self.stream_link_handler().from_url(url)?;
        Ok(self.stream_extractor(link, downloader))
    }

    /// Resolves a query and binds a search extractor to it
    fn search_extractor_for_query(
        &self,
        query: &str,
        content_filters: &[FilterItem],
        sort_filters: &[FilterItem],
        downloader: Arc<dyn Downloader>,
    ) -> Result<Box<dyn SearchExtractor>> {
        let handler = self
            .search_query_handler()
            .from_query(query, content_filters, sort_filters)?;
        Ok(self.search_extractor(handler, downloader))
    }
}

/// Ordered, immutable set of services
#[derive(Clone)]
pub struct ServiceList {
    services: Vec<Arc<dyn StreamingService>>,
}

impl ServiceList {
    pub fn new(services: Vec<Arc<dyn StreamingService>>) -> Self {
        Self { services }
    }

    /// Every built-in service, in routing order
    ///
    /// # Errors
    /// Fails only if a built-in filter registry is inconsistent
    pub fn default_services() -> Result<Self> {
        Ok(Self::new(vec![
            Arc::new(BandcampService::new()?),
            Arc::new(RumbleService::new()?),
        ]))
    }

    pub fn all(&self) -> &[Arc<dyn StreamingService>] {
        &self.services
    }

    pub fn by_id(&self, id: u32) -> Result<&Arc<dyn StreamingService>> {
        self.services
            .iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| ExtractorError::UnknownService(id.to_string()))
    }

    /// Case-insensitive lookup by name
    pub fn by_name(&self, name: &str) -> Result<&Arc<dyn StreamingService>> {
        self.services
            .iter()
            .find(|s| s.info().name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ExtractorError::UnknownService(name.to_string()))
    }

    /// First service whose stream links accept `url`
    pub fn for_url(&self, url: &str) -> Result<&Arc<dyn StreamingService>> {
        self.services
            .iter()
            .find(|s| s.link_type(url) != LinkType::None)
            .ok_or_else(|| ExtractorError::UnsupportedUrl(url.to_string()))
    }
}
