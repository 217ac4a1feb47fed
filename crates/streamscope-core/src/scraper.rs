//! High-level API
//!
//! [`StreamScope`] routes URLs and queries to the right service and runs the
//! fetch-then-read cycle for callers that just want the finished records.

use std::sync::Arc;

use tracing::debug;

use crate::client::{ClientConfig, Downloader, HttpDownloader};
use crate::error::Result;
use crate::extractor::{SearchInfo, StreamExtractor, StreamInfo};
use crate::linkhandler::{LinkHandler, Page, SearchQueryHandler};
use crate::service::{ServiceList, StreamingService};

/// Entry point combining the transport with the built-in services
///
/// Cheap to share behind an `Arc`; every call builds its own extractor, so
/// concurrent calls never share page state.
pub struct StreamScope {
    downloader: Arc<dyn Downloader>,
    services: ServiceList,
}

impl StreamScope {
    /// Create a new instance with the default HTTP configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new instance with custom client configuration
    ///
    /// # Arguments
    /// * `config` - Custom client configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_downloader(Arc::new(HttpDownloader::with_config(config)?))
    }

    /// Create a new instance on top of any transport
    pub fn with_downloader(downloader: Arc<dyn Downloader>) -> Result<Self> {
        Ok(Self {
            downloader,
            services: ServiceList::default_services()?,
        })
    }

    pub fn services(&self) -> &ServiceList {
        &self.services
    }

    fn service(&self, service_id: u32) -> Result<&Arc<dyn StreamingService>> {
        self.services.by_id(service_id)
    }

    /// Resolves a stream URL without touching the network
    ///
    /// # Returns
    /// The owning service's id and the resolved link
    ///
    /// # Errors
    /// `UnsupportedUrl` if no service accepts the URL
    pub fn link_handler(&self, url: &str) -> Result<(u32, LinkHandler)> {
        let service = self.services.for_url(url)?;
        let link = service.stream_link_handler().from_url(url)?;
        Ok((service.id(), link))
    }

    /// Unfetched extractor for a stream URL
    pub fn stream_extractor(&self, url: &str) -> Result<Box<dyn StreamExtractor>> {
        let service = self.services.for_url(url)?;
        service.stream_extractor_for_url(url, Arc::clone(&self.downloader))
    }

    /// Fetches a stream and collects everything its page exposes
    ///
    /// # Errors
    /// - `UnsupportedUrl` if no service accepts the URL
    /// - `BlockedByChallenge` / `Extraction` if the fetch fails
    /// - whatever the name accessor fails with
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> streamscope_core::Result<()> {
    /// use streamscope_core::StreamScope;
    /// let scope = StreamScope::new()?;
    /// let info = scope.stream_info("https://rumble.com/vdofb7-pony.html").await?;
    /// println!("{} by {} ({} fields failed)", info.name, info.uploader_name, info.errors.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn stream_info(&self, url: &str) -> Result<StreamInfo> {
        let mut extractor = self.stream_extractor(url)?;
        debug!(service = extractor.service_id(), id = extractor.id(), "loading stream");
        extractor.fetch_page().await?;
        StreamInfo::from_extractor(extractor.as_ref())
    }

    /// Resolves a query against one service's filter registry
    ///
    /// # Arguments
    /// * `service_id` - Service to search
    /// * `query` - Search text
    /// * `content_ids` / `sort_ids` - Selected filter ids, in order
    /// * `page` - Page cursor; `None` for the service's first page
    ///
    /// # Errors
    /// - `UnknownService` for an unregistered service id
    /// - `Parsing` for an empty query
    /// - `UnknownFilter` / `IncompatibleFilter` for an invalid selection
    pub fn search_query(
        &self,
        service_id: u32,
        query: &str,
        content_ids: &[u32],
        sort_ids: &[u32],
        page: Option<Page>,
    ) -> Result<SearchQueryHandler> {
        let factory = self.service(service_id)?.search_query_handler();
        let filters = factory.search_filters();
        let content = filters.resolve(content_ids)?;
        let sort = filters.resolve(sort_ids)?;
        factory.from_query_page(query, &content, &sort, page)
    }

    /// Searches one service and returns the first page of results
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> streamscope_core::Result<()> {
    /// use streamscope_core::StreamScope;
    /// use streamscope_core::services::rumble::{NEWEST, RUMBLE_ID, VIDEOS};
    /// let scope = StreamScope::new()?;
    /// let results = scope.search(RUMBLE_ID, "electric car", &[VIDEOS], &[NEWEST]).await?;
    /// for item in &results.items {
    ///     println!("{}: {}", item.name(), item.url());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search(
        &self,
        service_id: u32,
        query: &str,
        content_ids: &[u32],
        sort_ids: &[u32],
    ) -> Result<SearchInfo> {
        let handler = self.search_query(service_id, query, content_ids, sort_ids, None)?;
        self.search_page(service_id, handler).await
    }

    /// Fetches the results page `handler` points at with a fresh extractor
    pub async fn search_page(
        &self,
        service_id: u32,
        handler: SearchQueryHandler,
    ) -> Result<SearchInfo> {
        let service = self.service(service_id)?;
        debug!(service = service_id, url = handler.url(), "searching");
        let mut extractor = service.search_extractor(handler, Arc::clone(&self.downloader));
        extractor.fetch_page().await?;
        SearchInfo::from_extractor(extractor.as_ref())
    }

    /// Handler for the page after `handler`, same query and filters
    pub fn next_page(
        &self,
        service_id: u32,
        handler: &SearchQueryHandler,
    ) -> Result<SearchQueryHandler> {
        self.service(service_id)?
            .search_query_handler()
            .next_page(handler)
    }
}
