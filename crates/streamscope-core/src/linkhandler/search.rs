//! Search query handlers
//!
//! A search is addressed by its query text plus filter selection. The factory
//! turns that into the service's search URL; the reverse direction
//! ([`SearchQueryHandlerFactory::search_string`]) is best effort.

use serde::Serialize;

use crate::error::{ExtractorError, Result};
use crate::filter::{FilterContainer, FilterId, FilterItem, SearchFilters};
use crate::linkhandler::{LinkHandler, ListLinkHandler, Page};

/// A resolved search: query, selected filters, page and request URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQueryHandler {
    list: ListLinkHandler,
}

impl SearchQueryHandler {
    pub fn new(
        query: &str,
        content_filters: Vec<FilterItem>,
        sort_filters: Vec<FilterItem>,
        page: Option<Page>,
        url: String,
    ) -> Self {
        Self {
            list: ListLinkHandler {
                link: LinkHandler::new(url.clone(), url, query),
                content_filters,
                sort_filters,
                page,
            },
        }
    }

    /// The search text (also the handler's id)
    pub fn query(&self) -> &str {
        self.list.id()
    }

    /// Resolved request URL
    pub fn url(&self) -> &str {
        self.list.url()
    }

    pub fn content_filters(&self) -> &[FilterItem] {
        &self.list.content_filters
    }

    pub fn sort_filters(&self) -> &[FilterItem] {
        &self.list.sort_filters
    }

    pub fn page(&self) -> Option<Page> {
        self.list.page
    }

    pub fn current_page(&self) -> Page {
        self.list.current_page()
    }

    pub fn link_handler(&self) -> &LinkHandler {
        &self.list.link
    }
}

/// Per-service search URL builder
pub trait SearchQueryHandlerFactory: Send + Sync {
    /// The service's filter registry
    fn search_filters(&self) -> &SearchFilters;

    /// Builds the search URL for a query, filter selection and page
    ///
    /// # Errors
    /// `Parsing` if no URL can be built; filter errors from the registry
    fn search_url(
        &self,
        query: &str,
        content_filters: &[FilterItem],
        sort_filters: &[FilterItem],
        page: Option<Page>,
    ) -> Result<String>;

    /// Recovers the query text from a search URL, empty if the service can't
    fn search_string(&self, _url: &str) -> String {
        String::new()
    }

    /// Id of a search URL for list caching: its query text
    fn id(&self, url: &str) -> String {
        self.search_string(url)
    }

    /// Search URLs are never opened directly as content links
    fn accepts_url(&self, _url: &str) -> bool {
        false
    }

    /// Resolves a query with the given filters
    fn from_query(
        &self,
        query: &str,
        content_filters: &[FilterItem],
        sort_filters: &[FilterItem],
    ) -> Result<SearchQueryHandler> {
        self.from_query_page(query, content_filters, sort_filters, None)
    }

    /// Resolves a query with the service's default filters
    fn from_query_default(&self, query: &str) -> Result<SearchQueryHandler> {
        self.from_query_page(query, &[], &[], None)
    }

    /// Resolves a query with filters at a given page
    ///
    /// # Errors
    /// - `Parsing` if the query is empty or whitespace only
    /// - `UnknownFilter` / `IncompatibleFilter` for an invalid selection
    fn from_query_page(
        &self,
        query: &str,
        content_filters: &[FilterItem],
        sort_filters: &[FilterItem],
        page: Option<Page>,
    ) -> Result<SearchQueryHandler> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(ExtractorError::Parsing(
                "Search query cannot be empty".to_string(),
            ));
        }

        let filters = self.search_filters();
        let content = content_filters
            .iter()
            .map(|item| filters.filter_item(item.id).cloned())
            .collect::<Result<Vec<_>>>()?;
        let sort = sort_filters
            .iter()
            .map(|item| filters.filter_item(item.id).cloned())
            .collect::<Result<Vec<_>>>()?;

        let url = self.search_url(trimmed, &content, &sort, page)?;
        Ok(SearchQueryHandler::new(trimmed, content, sort, page, url))
    }

    /// Same search, next page
    fn next_page(&self, handler: &SearchQueryHandler) -> Result<SearchQueryHandler> {
        self.from_query_page(
            handler.query(),
            handler.content_filters(),
            handler.sort_filters(),
            Some(handler.current_page().next()),
        )
    }

    fn content_filters(&self) -> &FilterContainer {
        self.search_filters().content_filters()
    }

    fn sort_filter_variant(&self, content_filter: u32) -> Option<&FilterContainer> {
        self.search_filters()
            .sort_filter_variant(FilterId(content_filter))
    }

    fn filter_item(&self, id: u32) -> Result<&FilterItem> {
        self.search_filters().filter_item(FilterId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterGroup;
    use crate::url::{decode_query, encode_query, query_param};

    struct XSearch {
        filters: SearchFilters,
    }

    impl XSearch {
        fn new() -> Self {
            let filters = SearchFilters::builder()
                .content_group(FilterGroup::exclusive(
                    "type",
                    vec![
                        FilterItem::new(0, "all", None),
                        FilterItem::new(1, "albums", Some("&item_type=a")),
                    ],
                ))
                .build()
                .unwrap();
            Self { filters }
        }
    }

    impl SearchQueryHandlerFactory for XSearch {
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
            let mut url = format!("https://x/search?q={}{}", encode_query(query), fragment);
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

    /// Factory relying on every provided method
    struct Bare(SearchFilters);

    impl SearchQueryHandlerFactory for Bare {
        fn search_filters(&self) -> &SearchFilters {
            &self.0
        }

        fn search_url(
            &self,
            query: &str,
            _: &[FilterItem],
            _: &[FilterItem],
            _: Option<Page>,
        ) -> Result<String> {
            Ok(format!("https://bare/{}", query))
        }
    }

    #[test]
    fn test_from_query_default() {
        let handler = XSearch::new().from_query_default("foo").unwrap();
        assert_eq!(handler.url(), "https://x/search?q=foo");
        assert_eq!(handler.query(), "foo");
        assert!(handler.content_filters().is_empty());
        assert_eq!(handler.page(), None);
    }

    #[test]
    fn test_from_query_with_filter() {
        let factory = XSearch::new();
        let albums = factory.filter_item(1).unwrap().clone();
        let handler = factory.from_query("doctor who", &[albums], &[]).unwrap();
        assert_eq!(handler.url(), "https://x/search?q=doctor%20who&item_type=a");
        assert_eq!(handler.content_filters().len(), 1);
    }

    #[test]
    fn test_from_query_empty() {
        let result = XSearch::new().from_query_default("   ");
        assert!(matches!(result, Err(ExtractorError::Parsing(_))));
    }

    #[test]
    fn test_from_query_unknown_filter() {
        let forged = FilterItem::new(77, "forged", Some("&x"));
        let result = XSearch::new().from_query("foo", &[forged], &[]);
        assert!(matches!(result, Err(ExtractorError::UnknownFilter(77))));
    }

    #[test]
    fn test_next_page() {
        let factory = XSearch::new();
        let first = factory.from_query_default("foo").unwrap();
        let second = factory.next_page(&first).unwrap();
        assert_eq!(second.url(), "https://x/search?q=foo&page=2");
        let third = factory.next_page(&second).unwrap();
        assert_eq!(third.page(), Some(Page { number: 3 }));
    }

    #[test]
    fn test_search_string_round_trip() {
        let factory = XSearch::new();
        let handler = factory.from_query_default("a b&c").unwrap();
        assert_eq!(factory.search_string(handler.url()), "a b&c");
        assert_eq!(factory.id(handler.url()), "a b&c");
    }

    #[test]
    fn test_provided_defaults() {
        let filters = SearchFilters::builder().build().unwrap();
        let bare = Bare(filters);
        assert_eq!(bare.search_string("https://bare/foo"), "");
        assert!(!bare.accepts_url("https://bare/foo"));
        assert!(bare.content_filters().is_empty());
        assert!(bare.sort_filter_variant(0).is_none());
    }
}
