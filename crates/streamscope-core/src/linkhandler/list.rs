//! Paginated, filtered list links

use serde::{Deserialize, Serialize};

use crate::filter::FilterItem;
use crate::linkhandler::LinkHandler;

/// Pagination cursor (1-based page number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
}

impl Page {
    pub fn first() -> Self {
        Self { number: 1 }
    }

    pub fn next(self) -> Self {
        Self {
            number: self.number.saturating_add(1),
        }
    }
}

/// Link to a list resource together with its selected filters and page
///
/// `link.url` is the request URL for exactly this combination; the owning
/// factory regenerates it whenever filters or page change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListLinkHandler {
    pub link: LinkHandler,
    pub content_filters: Vec<FilterItem>,
    pub sort_filters: Vec<FilterItem>,
    /// `None` means the service's first page without an explicit cursor
    pub page: Option<Page>,
}

impl ListLinkHandler {
    pub fn id(&self) -> &str {
        &self.link.id
    }

    pub fn url(&self) -> &str {
        &self.link.url
    }

    /// Page this handler points at, treating "no cursor" as the first page
    pub fn current_page(&self) -> Page {
        self.page.unwrap_or_else(Page::first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_next() {
        assert_eq!(Page::first().next(), Page { number: 2 });
        assert_eq!(Page { number: u32::MAX }.next().number, u32::MAX);
    }

    #[test]
    fn test_current_page_defaults_to_first() {
        let handler = ListLinkHandler {
            link: LinkHandler::new("u", "u", "q"),
            content_filters: vec![],
            sort_filters: vec![],
            page: None,
        };
        assert_eq!(handler.current_page(), Page::first());
        assert_eq!(handler.id(), "q");
        assert_eq!(handler.url(), "u");
    }
}
