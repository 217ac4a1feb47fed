//! Link handlers: URL ⇄ canonical id resolution
//!
//! A [`LinkHandlerFactory`] knows the URL shapes of one service. It routes
//! URLs (`accepts_url`), extracts the canonical id, and regenerates an
//! equivalent URL from that id without touching the network.

pub mod list;
pub mod search;

use serde::{Deserialize, Serialize};

use crate::error::{ExtractorError, Result};

pub use list::{ListLinkHandler, Page};
pub use search::{SearchQueryHandler, SearchQueryHandlerFactory};

/// Resolved link to one resource of one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkHandler {
    /// URL as the caller passed it
    pub original_url: String,
    /// Normalized URL regenerated from the id
    pub url: String,
    /// Canonical identifier, stable across calls
    pub id: String,
}

impl LinkHandler {
    pub fn new(
        original_url: impl Into<String>,
        url: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            original_url: original_url.into(),
            url: url.into(),
            id: id.into(),
        }
    }
}

/// Per-service URL resolver
pub trait LinkHandlerFactory: Send + Sync {
    /// Extracts the canonical id from a URL
    ///
    /// # Errors
    /// - `UnsupportedUrl` if the URL does not belong to this service
    /// - `StructuralMismatch` if it does but no id can be located in it
    fn id(&self, url: &str) -> Result<String>;

    /// Builds the canonical URL for an id; pure, no network access
    fn url(&self, id: &str) -> String;

    /// True if `url` is a resource link of this service
    ///
    /// Never panics; malformed input yields false.
    fn accepts_url(&self, url: &str) -> bool {
        self.id(url).is_ok()
    }

    /// Resolves a URL into a [`LinkHandler`]
    fn from_url(&self, url: &str) -> Result<LinkHandler> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ExtractorError::UnsupportedUrl("URL cannot be empty".to_string()));
        }
        let id = self.id(trimmed)?;
        Ok(LinkHandler::new(trimmed, self.url(&id), id))
    }

    /// Builds a [`LinkHandler`] for a known id
    fn from_id(&self, id: &str) -> LinkHandler {
        let url = self.url(id);
        LinkHandler::new(url.clone(), url, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `https://x.test/item/<id>` only
    struct ItemLinks;

    impl LinkHandlerFactory for ItemLinks {
        fn id(&self, url: &str) -> Result<String> {
            let path = url
                .strip_prefix("https://x.test/")
                .ok_or_else(|| ExtractorError::UnsupportedUrl(url.to_string()))?;
            path.strip_prefix("item/")
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ExtractorError::structural("item id", "missing in path"))
        }

        fn url(&self, id: &str) -> String {
            format!("https://x.test/item/{}", id)
        }
    }

    #[test]
    fn test_from_url_keeps_original() {
        let handler = ItemLinks.from_url("  https://x.test/item/42 ").unwrap();
        assert_eq!(handler.original_url, "https://x.test/item/42");
        assert_eq!(handler.url, "https://x.test/item/42");
        assert_eq!(handler.id, "42");
    }

    #[test]
    fn test_wrong_service_vs_broken_input() {
        assert!(matches!(
            ItemLinks.id("https://other.test/item/1"),
            Err(ExtractorError::UnsupportedUrl(_))
        ));
        assert!(ItemLinks.id("https://x.test/about").unwrap_err().is_structural());
        assert!(!ItemLinks.accepts_url("https://x.test/about"));
        assert!(ItemLinks.accepts_url("https://x.test/item/1"));
    }

    #[test]
    fn test_empty_url() {
        assert!(matches!(
            ItemLinks.from_url("   "),
            Err(ExtractorError::UnsupportedUrl(_))
        ));
    }

    #[test]
    fn test_from_id() {
        let handler = ItemLinks.from_id("7");
        assert_eq!(handler.url, "https://x.test/item/7");
        assert_eq!(handler.original_url, handler.url);
    }
}
