//! Streamscope Core Library
//!
//! Resolves links, builds filtered searches and extracts stream metadata from
//! media sites behind one async API.
//!
//! # Overview
//!
//! - [`linkhandler`]: turn URLs into canonical ids and back, build search URLs
//! - [`filter`]: per-service registry of content and sort filters
//! - [`extractor`]: fetch-once extractors with independent field accessors
//! - [`service`]: the registry routing a URL to the service that owns it
//! - [`StreamScope`]: high-level API over all of the above
//!
//! # Example
//!
//! ```no_run
//! use streamscope_core::{Result, StreamScope};
//! use streamscope_core::services::bandcamp::{BANDCAMP_ID, TRACKS};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let scope = StreamScope::new()?;
//!
//!     // Search one service
//!     let results = scope.search(BANDCAMP_ID, "daft punk", &[TRACKS], &[]).await?;
//!     for item in &results.items {
//!         println!("{}: {}", item.name(), item.url());
//!     }
//!
//!     // Load a stream; fields that failed are listed instead of aborting
//!     if let Some(item) = results.items.first() {
//!         let info = scope.stream_info(item.url()).await?;
//!         println!("{} ({}s)", info.name, info.length);
//!         for error in &info.errors {
//!             println!("  {} unavailable: {}", error.field, error.message);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Partial failure
//!
//! A failed fetch is final for that extractor instance: later calls replay
//! the same error without another request. Challenge pages surface as
//! [`ExtractorError::BlockedByChallenge`] so callers can back off; other
//! failures as [`ExtractorError::Extraction`]. After a successful fetch each
//! accessor fails on its own, so one drifted field never hides the rest.

pub mod client;
mod error;
pub mod extractor;
pub mod filter;
pub mod linkhandler;
pub mod parser;
mod scraper;
pub mod service;
pub mod services;
mod types;
pub mod url;

#[cfg(test)]
pub(crate) mod testing;

// Re-export client types
pub use client::{ClientConfig, Downloader, HttpDownloader, RateLimiter, Response};

// Re-export error types
pub use error::{ExtractorError, Result};

// Re-export extractor API
pub use extractor::{
    Extractor, FetchStatus, FieldError, SearchExtractor, SearchInfo, StreamExtractor, StreamInfo,
};

// Re-export filter types
pub use filter::{
    FilterContainer, FilterGroup, FilterId, FilterItem, SearchFilters, SortFilterPolicy,
};

// Re-export link handlers
pub use linkhandler::{
    LinkHandler, LinkHandlerFactory, Page, SearchQueryHandler, SearchQueryHandlerFactory,
};

// Re-export main API
pub use scraper::StreamScope;

// Re-export services
pub use service::{LinkType, MediaCapability, ServiceInfo, ServiceList, StreamingService};

// Re-export data types
pub use types::*;
