//! Extractor capability traits
//!
//! An extractor is bound to one link and one service. Callers run
//! [`Extractor::fetch_page`] once, then read fields through the accessors.
//! Accessors are independent: each re-reads the cached page, so a field whose
//! markup drifted fails on its own with `StructuralMismatch` while the others
//! keep working.
//!
//! Fields a site legitimately doesn't report return sentinels instead of
//! errors: [`UNKNOWN_COUNT`] for counters, empty strings and slices for text
//! and collections, `None` for optional values.

pub mod info;
pub mod lifecycle;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::error::Result;
use crate::linkhandler::{LinkHandler, SearchQueryHandler};
use crate::types::{
    AudioStream, Description, InfoItem, NO_AGE_LIMIT, StreamType, SubtitlesStream, UNKNOWN_COUNT,
    VideoStream,
};

pub use info::{FieldError, SearchInfo, StreamInfo};
pub use lifecycle::{FetchStatus, PageState, require_fetched};

/// Lifecycle and identity shared by every extractor
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Id of the service this extractor belongs to
    fn service_id(&self) -> u32;

    fn link_handler(&self) -> &LinkHandler;

    fn status(&self) -> FetchStatus;

    /// Fetches and caches the page; runs the transport at most once
    ///
    /// # Errors
    /// - `BlockedByChallenge` when the site served a challenge page
    /// - `Extraction` wrapping any other cause
    async fn fetch_page(&mut self) -> Result<()>;

    /// Fails with `IllegalLifecycle` unless the page was fetched
    fn ensure_fetched(&self) -> Result<()> {
        require_fetched(self.status())
    }

    fn id(&self) -> &str {
        &self.link_handler().id
    }

    fn url(&self) -> &str {
        &self.link_handler().url
    }

    fn original_url(&self) -> &str {
        &self.link_handler().original_url
    }

    /// Display name (title) of the resource
    fn name(&self) -> Result<String>;
}

/// Accessors of a single stream (video, track, live stream)
pub trait StreamExtractor: Extractor {
    /// Upload date as shown by the site
    fn textual_upload_date(&self) -> Result<Option<String>>;

    /// Parsed upload date
    fn upload_date(&self) -> Result<Option<DateTime<FixedOffset>>>;

    fn thumbnail_url(&self) -> Result<Option<String>>;

    fn description(&self) -> Result<Description> {
        self.ensure_fetched()?;
        Ok(Description::empty())
    }

    /// Length in seconds, 0 when unknown (e.g. live streams)
    fn length(&self) -> Result<i64>;

    fn view_count(&self) -> Result<i64> {
        self.ensure_fetched()?;
        Ok(UNKNOWN_COUNT)
    }

    fn like_count(&self) -> Result<i64> {
        self.ensure_fetched()?;
        Ok(UNKNOWN_COUNT)
    }

    fn dislike_count(&self) -> Result<i64> {
        self.ensure_fetched()?;
        Ok(UNKNOWN_COUNT)
    }

    fn uploader_name(&self) -> Result<String>;

    fn uploader_url(&self) -> Result<String>;

    fn uploader_avatar_url(&self) -> Result<Option<String>> {
        self.ensure_fetched()?;
        Ok(None)
    }

    fn stream_type(&self) -> Result<StreamType>;

    fn video_streams(&self) -> Result<&[VideoStream]> {
        self.ensure_fetched()?;
        Ok(&[])
    }

    fn audio_streams(&self) -> Result<&[AudioStream]> {
        self.ensure_fetched()?;
        Ok(&[])
    }

    fn subtitles(&self) -> Result<&[SubtitlesStream]> {
        self.ensure_fetched()?;
        Ok(&[])
    }

    /// HLS master manifest, empty if the site doesn't offer one
    fn hls_url(&self) -> Result<String> {
        self.ensure_fetched()?;
        Ok(String::new())
    }

    fn age_limit(&self) -> Result<u32> {
        self.ensure_fetched()?;
        Ok(NO_AGE_LIMIT)
    }

    fn tags(&self) -> Result<Vec<String>> {
        self.ensure_fetched()?;
        Ok(Vec::new())
    }

    fn related_items(&self) -> Result<&[InfoItem]> {
        self.ensure_fetched()?;
        Ok(&[])
    }
}

/// Accessors of one page of search results
pub trait SearchExtractor: Extractor {
    fn query_handler(&self) -> &SearchQueryHandler;

    fn search_string(&self) -> &str {
        self.query_handler().query()
    }

    /// Results on this page, in site order
    fn items(&self) -> Result<&[InfoItem]>;

    /// True if the site links a further page of results
    fn has_next_page(&self) -> Result<bool>;

    /// "Did you mean" correction, empty if none
    fn suggestion(&self) -> Result<String> {
        self.ensure_fetched()?;
        Ok(String::new())
    }
}
