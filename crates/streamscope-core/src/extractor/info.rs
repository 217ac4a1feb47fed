//! Aggregated records built from a fetched extractor
//!
//! [`StreamInfo`] reads every accessor once. Only the name is required; any
//! other field that fails is logged, recorded in `errors`, and left at its
//! sentinel, so callers get a partial record instead of nothing.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::extractor::{SearchExtractor, StreamExtractor};
use crate::linkhandler::Page;
use crate::types::{
    AudioStream, Description, InfoItem, NO_AGE_LIMIT, StreamType, SubtitlesStream, UNKNOWN_COUNT,
    VideoStream,
};

/// A field that could not be extracted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

struct Collector {
    url: String,
    errors: Vec<FieldError>,
}

impl Collector {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            errors: Vec::new(),
        }
    }

    /// Unwraps a field result, falling back to `default` and recording the error
    fn field<T>(&mut self, field: &'static str, result: Result<T>, default: T) -> T {
        match result {
            Ok(value) => value,
            Err(error) => {
                warn!(url = %self.url, field, error = %error, "field extraction failed");
                self.errors.push(FieldError {
                    field,
                    message: error.to_string(),
                });
                default
            }
        }
    }
}

/// Everything known about one stream
#[derive(Debug, Clone, Serialize)]
pub struct StreamInfo {
    pub service_id: u32,
    pub id: String,
    pub url: String,
    pub original_url: String,
    pub name: String,
    pub stream_type: Option<StreamType>,
    pub textual_upload_date: Option<String>,
    pub upload_date: Option<DateTime<FixedOffset>>,
    pub thumbnail_url: Option<String>,
    pub description: Description,
    pub length: i64,
    pub view_count: i64,
    pub like_count: i64,
    pub dislike_count: i64,
    pub uploader_name: String,
    pub uploader_url: String,
    pub uploader_avatar_url: Option<String>,
    pub age_limit: u32,
    pub hls_url: String,
    pub video_streams: Vec<VideoStream>,
    pub audio_streams: Vec<AudioStream>,
    pub subtitles: Vec<SubtitlesStream>,
    pub tags: Vec<String>,
    pub related_items: Vec<InfoItem>,
    /// Fields that failed, in extraction order
    pub errors: Vec<FieldError>,
}

impl StreamInfo {
    /// Builds the record from an extractor whose page is fetched
    ///
    /// # Errors
    /// - `IllegalLifecycle` if the page wasn't fetched
    /// - whatever `name()` fails with; a stream without a name is useless
    pub fn from_extractor(extractor: &dyn StreamExtractor) -> Result<Self> {
        extractor.ensure_fetched()?;
        let name = extractor.name()?;
        let mut c = Collector::new(extractor.url());

        let stream_type = c.field("stream_type", extractor.stream_type().map(Some), None);
        let textual_upload_date =
            c.field("textual_upload_date", extractor.textual_upload_date(), None);
        let upload_date = c.field("upload_date", extractor.upload_date(), None);
        let thumbnail_url = c.field("thumbnail_url", extractor.thumbnail_url(), None);
        let description = c.field("description", extractor.description(), Description::empty());
        let length = c.field("length", extractor.length(), 0);
        let view_count = c.field("view_count", extractor.view_count(), UNKNOWN_COUNT);
        let like_count = c.field("like_count", extractor.like_count(), UNKNOWN_COUNT);
        let dislike_count = c.field("dislike_count", extractor.dislike_count(), UNKNOWN_COUNT);
        let uploader_name = c.field("uploader_name", extractor.uploader_name(), String::new());
        let uploader_url = c.field("uploader_url", extractor.uploader_url(), String::new());
        let uploader_avatar_url =
            c.field("uploader_avatar_url", extractor.uploader_avatar_url(), None);
        let age_limit = c.field("age_limit", extractor.age_limit(), NO_AGE_LIMIT);
        let hls_url = c.field("hls_url", extractor.hls_url(), String::new());
        let video_streams = c.field(
            "video_streams",
            extractor.video_streams().map(<[_]>::to_vec),
            Vec::new(),
        );
        let audio_streams = c.field(
            "audio_streams",
            extractor.audio_streams().map(<[_]>::to_vec),
            Vec::new(),
        );
        let subtitles = c.field(
            "subtitles",
            extractor.subtitles().map(<[_]>::to_vec),
            Vec::new(),
        );
        let tags = c.field("tags", extractor.tags(), Vec::new());
        let related_items = c.field(
            "related_items",
            extractor.related_items().map(<[_]>::to_vec),
            Vec::new(),
        );

        Ok(Self {
            service_id: extractor.service_id(),
            id: extractor.id().to_string(),
            url: extractor.url().to_string(),
            original_url: extractor.original_url().to_string(),
            name,
            stream_type,
            textual_upload_date,
            upload_date,
            thumbnail_url,
            description,
            length,
            view_count,
            like_count,
            dislike_count,
            uploader_name,
            uploader_url,
            uploader_avatar_url,
            age_limit,
            hls_url,
            video_streams,
            audio_streams,
            subtitles,
            tags,
            related_items,
            errors: c.errors,
        })
    }

    /// True if any field failed
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// One page of search results
#[derive(Debug, Clone, Serialize)]
pub struct SearchInfo {
    pub service_id: u32,
    pub query: String,
    pub url: String,
    pub page: Page,
    pub items: Vec<InfoItem>,
    pub has_next_page: bool,
    pub suggestion: String,
    pub errors: Vec<FieldError>,
}

impl SearchInfo {
    /// Builds the page record from a fetched search extractor
    ///
    /// # Errors
    /// `IllegalLifecycle` if the page wasn't fetched; failing fields are
    /// recorded instead
    pub fn from_extractor(extractor: &dyn SearchExtractor) -> Result<Self> {
        extractor.ensure_fetched()?;
        let mut c = Collector::new(extractor.url());

        let items = c.field("items", extractor.items().map(<[_]>::to_vec), Vec::new());
        let has_next_page = c.field("has_next_page", extractor.has_next_page(), false);
        let suggestion = c.field("suggestion", extractor.suggestion(), String::new());

        Ok(Self {
            service_id: extractor.service_id(),
            query: extractor.search_string().to_string(),
            url: extractor.url().to_string(),
            page: extractor.query_handler().current_page(),
            items,
            has_next_page,
            suggestion,
            errors: c.errors,
        })
    }
}
