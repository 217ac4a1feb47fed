//! Core data types for streamscope
//!
//! Media descriptions shared by every service: streams, info items and the
//! sentinels used when a site simply doesn't report something.

use serde::{Deserialize, Serialize};

/// Counter value for "this site does not report it"
pub const UNKNOWN_COUNT: i64 = -1;

/// Age limit value for content without a restriction
pub const NO_AGE_LIMIT: u32 = 0;

/// Kind of content behind a stream link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamType {
    VideoStream,
    AudioStream,
    LiveStream,
    AudioLiveStream,
    PostLiveStream,
}

/// Container / codec family of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaFormat {
    Mpeg4,
    WebM,
    Mp3,
    M4a,
    Opus,
    Vtt,
    Unknown,
}

impl MediaFormat {
    /// Maps a file suffix or format key ("mp4", "webm", "mp3-128") to a format
    pub fn from_suffix(suffix: &str) -> Self {
        let suffix = suffix.trim().to_lowercase();
        let head = suffix.split('-').next().unwrap_or(&suffix);
        match head {
            "mp4" | "m4v" => Self::Mpeg4,
            "webm" => Self::WebM,
            "mp3" => Self::Mp3,
            "m4a" => Self::M4a,
            "opus" => Self::Opus,
            "vtt" => Self::Vtt,
            _ => Self::Unknown,
        }
    }
}

/// How a stream's content is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMethod {
    /// Plain progressive HTTP download
    ProgressiveHttp,
    /// HLS manifest
    Hls,
    /// DASH manifest
    Dash,
}

/// A playable video stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStream {
    /// URL of the file or manifest
    pub url: String,
    /// Resolution label (e.g., "720p"), empty for live manifests
    pub resolution: String,
    pub format: MediaFormat,
    pub delivery: DeliveryMethod,
    /// True when the stream carries no audio track
    pub video_only: bool,
}

/// A playable audio stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioStream {
    pub url: String,
    pub format: MediaFormat,
    pub delivery: DeliveryMethod,
    /// Average bitrate in kbit/s, if the site reports it
    pub bitrate: Option<u32>,
}

/// A subtitle track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitlesStream {
    pub url: String,
    pub language: String,
    pub format: MediaFormat,
    pub auto_generated: bool,
}

/// Markup of a description text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DescriptionKind {
    PlainText,
    Html,
}

/// Description of a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub content: String,
    pub kind: DescriptionKind,
}

impl Description {
    /// Plain-text description
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: DescriptionKind::PlainText,
        }
    }

    /// Empty plain-text description
    pub fn empty() -> Self {
        Self::plain("")
    }
}

impl Default for Description {
    fn default() -> Self {
        Self::empty()
    }
}

/// Stream entry in a result list (search results, related items)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfoItem {
    pub name: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub uploader_name: String,
    pub uploader_url: Option<String>,
    /// Duration in seconds, [`UNKNOWN_COUNT`] if not shown
    pub duration: i64,
    /// View count, [`UNKNOWN_COUNT`] if not shown
    pub view_count: i64,
    pub textual_upload_date: Option<String>,
    pub stream_type: StreamType,
}

/// Channel / artist entry in a result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfoItem {
    pub name: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub description: String,
    /// Subscriber count, [`UNKNOWN_COUNT`] if not shown
    pub subscriber_count: i64,
}

/// Playlist / album entry in a result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistInfoItem {
    pub name: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub uploader_name: String,
    /// Number of entries, [`UNKNOWN_COUNT`] if not shown
    pub stream_count: i64,
}

/// Any entry of a result list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InfoItem {
    Stream(StreamInfoItem),
    Channel(ChannelInfoItem),
    Playlist(PlaylistInfoItem),
}

impl InfoItem {
    /// Display name of the item
    pub fn name(&self) -> &str {
        match self {
            Self::Stream(item) => &item.name,
            Self::Channel(item) => &item.name,
            Self::Playlist(item) => &item.name,
        }
    }

    /// URL of the item
    pub fn url(&self) -> &str {
        match self {
            Self::Stream(item) => &item.url,
            Self::Channel(item) => &item.url,
            Self::Playlist(item) => &item.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_format_from_suffix() {
        assert_eq!(MediaFormat::from_suffix("mp4"), MediaFormat::Mpeg4);
        assert_eq!(MediaFormat::from_suffix("WEBM"), MediaFormat::WebM);
        assert_eq!(MediaFormat::from_suffix("mp3-128"), MediaFormat::Mp3);
        assert_eq!(MediaFormat::from_suffix("hls"), MediaFormat::Unknown);
    }

    #[test]
    fn test_info_item_serialization_is_tagged() {
        let item = InfoItem::Channel(ChannelInfoItem {
            name: "Artist".to_string(),
            url: "https://artist.bandcamp.com".to_string(),
            thumbnail_url: None,
            description: String::new(),
            subscriber_count: UNKNOWN_COUNT,
        });

        let json = serde_json::to_value(&item).expect("Serialization should succeed");
        assert_eq!(json["type"], "channel");
        assert_eq!(json["subscriber_count"], -1);

        let back: InfoItem = serde_json::from_value(json).expect("Deserialization should succeed");
        assert_eq!(back, item);
        assert_eq!(back.name(), "Artist");
        assert_eq!(back.url(), "https://artist.bandcamp.com");
    }

    #[test]
    fn test_description_default_is_empty_plain_text() {
        let description = Description::default();
        assert!(description.content.is_empty());
        assert_eq!(description.kind, DescriptionKind::PlainText);
    }
}
