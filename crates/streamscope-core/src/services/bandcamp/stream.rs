//! Bandcamp track extractor

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use scraper::Html;
use serde_json::Value;

use crate::client::Downloader;
use crate::error::Result;
use crate::extractor::{Extractor, FetchStatus, PageState, StreamExtractor};
use crate::linkhandler::LinkHandler;
use crate::parser::{html, json, text};
use crate::types::{AudioStream, DeliveryMethod, Description, MediaFormat, StreamType};

use super::{BANDCAMP_ID, image_url, parse_date};

/// JSON pointers into the `data-tralbum` object
struct TralbumFields {
    title: &'static str,
    artist: &'static str,
    publish_date: &'static str,
    art_id: &'static str,
    duration: &'static str,
    file: &'static str,
    about: &'static str,
    lyrics: &'static str,
    credits: &'static str,
}

const FIELDS: TralbumFields = TralbumFields {
    title: "/current/title",
    artist: "/artist",
    publish_date: "/current/publish_date",
    art_id: "/art_id",
    duration: "/trackinfo/0/duration",
    file: "/trackinfo/0/file",
    about: "/current/about",
    lyrics: "/current/lyrics",
    credits: "/current/credits",
};

const AVATAR_SELECTOR: &str = "img.band-photo";
const TAG_SELECTOR: &str = "a.tag";

/// Key of the only stream Bandcamp serves without purchase
const MP3_128: &str = "mp3-128";

#[derive(Debug)]
struct TrackPage {
    html: String,
    tralbum: Value,
}

impl TrackPage {
    fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Extracts one track from its page
pub struct BandcampStreamExtractor {
    link: LinkHandler,
    downloader: Arc<dyn Downloader>,
    state: PageState<TrackPage>,
    audio_streams: OnceLock<Vec<AudioStream>>,
}

impl BandcampStreamExtractor {
    pub fn new(link: LinkHandler, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            link,
            downloader,
            state: PageState::new(),
            audio_streams: OnceLock::new(),
        }
    }

    fn tralbum(&self) -> Result<&Value> {
        Ok(&self.state.page()?.tralbum)
    }

    fn extract_audio_streams(&self) -> Result<Vec<AudioStream>> {
        let tralbum = self.tralbum()?;
        // `file` is null for tracks that can only be bought
        if !json::has(tralbum, FIELDS.file) {
            return Ok(Vec::new());
        }
        let files = json::object_at(tralbum, FIELDS.file)?;
        let Some(url) = files.get(MP3_128).and_then(Value::as_str) else {
            return Ok(Vec::new());
        };

        Ok(vec![AudioStream {
            url: url.to_string(),
            format: MediaFormat::from_suffix(MP3_128),
            delivery: DeliveryMethod::ProgressiveHttp,
            bitrate: Some(128),
        }])
    }
}

async fn fetch_track(downloader: Arc<dyn Downloader>, url: String) -> Result<TrackPage> {
    let response = downloader.get(&url, &[]).await?;
    let tralbum = {
        let document = Html::parse_document(&response.body);
        html::json_attr(&document, "data-tralbum")?
    };
    json::array_at(&tralbum, "/trackinfo")?;
    Ok(TrackPage {
        html: response.body,
        tralbum,
    })
}

#[async_trait]
impl Extractor for BandcampStreamExtractor {
    fn service_id(&self) -> u32 {
        BANDCAMP_ID
    }

    fn link_handler(&self) -> &LinkHandler {
        &self.link
    }

    fn status(&self) -> FetchStatus {
        self.state.status()
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let url = self.link.url.clone();
        let fetch = fetch_track(Arc::clone(&self.downloader), url.clone());
        self.state.fetch_with(&url, fetch).await
    }

    fn name(&self) -> Result<String> {
        Ok(json::str_at(self.tralbum()?, FIELDS.title)?.to_string())
    }
}

impl StreamExtractor for BandcampStreamExtractor {
    fn textual_upload_date(&self) -> Result<Option<String>> {
        Ok(json::opt_str_at(self.tralbum()?, FIELDS.publish_date)?.map(str::to_string))
    }

    fn upload_date(&self) -> Result<Option<DateTime<FixedOffset>>> {
        self.textual_upload_date()?
            .map(|date| parse_date(&date))
            .transpose()
    }

    fn thumbnail_url(&self) -> Result<Option<String>> {
        let tralbum = self.tralbum()?;
        if !json::has(tralbum, FIELDS.art_id) {
            return Ok(None);
        }
        Ok(Some(image_url(json::i64_at(tralbum, FIELDS.art_id)?)))
    }

    fn description(&self) -> Result<Description> {
        let tralbum = self.tralbum()?;
        let about = json::opt_str_at(tralbum, FIELDS.about)?.unwrap_or_default();
        let lyrics = json::opt_str_at(tralbum, FIELDS.lyrics)?.unwrap_or_default();
        let credits = json::opt_str_at(tralbum, FIELDS.credits)?.unwrap_or_default();
        Ok(Description::plain(text::smart_concatenate(
            &[about, lyrics, credits],
            "\n\n",
        )))
    }

    fn length(&self) -> Result<i64> {
        json::i64_at(self.tralbum()?, FIELDS.duration)
    }

    fn uploader_name(&self) -> Result<String> {
        Ok(json::str_at(self.tralbum()?, FIELDS.artist)?.to_string())
    }

    /// The artist's subdomain
    fn uploader_url(&self) -> Result<String> {
        self.ensure_fetched()?;
        Ok(self.link.url.split('/').take(3).collect::<Vec<_>>().join("/"))
    }

    fn uploader_avatar_url(&self) -> Result<Option<String>> {
        let document = self.state.page()?.document();
        html::first_attr(&document, AVATAR_SELECTOR, "src")
    }

    fn stream_type(&self) -> Result<StreamType> {
        self.ensure_fetched()?;
        Ok(StreamType::AudioStream)
    }

    fn audio_streams(&self) -> Result<&[AudioStream]> {
        self.ensure_fetched()?;
        if let Some(streams) = self.audio_streams.get() {
            return Ok(streams);
        }
        let streams = self.extract_audio_streams()?;
        Ok(self.audio_streams.get_or_init(|| streams))
    }

    fn tags(&self) -> Result<Vec<String>> {
        let document = self.state.page()?.document();
        let sel = html::selector(TAG_SELECTOR)?;
        Ok(document
            .select(&sel)
            .map(|el| html::text_of(&el))
            .filter(|tag| !tag.is_empty())
            .collect())
    }
}
