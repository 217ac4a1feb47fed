//! Rumble search filters
//!
//! Content filters pick the result kind (`/search/video` or
//! `/search/channel`). Only video search takes sort filters.

use crate::error::Result;
use crate::filter::{FilterContainer, FilterGroup, FilterItem, SearchFilters, SortFilterPolicy};

pub const VIDEOS: u32 = 0;
pub const CHANNELS: u32 = 1;

pub const RELEVANCE: u32 = 10;
pub const VIEWS: u32 = 11;
pub const NEWEST: u32 = 12;

pub const ANY_DATE: u32 = 20;
pub const TODAY: u32 = 21;
pub const THIS_WEEK: u32 = 22;
pub const THIS_MONTH: u32 = 23;
pub const THIS_YEAR: u32 = 24;

pub const ANY_DURATION: u32 = 30;
pub const SHORT: u32 = 31;
pub const LONG: u32 = 32;

pub(crate) fn build() -> Result<SearchFilters> {
    let video_sort = FilterContainer::new(vec![
        FilterGroup::exclusive(
            "sort by",
            vec![
                FilterItem::new(RELEVANCE, "relevance", None),
                FilterItem::new(VIEWS, "views", Some("&sort=views")),
                FilterItem::new(NEWEST, "newest", Some("&sort=date")),
            ],
        ),
        FilterGroup::exclusive(
            "upload date",
            vec![
                FilterItem::new(ANY_DATE, "any time", None),
                FilterItem::new(TODAY, "today", Some("&date=today")),
                FilterItem::new(THIS_WEEK, "this week", Some("&date=this-week")),
                FilterItem::new(THIS_MONTH, "this month", Some("&date=this-month")),
                FilterItem::new(THIS_YEAR, "this year", Some("&date=this-year")),
            ],
        ),
        FilterGroup::exclusive(
            "duration",
            vec![
                FilterItem::new(ANY_DURATION, "any duration", None),
                FilterItem::new(SHORT, "short", Some("&duration=short")),
                FilterItem::new(LONG, "long", Some("&duration=long")),
            ],
        ),
    ]);

    SearchFilters::builder()
        .content_group(FilterGroup::exclusive(
            "type",
            vec![
                FilterItem::new(VIDEOS, "videos", Some("video")),
                FilterItem::new(CHANNELS, "channels", Some("channel")),
            ],
        ))
        .sort_variant(&[VIDEOS], video_sort)
        .default_content(VIDEOS)
        .sort_policy(SortFilterPolicy::Reject)
        .build()
}
