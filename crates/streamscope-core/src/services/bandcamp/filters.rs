//! Bandcamp search filters
//!
//! One exclusive group selecting the result type. Bandcamp has no sort
//! options.

use crate::error::Result;
use crate::filter::{FilterGroup, FilterItem, SearchFilters, SortFilterPolicy};

pub const ALL: u32 = 0;
pub const ARTISTS: u32 = 1;
pub const ALBUMS: u32 = 2;
pub const TRACKS: u32 = 3;

pub(crate) fn build() -> Result<SearchFilters> {
    SearchFilters::builder()
        .content_group(FilterGroup::exclusive(
            "type",
            vec![
                FilterItem::new(ALL, "all", None),
                FilterItem::new(ARTISTS, "artists & labels", Some("&item_type=b")),
                FilterItem::new(ALBUMS, "albums", Some("&item_type=a")),
                FilterItem::new(TRACKS, "tracks", Some("&item_type=t")),
            ],
        ))
        .default_content(ALL)
        .sort_policy(SortFilterPolicy::Reject)
        .build()
}
