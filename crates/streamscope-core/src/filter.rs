//! Search filter engine
//!
//! Every service registers its selectable filters once at startup: a root
//! container of content filters ("all", "albums", ...) and, per content
//! filter, the container of sort filters that make sense while it is active.
//! Each filter carries the query fragment it contributes to a search URL.
//!
//! Evaluation is order-sensitive: fragments are emitted in the order the
//! caller selected them. Items without a fragment (like "all") are no-ops.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExtractorError, Result};

/// Service-unique identifier of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(pub u32);

/// A selectable content category or sort order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterItem {
    pub id: FilterId,
    pub name: String,
    /// What this filter adds to the search URL; `None` for defaults like "all"
    #[serde(skip)]
    pub query_fragment: Option<String>,
}

impl FilterItem {
    pub fn new(id: u32, name: &str, query_fragment: Option<&str>) -> Self {
        Self {
            id: FilterId(id),
            name: name.to_string(),
            query_fragment: query_fragment.map(str::to_string),
        }
    }
}

/// A named group of filters
///
/// In an exclusive group at most one item may be selected (radio buttons);
/// otherwise any subset may be (checkboxes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterGroup {
    pub name: String,
    pub exclusive: bool,
    pub items: Vec<FilterItem>,
}

impl FilterGroup {
    /// Group where at most one item may be selected
    pub fn exclusive(name: &str, items: Vec<FilterItem>) -> Self {
        Self {
            name: name.to_string(),
            exclusive: true,
            items,
        }
    }

    /// Group where any subset may be selected
    pub fn multiple(name: &str, items: Vec<FilterItem>) -> Self {
        Self {
            name: name.to_string(),
            exclusive: false,
            items,
        }
    }
}

/// Ordered collection of filter groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterContainer {
    pub groups: Vec<FilterGroup>,
}

impl FilterContainer {
    pub fn new(groups: Vec<FilterGroup>) -> Self {
        Self { groups }
    }

    /// All items in group order
    pub fn items(&self) -> impl Iterator<Item = &FilterItem> {
        self.groups.iter().flat_map(|g| g.items.iter())
    }

    pub fn contains(&self, id: FilterId) -> bool {
        self.items().any(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items().next().is_none()
    }

    /// Rejects two selected items from the same exclusive group
    fn check_exclusive(&self, selected: &[FilterId]) -> Result<()> {
        for group in self.groups.iter().filter(|g| g.exclusive) {
            let mut hits = selected
                .iter()
                .filter(|id| group.items.iter().any(|item| item.id == **id));
            if let (Some(_), Some(second)) = (hits.next(), hits.next()) {
                return Err(ExtractorError::IncompatibleFilter {
                    filter: second.0,
                    reason: format!("only one filter of group '{}' may be selected", group.name),
                });
            }
        }
        Ok(())
    }
}

/// What to do with a sort filter that no active content filter offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortFilterPolicy {
    /// Fail with `IncompatibleFilter`
    #[default]
    Reject,
    /// Drop it and keep going
    Ignore,
}

/// Per-service filter registry
#[derive(Debug, Clone)]
pub struct SearchFilters {
    content: FilterContainer,
    sort_variants: HashMap<FilterId, FilterContainer>,
    index: HashMap<FilterId, FilterItem>,
    separator: String,
    default_content: Option<FilterId>,
    sort_policy: SortFilterPolicy,
}

impl SearchFilters {
    pub fn builder() -> SearchFiltersBuilder {
        SearchFiltersBuilder::default()
    }

    /// Root content filters
    pub fn content_filters(&self) -> &FilterContainer {
        &self.content
    }

    /// Sort filters valid while `content_id` is active; `None` if it has none
    pub fn sort_filter_variant(&self, content_id: FilterId) -> Option<&FilterContainer> {
        self.sort_variants.get(&content_id)
    }

    /// Looks up any registered filter
    ///
    /// # Errors
    /// Returns `UnknownFilter` if no container registers `id`
    pub fn filter_item(&self, id: FilterId) -> Result<&FilterItem> {
        self.index.get(&id).ok_or(ExtractorError::UnknownFilter(id.0))
    }

    /// Resolves raw ids to their registered items, keeping order
    pub fn resolve(&self, ids: &[u32]) -> Result<Vec<FilterItem>> {
        ids.iter()
            .map(|id| self.filter_item(FilterId(*id)).cloned())
            .collect()
    }

    pub fn sort_policy(&self) -> SortFilterPolicy {
        self.sort_policy
    }

    pub fn default_content_filter(&self) -> Option<FilterId> {
        self.default_content
    }

    /// Query fragment for the selected content filters
    ///
    /// An empty selection yields the default content filter's fragment, or
    /// the empty string when the service has none.
    ///
    /// # Errors
    /// - `UnknownFilter` for an unregistered id
    /// - `IncompatibleFilter` for a sort filter passed as content filter, or
    ///   two selections from one exclusive group
    pub fn evaluate_content_filters(&self, selected: &[FilterItem]) -> Result<String> {
        let ids = self.validate_content(selected)?;
        let ids = if ids.is_empty() {
            self.default_content.into_iter().collect()
        } else {
            ids
        };
        self.join_fragments(&ids)
    }

    /// Query fragment for the selected sort filters
    ///
    /// Sort filters are checked against the variants of the active content
    /// filters (the selected ones, or the default when nothing is selected).
    pub fn evaluate_sort_filters(
        &self,
        content: &[FilterItem],
        sort: &[FilterItem],
    ) -> Result<String> {
        let content_ids = self.validate_content(content)?;
        let active: Vec<FilterId> = if content_ids.is_empty() {
            self.default_content.into_iter().collect()
        } else {
            content_ids
        };

        let mut accepted = Vec::with_capacity(sort.len());
        for item in sort {
            let registered = self.filter_item(item.id)?;
            let compatible = active.iter().any(|content_id| {
                self.sort_variants
                    .get(content_id)
                    .is_some_and(|variant| variant.contains(registered.id))
            });

            if compatible {
                accepted.push(registered.id);
                continue;
            }
            match self.sort_policy {
                SortFilterPolicy::Reject => {
                    return Err(ExtractorError::IncompatibleFilter {
                        filter: registered.id.0,
                        reason: "no active content filter offers this sort filter".to_string(),
                    });
                }
                SortFilterPolicy::Ignore => {
                    debug!(
                        filter = registered.id.0,
                        name = %registered.name,
                        "ignoring incompatible sort filter"
                    );
                }
            }
        }

        for content_id in &active {
            if let Some(variant) = self.sort_variants.get(content_id) {
                variant.check_exclusive(&accepted)?;
            }
        }

        self.join_fragments(&accepted)
    }

    /// Content and sort fragments joined with the service separator
    pub fn evaluate_filters(&self, content: &[FilterItem], sort: &[FilterItem]) -> Result<String> {
        let content_fragment = self.evaluate_content_filters(content)?;
        let sort_fragment = self.evaluate_sort_filters(content, sort)?;
        Ok(self.join(&[content_fragment.as_str(), sort_fragment.as_str()]))
    }

    fn validate_content(&self, selected: &[FilterItem]) -> Result<Vec<FilterId>> {
        let mut ids = Vec::with_capacity(selected.len());
        for item in selected {
            let registered = self.filter_item(item.id)?;
            if !self.content.contains(registered.id) {
                return Err(ExtractorError::IncompatibleFilter {
                    filter: registered.id.0,
                    reason: "not a content filter".to_string(),
                });
            }
            ids.push(registered.id);
        }
        self.content.check_exclusive(&ids)?;
        Ok(ids)
    }

    fn join_fragments(&self, ids: &[FilterId]) -> Result<String> {
        let fragments = ids
            .iter()
            .map(|id| {
                self.filter_item(*id)
                    .map(|item| item.query_fragment.as_deref().unwrap_or(""))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.join(&fragments))
    }

    fn join(&self, fragments: &[&str]) -> String {
        fragments
            .iter()
            .filter(|f| !f.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

/// Builder for [`SearchFilters`]
#[derive(Debug, Default)]
pub struct SearchFiltersBuilder {
    content: Vec<FilterGroup>,
    sort_variants: Vec<(Vec<u32>, FilterContainer)>,
    separator: String,
    default_content: Option<u32>,
    sort_policy: SortFilterPolicy,
}

impl SearchFiltersBuilder {
    /// Adds a group of content filters
    pub fn content_group(mut self, group: FilterGroup) -> Self {
        self.content.push(group);
        self
    }

    /// Registers `container` as the sort filters of every id in `content_ids`
    pub fn sort_variant(mut self, content_ids: &[u32], container: FilterContainer) -> Self {
        self.sort_variants.push((content_ids.to_vec(), container));
        self
    }

    /// Separator placed between non-empty fragments (default: none)
    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    /// Content filter considered active when the caller selects none
    pub fn default_content(mut self, id: u32) -> Self {
        self.default_content = Some(id);
        self
    }

    pub fn sort_policy(mut self, policy: SortFilterPolicy) -> Self {
        self.sort_policy = policy;
        self
    }

    /// Validates and freezes the registry
    ///
    /// # Errors
    /// - `DuplicateFilter` if an id is registered twice
    /// - `UnknownFilter` if a sort variant or the default refers to an id
    ///   that is not a content filter
    pub fn build(self) -> Result<SearchFilters> {
        let mut index = HashMap::new();
        let content = FilterContainer::new(self.content);
        for item in content.items() {
            if index.insert(item.id, item.clone()).is_some() {
                return Err(ExtractorError::DuplicateFilter(item.id.0));
            }
        }

        let mut sort_variants = HashMap::new();
        for (content_ids, container) in self.sort_variants {
            for item in container.items() {
                if index.insert(item.id, item.clone()).is_some() {
                    return Err(ExtractorError::DuplicateFilter(item.id.0));
                }
            }
            for id in content_ids {
                if !content.contains(FilterId(id)) {
                    return Err(ExtractorError::UnknownFilter(id));
                }
                sort_variants.insert(FilterId(id), container.clone());
            }
        }

        if let Some(id) = self.default_content
            && !content.contains(FilterId(id))
        {
            return Err(ExtractorError::UnknownFilter(id));
        }

        Ok(SearchFilters {
            content,
            sort_variants,
            index,
            separator: self.separator,
            default_content: self.default_content.map(FilterId),
            sort_policy: self.sort_policy,
        })
    }
}
