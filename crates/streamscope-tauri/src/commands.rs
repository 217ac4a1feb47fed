//! Tauri commands for streamscope
//!
//! Errors cross the IPC boundary as their display strings.

use serde::Serialize;
use streamscope_core::{FilterContainer, Page, SearchInfo, ServiceInfo, StreamInfo};
use tauri::State;

use crate::ScopeState;

/// Filters a frontend can offer for one service
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFilters {
    pub content_filters: FilterContainer,
    /// Sort filters per content filter id; content filters without sort
    /// options are left out
    pub sort_filters: Vec<(u32, FilterContainer)>,
}

/// List the built-in services
#[tauri::command]
pub fn services(state: State<'_, ScopeState>) -> Vec<ServiceInfo> {
    state
        .scope
        .services()
        .all()
        .iter()
        .map(|service| service.info().clone())
        .collect()
}

/// Search one service
///
/// # Arguments
/// * `state` - Managed ScopeState from Tauri
/// * `service_id` - Service to search
/// * `query` - Search query string
/// * `content_filters` / `sort_filters` - Selected filter ids, in order
/// * `page` - 1-based page, first page when omitted
///
/// # Errors
/// Returns error message as String if the query or filters are invalid or
/// the fetch fails
#[tauri::command]
pub async fn search(
    state: State<'_, ScopeState>,
    service_id: u32,
    query: String,
    content_filters: Option<Vec<u32>>,
    sort_filters: Option<Vec<u32>>,
    page: Option<u32>,
) -> Result<SearchInfo, String> {
    let scope = &state.scope;
    let handler = scope
        .search_query(
            service_id,
            &query,
            &content_filters.unwrap_or_default(),
            &sort_filters.unwrap_or_default(),
            page.map(|number| Page { number }),
        )
        .map_err(|e| e.to_string())?;
    scope
        .search_page(service_id, handler)
        .await
        .map_err(|e| e.to_string())
}

/// Load everything known about a stream URL
///
/// # Errors
/// Returns error message as String if no service accepts the URL or the
/// page can't be fetched; failing fields are listed in `errors` instead
#[tauri::command]
pub async fn stream_info(state: State<'_, ScopeState>, url: String) -> Result<StreamInfo, String> {
    state.scope.stream_info(&url).await.map_err(|e| e.to_string())
}

/// Content filters of a service and the sort filters each one unlocks
#[tauri::command]
pub fn content_filters(
    state: State<'_, ScopeState>,
    service_id: u32,
) -> Result<ServiceFilters, String> {
    let service = state
        .scope
        .services()
        .by_id(service_id)
        .map_err(|e| e.to_string())?;
    let factory = service.search_query_handler();
    let content = factory.content_filters().clone();
    let sort_filters = content
        .items()
        .filter_map(|item| {
            factory
                .sort_filter_variant(item.id.0)
                .map(|variant| (item.id.0, variant.clone()))
        })
        .collect();

    Ok(ServiceFilters {
        content_filters: content,
        sort_filters,
    })
}
