//! Streamscope Tauri Integration
//!
//! Provides a Tauri plugin exposing streamscope search and stream extraction
//! to the frontend.
//!
//! # Usage
//!
//! Register the plugin in your Tauri application:
//!
//! ```ignore
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(streamscope_tauri::init())
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! Then invoke commands from the frontend:
//!
//! ```javascript
//! import { invoke } from '@tauri-apps/api/core';
//!
//! // Filters Rumble offers
//! const filters = await invoke('plugin:streamscope|content_filters', { serviceId: 2 });
//!
//! // Newest Rumble videos
//! const results = await invoke('plugin:streamscope|search', {
//!   serviceId: 2,
//!   query: 'electric car',
//!   sortFilters: [12],
//! });
//!
//! // Stream details
//! const info = await invoke('plugin:streamscope|stream_info', { url: results.items[0].url });
//! ```

use std::sync::Arc;

use streamscope_core::StreamScope;
use tauri::{
    Manager, Runtime,
    plugin::{Builder, TauriPlugin},
};

mod commands;

pub use commands::ServiceFilters;

/// Shared handle on the streamscope API
///
/// `StreamScope` keeps no per-request state, so commands share it without a
/// lock; the downloader inside handles rate limiting.
pub struct ScopeState {
    pub(crate) scope: Arc<StreamScope>,
}

impl ScopeState {
    /// Create a new ScopeState with default configuration
    ///
    /// # Errors
    /// Returns error string if the HTTP client can't be built
    pub fn new() -> Result<Self, String> {
        let scope = StreamScope::new().map_err(|e| e.to_string())?;
        Ok(Self {
            scope: Arc::new(scope),
        })
    }

    pub fn scope(&self) -> Arc<StreamScope> {
        Arc::clone(&self.scope)
    }
}

/// Initialize the streamscope plugin
///
/// # Example
/// ```ignore
/// tauri::Builder::default()
///     .plugin(streamscope_tauri::init())
///     .run(tauri::generate_context!())
///     .expect("error while running tauri application");
/// ```
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("streamscope")
        .invoke_handler(tauri::generate_handler![
            commands::services,
            commands::search,
            commands::stream_info,
            commands::content_filters
        ])
        .setup(|app, _api| {
            let state = ScopeState::new().map_err(Box::<dyn std::error::Error>::from)?;
            app.manage(state);
            Ok(())
        })
        .build()
}

// Re-export types for convenience
pub use streamscope_core::{SearchInfo, StreamInfo};
