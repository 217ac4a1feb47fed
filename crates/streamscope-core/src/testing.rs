//! In-memory transport for extractor tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::client::{Downloader, Response, check_response};
use crate::error::{ExtractorError, Result};

/// Serves canned bodies by exact URL and counts requests
#[derive(Default)]
pub struct FakeDownloader {
    routes: Mutex<HashMap<String, (u16, String)>>,
    calls: AtomicUsize,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` with status 200 at `url`
    pub fn with_page(self, url: &str, body: &str) -> Self {
        self.with_status(url, 200, body)
    }

    pub fn with_status(self, url: &str, status: u16, body: &str) -> Self {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(url.to_string(), (status, body.to_string()));
        self
    }

    /// Number of requests made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond(&self, url: &str) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let routes = self.routes.lock().expect("routes lock");
        let (status, body) = routes
            .get(url)
            .cloned()
            .ok_or_else(|| ExtractorError::Status {
                status: 404,
                url: url.to_string(),
            })?;
        check_response(Response {
            status,
            url: url.to_string(),
            body,
        })
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<Response> {
        self.respond(url)
    }

    async fn post(&self, url: &str, _headers: &[(&str, &str)], _body: Vec<u8>) -> Result<Response> {
        self.respond(url)
    }
}
