//! Fetch-once page cache
//!
//! Every extractor owns one [`PageState`]. It starts `Created`, and the first
//! `fetch_with` moves it to `Fetched` (holding the page) or `FetchFailed`
//! (holding the classified cause). Both end states are final: later fetches
//! replay the stored outcome without running the fetch again.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ExtractorError, Result};

/// Observable lifecycle state of an extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FetchStatus {
    Created,
    Fetched,
    FetchFailed,
}

/// Why a fetch ended in `FetchFailed`
#[derive(Debug, Clone)]
enum FetchFailure {
    /// Challenge page; kept apart so callers can back off instead of giving up
    Blocked(String),
    Failed(Arc<ExtractorError>),
}

impl FetchFailure {
    fn classify(error: ExtractorError) -> Self {
        match error {
            ExtractorError::BlockedByChallenge(url) => Self::Blocked(url),
            ExtractorError::Extraction(cause) => Self::Failed(cause),
            other => Self::Failed(Arc::new(other)),
        }
    }

    fn to_error(&self) -> ExtractorError {
        match self {
            Self::Blocked(url) => ExtractorError::BlockedByChallenge(url.clone()),
            Self::Failed(cause) => ExtractorError::Extraction(Arc::clone(cause)),
        }
    }
}

#[derive(Debug)]
enum State<P> {
    Created,
    Fetched(P),
    Failed(FetchFailure),
}

/// Tri-state lifecycle tag plus the cached page
#[derive(Debug)]
pub struct PageState<P> {
    state: State<P>,
}

impl<P> Default for PageState<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> PageState<P> {
    pub fn new() -> Self {
        Self {
            state: State::Created,
        }
    }

    pub fn status(&self) -> FetchStatus {
        match self.state {
            State::Created => FetchStatus::Created,
            State::Fetched(_) => FetchStatus::Fetched,
            State::Failed(_) => FetchStatus::FetchFailed,
        }
    }

    /// Runs `fetch` if nothing was fetched yet, otherwise replays the outcome
    ///
    /// The future is dropped unpolled when the state is already final, so
    /// the transport is hit at most once per extractor.
    ///
    /// # Errors
    /// - `BlockedByChallenge` if the site served a challenge
    /// - `Extraction` wrapping any other cause
    pub async fn fetch_with<F>(&mut self, url: &str, fetch: F) -> Result<()>
    where
        F: Future<Output = Result<P>>,
    {
        match &self.state {
            State::Fetched(_) => return Ok(()),
            State::Failed(failure) => return Err(failure.to_error()),
            State::Created => {}
        }

        debug!(url, "fetching page");
        match fetch.await {
            Ok(page) => {
                info!(url, "page fetched");
                self.state = State::Fetched(page);
                Ok(())
            }
            Err(error) => {
                let failure = FetchFailure::classify(error);
                match &failure {
                    FetchFailure::Blocked(_) => warn!(url, "blocked by anti-bot challenge"),
                    FetchFailure::Failed(cause) => warn!(url, error = %cause, "page fetch failed"),
                }
                let error = failure.to_error();
                self.state = State::Failed(failure);
                Err(error)
            }
        }
    }

    /// The cached page
    ///
    /// # Errors
    /// `IllegalLifecycle` unless a fetch has succeeded
    pub fn page(&self) -> Result<&P> {
        match &self.state {
            State::Fetched(page) => Ok(page),
            _ => Err(lifecycle_error(self.status())),
        }
    }
}

/// `Ok` only for [`FetchStatus::Fetched`]
pub fn require_fetched(status: FetchStatus) -> Result<()> {
    match status {
        FetchStatus::Fetched => Ok(()),
        other => Err(lifecycle_error(other)),
    }
}

fn lifecycle_error(status: FetchStatus) -> ExtractorError {
    let message = match status {
        FetchStatus::FetchFailed => "page fetch failed, construct a new extractor to retry",
        _ => "page not fetched yet, call fetch_page first",
    };
    ExtractorError::IllegalLifecycle(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_page_before_fetch_is_illegal() {
        let state: PageState<String> = PageState::new();
        assert_eq!(state.status(), FetchStatus::Created);
        assert!(matches!(state.page(), Err(ExtractorError::IllegalLifecycle(_))));
    }

    #[test]
    fn test_require_fetched() {
        assert!(require_fetched(FetchStatus::Fetched).is_ok());
        assert!(matches!(
            require_fetched(FetchStatus::Created),
            Err(ExtractorError::IllegalLifecycle(_))
        ));
        let failed = require_fetched(FetchStatus::FetchFailed).unwrap_err();
        assert!(failed.to_string().contains("construct a new extractor"));
    }

    #[tokio::test]
    async fn test_fetch_runs_once() {
        let calls = AtomicUsize::new(0);
        let mut state = PageState::new();

        for _ in 0..3 {
            state
                .fetch_with("https://x", async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("page".to_string())
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.status(), FetchStatus::Fetched);
        assert_eq!(state.page().unwrap(), "page");
    }

    #[tokio::test]
    async fn test_failure_is_wrapped_and_replayed() {
        let calls = AtomicUsize::new(0);
        let mut state: PageState<String> = PageState::new();

        let first = state
            .fetch_with("https://x", async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ExtractorError::structural("ld+json", "not found"))
            })
            .await
            .unwrap_err();
        let second = state
            .fetch_with("https://x", async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("late".to_string())
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(first, ExtractorError::Extraction(_)));
        assert!(first.is_structural());
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(state.status(), FetchStatus::FetchFailed);
        assert!(matches!(state.page(), Err(ExtractorError::IllegalLifecycle(_))));
    }

    #[tokio::test]
    async fn test_challenge_stays_distinct() {
        let mut state: PageState<String> = PageState::new();
        let error = state
            .fetch_with("https://x", async {
                Err(ExtractorError::BlockedByChallenge("https://x".to_string()))
            })
            .await
            .unwrap_err();
        assert!(error.is_blocked());

        let replay = state
            .fetch_with("https://x", async { Ok(String::new()) })
            .await
            .unwrap_err();
        assert!(replay.is_blocked());
    }

    #[tokio::test]
    async fn test_already_wrapped_error_is_not_double_wrapped() {
        let mut state: PageState<String> = PageState::new();
        let cause = Arc::new(ExtractorError::RateLimited);
        let error = state
            .fetch_with("https://x", async move { Err(ExtractorError::Extraction(cause)) })
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "Extraction failed: Rate limited - too many requests");
    }
}
