//! HTTP transport with rate limiting and retry logic
//!
//! Extractors never talk to reqwest directly; they go through the
//! [`Downloader`] trait so tests (and host applications) can swap the
//! transport. [`HttpDownloader`] is the default implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{ExtractorError, Result};

/// Default browser user agent
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Markers of anti-bot interstitials (Cloudflare, reCAPTCHA, hCaptcha)
const CHALLENGE_MARKERS: &[&str] = &[
    "<title>Just a moment...</title>",
    "cf-challenge",
    "cf_chl_opt",
    "g-recaptcha",
    "h-captcha",
    "captcha-delivery",
];

/// Configuration for the HTTP client
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Maximum requests per second (default: 2.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Maximum retry attempts for transient errors (default: 3)
    pub max_retries: u32,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Accept-Language header sent with every request
    pub accept_language: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 2.0,
            timeout_secs: 30,
            max_retries: 3,
            user_agent: USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

/// Rate limiter to control request frequency
///
/// Ensures requests are spaced at least `min_interval` apart.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// Non-positive rates disable limiting.
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        let start = Instant::now()
            .checked_sub(min_interval)
            .unwrap_or_else(Instant::now);
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(start)),
        }
    }

    /// Acquire permission to make a request
    ///
    /// If called before the minimum interval has passed since the last request,
    /// this method will sleep until the interval has elapsed.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();

        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }

        *last = Instant::now();
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// A fetched HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Final URL after redirects
    pub url: String,
    pub body: String,
}

impl Response {
    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used by every extractor
#[async_trait]
pub trait Downloader: Send + Sync {
    /// GET a URL with optional extra headers
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Response>;

    /// POST a body to a URL with optional extra headers
    async fn post(&self, url: &str, headers: &[(&str, &str)], body: Vec<u8>) -> Result<Response>;
}

/// Returns true when a response is an anti-bot interstitial
pub fn is_challenge(status: u16, body: &str) -> bool {
    if status == 429 {
        return true;
    }
    matches!(status, 403 | 503) && CHALLENGE_MARKERS.iter().any(|m| body.contains(m))
}

/// Turns a raw response into the response an extractor may parse
///
/// Challenges become [`ExtractorError::BlockedByChallenge`], any other
/// non-2xx status becomes [`ExtractorError::Status`].
pub fn check_response(response: Response) -> Result<Response> {
    if is_challenge(response.status, &response.body) {
        return Err(ExtractorError::BlockedByChallenge(response.url));
    }
    if !response.is_success() {
        return Err(ExtractorError::Status {
            status: response.status,
            url: response.url,
        });
    }
    Ok(response)
}

/// reqwest-backed [`Downloader`] with rate limiting and retries
///
/// Handles all HTTP communication, including:
/// - Rate limiting to avoid overwhelming the sites
/// - Automatic retries with exponential backoff for transient errors
/// - Browser-like headers and a cookie store
pub struct HttpDownloader {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
    max_retries: u32,
}

impl HttpDownloader {
    /// Create a new downloader with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new downloader with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        let language = reqwest::header::HeaderValue::from_str(&config.accept_language)
            .map_err(|e| ExtractorError::Parsing(format!("Invalid Accept-Language: {}", e)))?;
        headers.insert(reqwest::header::ACCEPT_LANGUAGE, language);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(ExtractorError::Http)?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_second),
            max_retries: config.max_retries,
        })
    }

    /// Send a request, retrying transient failures with exponential backoff
    async fn send_with_retry(
        &self,
        build: impl Fn() -> reqwest::RequestBuilder + Send + Sync,
        url: &str,
    ) -> Result<Response> {
        let mut attempt = 0;

        loop {
            self.rate_limiter.acquire().await;

            match self.send_once(build()).await {
                Err(e) if Self::is_retryable(&e) && attempt < self.max_retries => {
                    // Exponential backoff: 1s, 2s, 4s
                    let backoff = Duration::from_secs(1 << attempt);
                    debug!(url, attempt, ?backoff, error = %e, "retrying request");
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(ExtractorError::RateLimited) => {
                    warn!(url, "still rate limited after retries, treating as challenge");
                    return Err(ExtractorError::BlockedByChallenge(url.to_string()));
                }
                other => return other,
            }
        }
    }

    /// Perform a single attempt
    async fn send_once(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(ExtractorError::Http)?;
        let status = response.status();
        let url = response.url().to_string();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ExtractorError::RateLimited);
        }

        let body = response.text().await.map_err(ExtractorError::Http)?;

        if status.is_server_error() && !is_challenge(status.as_u16(), &body) {
            return Err(ExtractorError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(Response {
            status: status.as_u16(),
            url,
            body,
        })
    }

    /// Check if an error is retryable
    fn is_retryable(error: &ExtractorError) -> bool {
        match error {
            ExtractorError::RateLimited => true,
            ExtractorError::Status { status, .. } => *status >= 500,
            ExtractorError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Get a reference to the rate limiter (for testing)
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Response> {
        let response = self
            .send_with_retry(
                || {
                    headers
                        .iter()
                        .fold(self.client.get(url), |req, (k, v)| req.header(*k, *v))
                },
                url,
            )
            .await?;
        check_response(response)
    }

    async fn post(&self, url: &str, headers: &[(&str, &str)], body: Vec<u8>) -> Result<Response> {
        let response = self
            .send_with_retry(
                || {
                    headers
                        .iter()
                        .fold(self.client.post(url), |req, (k, v)| req.header(*k, *v))
                        .body(body.clone())
                },
                url,
            )
            .await?;
        check_response(response)
    }
}
