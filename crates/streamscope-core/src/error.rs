//! Error types for streamscope
//!
//! One enum covers the whole extraction layer. Variants are split by who has
//! to react: the site changed (`StructuralMismatch`), the site is refusing us
//! (`BlockedByChallenge`), the caller misused the API (`UnknownFilter`,
//! `IncompatibleFilter`, `IllegalLifecycle`) or the fetch failed for any other
//! reason (`Extraction`).

use std::sync::Arc;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all streamscope operations
///
/// Implements Display for human-readable messages and Serialize
/// for Tauri command compatibility.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// HTTP request failed at the transport level
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a status we can't use
    #[error("Unexpected HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    /// Rate limited by server (HTTP 429), still retryable
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Anti-automation challenge served instead of content
    #[error("Blocked by anti-bot challenge: {0}")]
    BlockedByChallenge(String),

    /// Fetched data did not have the expected shape
    #[error("Structural mismatch in {field}: {reason}")]
    StructuralMismatch { field: String, reason: String },

    /// Fetch failed; wraps the classified cause
    #[error("Extraction failed: {0}")]
    Extraction(#[source] Arc<ExtractorError>),

    /// URL or request construction failed
    #[error("Parsing failed: {0}")]
    Parsing(String),

    /// URL does not belong to the service it was given to
    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    /// No registered service matches
    #[error("Unknown service: {0}")]
    UnknownService(String),

    /// Filter id is not registered with the service
    #[error("Unknown filter: {0}")]
    UnknownFilter(u32),

    /// Filter selection can't be combined
    #[error("Incompatible filter {filter}: {reason}")]
    IncompatibleFilter { filter: u32, reason: String },

    /// Filter id registered twice while building a registry
    #[error("Duplicate filter id: {0}")]
    DuplicateFilter(u32),

    /// Accessor used before a successful fetch
    #[error("Illegal extractor state: {0}")]
    IllegalLifecycle(String),
}

impl ExtractorError {
    /// Shorthand for a [`ExtractorError::StructuralMismatch`]
    pub fn structural(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StructuralMismatch {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for a structural mismatch, directly or as the cause of a failed fetch
    pub fn is_structural(&self) -> bool {
        match self {
            Self::StructuralMismatch { .. } => true,
            Self::Extraction(cause) => cause.is_structural(),
            _ => false,
        }
    }

    /// True when the site served a challenge page
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::BlockedByChallenge(_))
    }
}

impl Serialize for ExtractorError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for streamscope operations
pub type Result<T> = std::result::Result<T, ExtractorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_structural() {
        let error = ExtractorError::structural("/author/name", "missing");
        assert_eq!(error.to_string(), "Structural mismatch in /author/name: missing");
    }

    #[test]
    fn test_error_display_blocked() {
        let error = ExtractorError::BlockedByChallenge("https://rumble.com/v1".to_string());
        assert_eq!(
            error.to_string(),
            "Blocked by anti-bot challenge: https://rumble.com/v1"
        );
    }

    #[test]
    fn test_error_display_filters() {
        assert_eq!(ExtractorError::UnknownFilter(42).to_string(), "Unknown filter: 42");
        let error = ExtractorError::IncompatibleFilter {
            filter: 7,
            reason: "no active content filter".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Incompatible filter 7: no active content filter"
        );
    }

    #[test]
    fn test_error_display_unknown_service() {
        let error = ExtractorError::UnknownService("vimeo".to_string());
        assert_eq!(error.to_string(), "Unknown service: vimeo");
    }

    #[test]
    fn test_error_display_status() {
        let error = ExtractorError::Status {
            status: 404,
            url: "https://bandcamp.com/x".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unexpected HTTP status 404 for https://bandcamp.com/x"
        );
    }

    #[test]
    fn test_extraction_wraps_cause() {
        let cause = Arc::new(ExtractorError::structural("ld+json", "not found"));
        let error = ExtractorError::Extraction(cause);
        assert_eq!(
            error.to_string(),
            "Extraction failed: Structural mismatch in ld+json: not found"
        );
        assert!(error.is_structural());
        assert!(!error.is_blocked());
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_error_serialize() {
        let error = ExtractorError::RateLimited;
        let json = serde_json::to_string(&error).expect("Serialization should succeed");
        assert_eq!(json, "\"Rate limited - too many requests\"");
    }

    #[test]
    fn test_error_serialize_with_message() {
        let error = ExtractorError::IllegalLifecycle("page not fetched".to_string());
        let json = serde_json::to_string(&error).expect("Serialization should succeed");
        assert_eq!(json, "\"Illegal extractor state: page not fetched\"");
    }
}
