//! Structured decoding helpers
//!
//! Thin wrappers over serde_json and scraper that turn "the data wasn't
//! where we expected it" into [`crate::ExtractorError::StructuralMismatch`].

pub mod html;
pub mod json;
pub mod text;
