//! JSON decoding with declared field paths
//!
//! Services describe where their fields live as JSON pointers
//! (`"/author/name"`) in a const table instead of scattering string keys
//! through the extractor code. The accessors here resolve a pointer and report
//! a structural mismatch naming the pointer when the value is missing or has
//! the wrong type.

use serde_json::{Map, Value};

use crate::error::{ExtractorError, Result};

/// Parses text as JSON
///
/// # Errors
/// Returns `StructuralMismatch` naming `what` if the text is not valid JSON
pub fn parse(text: &str, what: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| ExtractorError::structural(what, e.to_string()))
}

fn at<'a>(value: &'a Value, path: &str) -> Result<&'a Value> {
    match value.pointer(path) {
        Some(Value::Null) | None => Err(ExtractorError::structural(path, "missing")),
        Some(v) => Ok(v),
    }
}

fn wrong_type(path: &str, expected: &str) -> ExtractorError {
    ExtractorError::structural(path, format!("expected {}", expected))
}

/// Returns true if the path resolves to a non-null value
pub fn has(value: &Value, path: &str) -> bool {
    at(value, path).is_ok()
}

/// Required string at `path`
pub fn str_at<'a>(value: &'a Value, path: &str) -> Result<&'a str> {
    at(value, path)?
        .as_str()
        .ok_or_else(|| wrong_type(path, "string"))
}

/// Optional string at `path`; `None` when absent, error when present with another type
pub fn opt_str_at<'a>(value: &'a Value, path: &str) -> Result<Option<&'a str>> {
    match value.pointer(path) {
        Some(Value::Null) | None => Ok(None),
        Some(v) => v.as_str().map(Some).ok_or_else(|| wrong_type(path, "string")),
    }
}

/// Required integer at `path`; floats are truncated
pub fn i64_at(value: &Value, path: &str) -> Result<i64> {
    let v = at(value, path)?;
    v.as_i64()
        .or_else(|| v.as_f64().map(|f| f as i64))
        .ok_or_else(|| wrong_type(path, "number"))
}

/// Required object at `path`
pub fn object_at<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    at(value, path)?
        .as_object()
        .ok_or_else(|| wrong_type(path, "object"))
}

/// Required array at `path`
pub fn array_at<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    at(value, path)?
        .as_array()
        .ok_or_else(|| wrong_type(path, "array"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "title": "Pony",
            "duration": 12.7,
            "author": { "name": "Uploader" },
            "tags": ["a", "b"],
            "nothing": null
        })
    }

    #[test]
    fn test_parse_invalid_json_is_structural() {
        let err = parse("{not json", "embed").unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("embed"));
    }

    #[test]
    fn test_str_at() {
        let v = sample();
        assert_eq!(str_at(&v, "/title").unwrap(), "Pony");
        assert_eq!(str_at(&v, "/author/name").unwrap(), "Uploader");
    }

    #[test]
    fn test_missing_path_names_pointer() {
        let v = sample();
        let err = str_at(&v, "/author/url").unwrap_err();
        assert_eq!(err.to_string(), "Structural mismatch in /author/url: missing");
    }

    #[test]
    fn test_wrong_type() {
        let v = sample();
        let err = str_at(&v, "/duration").unwrap_err();
        assert!(err.to_string().contains("expected string"));
        assert!(object_at(&v, "/title").is_err());
    }

    #[test]
    fn test_null_counts_as_missing() {
        let v = sample();
        assert!(!has(&v, "/nothing"));
        assert_eq!(opt_str_at(&v, "/nothing").unwrap(), None);
        assert!(str_at(&v, "/nothing").is_err());
    }

    #[test]
    fn test_numbers() {
        let v = sample();
        assert_eq!(i64_at(&v, "/duration").unwrap(), 12);
        assert_eq!(array_at(&v, "/tags").unwrap().len(), 2);
    }
}
