//! HTML helpers on top of scraper

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::error::{ExtractorError, Result};
use crate::parser::json;

/// Compiles a CSS selector
///
/// # Errors
/// Returns `Parsing` for an invalid selector (a bug in the caller, not the page)
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ExtractorError::Parsing(format!("Invalid selector {}: {:?}", css, e)))
}

/// Collapsed text content of an element
pub fn text_of(element: &ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Attribute of the first element matching `css`, if any
pub fn first_attr(document: &Html, css: &str, attr: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .find_map(|el| el.value().attr(attr).map(str::to_string)))
}

/// Text of the first descendant of `element` matching `css`, if any
pub fn child_text(element: &ElementRef, css: &str) -> Option<String> {
    let sel = Selector::parse(css).ok()?;
    element.select(&sel).next().map(|el| text_of(&el))
}

/// Attribute of the first descendant of `element` matching `css`, if any
pub fn child_attr(element: &ElementRef, css: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(css).ok()?;
    element
        .select(&sel)
        .find_map(|el| el.value().attr(attr).map(str::to_string))
}

/// Parses the JSON stored in an attribute (e.g. `data-tralbum="{...}"`)
///
/// # Errors
/// Returns `StructuralMismatch` if no element carries the attribute or its
/// value isn't JSON
pub fn json_attr(document: &Html, attr: &str) -> Result<Value> {
    let sel = selector(&format!("[{}]", attr))?;
    let raw = document
        .select(&sel)
        .find_map(|el| el.value().attr(attr))
        .ok_or_else(|| ExtractorError::structural(attr, "attribute not found"))?;
    json::parse(raw, attr)
}

/// Parses the body of the first `<script>` whose type matches `script_type`
///
/// # Errors
/// Returns `StructuralMismatch` if no such script exists or it isn't JSON
pub fn json_script(document: &Html, script_type: &str) -> Result<Value> {
    let sel = selector(&format!("script[type=\"{}\"]", script_type))?;
    let raw = document
        .select(&sel)
        .next()
        .map(|el| el.inner_html())
        .ok_or_else(|| ExtractorError::structural(script_type, "script not found"))?;
    json::parse(raw.trim(), script_type)
}
