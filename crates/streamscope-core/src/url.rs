//! URL helper functions shared by the services
//!
//! Small string-level helpers for building and taking apart the URLs the
//! link handlers deal with.

/// URL encodes a search query
///
/// # Example
/// ```
/// use streamscope_core::url::encode_query;
/// assert_eq!(encode_query("doctor who"), "doctor%20who");
/// ```
pub fn encode_query(query: &str) -> String {
    urlencoding::encode(query).into_owned()
}

/// Decodes a query parameter value, treating `+` as a space
///
/// Returns `None` if the value is not valid percent-encoded UTF-8.
///
/// # Example
/// ```
/// use streamscope_core::url::decode_query;
/// assert_eq!(decode_query("doctor+who%21"), Some("doctor who!".to_string()));
/// ```
pub fn decode_query(value: &str) -> Option<String> {
    let spaced = value.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|s| s.into_owned())
}

/// Returns the raw (still encoded) value of a query parameter
///
/// # Example
/// ```
/// use streamscope_core::url::query_param;
/// let url = "https://bandcamp.com/search?q=foo&page=2";
/// assert_eq!(query_param(url, "page"), Some("2"));
/// assert_eq!(query_param(url, "item_type"), None);
/// ```
pub fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let query = url.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);

    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then_some(value)
    })
}

/// Strips query string and fragment from a URL
///
/// # Example
/// ```
/// use streamscope_core::url::strip_query;
/// assert_eq!(strip_query("https://a.b/c?d=1#e"), "https://a.b/c");
/// ```
pub fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Returns the lowercase host of an absolute http(s) URL
///
/// # Example
/// ```
/// use streamscope_core::url::host_of;
/// assert_eq!(
///     host_of("https://Artist.Bandcamp.com/track/x"),
///     Some("artist.bandcamp.com".to_string())
/// );
/// assert_eq!(host_of("not a url"), None);
/// ```
pub fn host_of(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    parsed.host_str().map(|h| h.to_lowercase())
}

/// Resolves a site-relative href against a base like `https://rumble.com`
pub fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            href.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_query_with_spaces() {
        assert_eq!(encode_query("doctor who s07e05"), "doctor%20who%20s07e05");
    }

    #[test]
    fn test_decode_query_invalid() {
        assert_eq!(decode_query("%FF%FE"), None);
    }

    #[test]
    fn test_query_param_ignores_fragment() {
        assert_eq!(query_param("https://x/s?q=a#top", "q"), Some("a"));
        assert_eq!(query_param("https://x/s", "q"), None);
        assert_eq!(query_param("https://x/s?flag", "flag"), Some(""));
    }

    #[test]
    fn test_strip_query_without_query() {
        assert_eq!(strip_query("https://rumble.com/v1"), "https://rumble.com/v1");
    }

    #[test]
    fn test_host_of_rejects_other_schemes() {
        assert_eq!(host_of("ftp://rumble.com/v1"), None);
        assert_eq!(host_of("https://www.rumble.com/v1"), Some("www.rumble.com".to_string()));
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(absolutize("https://rumble.com", "/v1-x.html"), "https://rumble.com/v1-x.html");
        assert_eq!(absolutize("https://rumble.com", "//cdn.x/a.jpg"), "https://cdn.x/a.jpg");
        assert_eq!(absolutize("https://rumble.com", "https://o.com/a"), "https://o.com/a");
    }
}
