//! Plain-text helpers for values scraped out of markup

/// Keeps only ASCII digits ("2,043 Views" → "2043")
pub fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Parses the digits of a counter like "2,043 Views"
pub fn parse_count(text: &str) -> Option<i64> {
    digits_only(text).parse().ok()
}

/// Joins the non-empty parts with `separator`
///
/// Blank parts and the literal string "null" are dropped, so optional
/// sections of a description don't leave dangling separators.
pub fn smart_concatenate(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty() && *p != "null")
        .collect::<Vec<_>>()
        .join(separator)
}

/// Parses a clock duration ("1:02:03", "4:20", "59") into seconds
pub fn parse_duration(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut total = 0i64;
    for (fields, part) in text.split(':').enumerate() {
        if fields >= 3 || part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(part.parse::<i64>().ok()?)?;
    }

    Some(total)
}

/// Decodes HTML character references ("&amp;", "&#39;", "&#x27;")
///
/// Unknown or malformed references are kept as written.
pub fn unescape_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("2,043 Views"), "2043");
        assert_eq!(digits_only("Views"), "");
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1.204.501 Views"), Some(1_204_501));
        assert_eq!(parse_count("no views"), None);
    }

    #[test]
    fn test_smart_concatenate() {
        assert_eq!(smart_concatenate(&["a", "", "null", " b "], "\n\n"), "a\n\nb");
        assert_eq!(smart_concatenate(&["", "null"], ", "), "");
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape_entities("Tom &amp; Jerry &#39;94&#x21;"), "Tom & Jerry '94!");
        assert_eq!(unescape_entities("a &lt;b&gt; &quot;c&quot;"), "a <b> \"c\"");
        assert_eq!(unescape_entities("R&D; & more &bogus; &"), "R&D; & more &bogus; &");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("1:02:03"), Some(3723));
        assert_eq!(parse_duration("4:20"), Some(260));
        assert_eq!(parse_duration("59"), Some(59));
        assert_eq!(parse_duration("1:2:3:4"), None);
        assert_eq!(parse_duration("LIVE"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_parse_duration_rejects_oversized_input() {
        assert_eq!(parse_duration("59:59:59:59:59:59:59:59:59:59:59:59"), None);
        assert_eq!(parse_duration("99999999999999999999"), None);
        assert_eq!(parse_duration("9223372036854775807:59"), None);
    }
}
