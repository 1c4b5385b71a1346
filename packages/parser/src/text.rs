//! Text normalization and escaping shared by the parser and serializers

/// Collapse runs of ASCII whitespace into a single space.
///
/// Leading and trailing runs collapse to one space rather than disappearing,
/// so `"a <b>x</b>"` keeps the space between `a` and the element.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;

    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }

    out
}

/// Normalize a style value: collapsed and trimmed
pub fn normalize_value(value: &str) -> String {
    collapse_whitespace(value).trim().to_string()
}

/// Decode character references (`&amp;`, `&#39;`, `&#x27;`, ...)
///
/// Unknown references are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let decoded = after
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_reference(&after[..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }

    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "copy" => Some('©'),
        "reg" => Some('®'),
        "trade" => Some('™'),
        "hellip" => Some('…'),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        _ => None,
    }
}

/// Escape text content for markup output
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value for a double-quoted attribute
pub fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_keeps_edge_spaces() {
        assert_eq!(collapse_whitespace("\n   Build Your\n  Website  "), " Build Your Website ");
        assert_eq!(collapse_whitespace("a"), "a");
    }

    #[test]
    fn test_collapse_ignores_nbsp() {
        assert_eq!(collapse_whitespace("a\u{a0}\u{a0}b"), "a\u{a0}\u{a0}b");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&#169; &#x41;"), "© A");
        assert_eq!(decode_entities("&bogus; & done"), "&bogus; & done");
    }

    #[test]
    fn test_escape_then_decode_is_identity() {
        let raw = r#"<a href="x">&</a>"#;
        assert_eq!(decode_entities(&escape_attribute(raw)), raw);
        assert_eq!(decode_entities(&escape_text(raw)), raw);
    }
}
