use std::borrow::Cow;
use url::Url;

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps", "mailto", "tel"];

/// Escape text for an HTML text node or a quoted attribute value.
pub fn esc_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#039;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

pub fn esc_attr(s: &str) -> Cow<'_, str> {
    esc_html(s)
}

/// Clean a URL for an `href`/`src` attribute.
///
/// Whitespace and control characters are stripped. Absolute URLs with a scheme
/// outside the allow list (e.g. `javascript:`) collapse to an empty string.
pub fn esc_url(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_control() && *c != ' ')
        .collect();

    if cleaned.is_empty() {
        return String::new();
    }

    if has_scheme(&cleaned) {
        match Url::parse(&cleaned) {
            Ok(url) if ALLOWED_SCHEMES.contains(&url.scheme()) => {}
            _ => return String::new(),
        }
    }

    esc_attr(&cleaned).into_owned()
}

// 第一個 ':' 出現在任何 '/', '?', '#' 之前才算有 scheme
fn has_scheme(s: &str) -> bool {
    match s.find(':') {
        Some(pos) => !s[..pos].contains(['/', '?', '#']),
        None => false,
    }
}
