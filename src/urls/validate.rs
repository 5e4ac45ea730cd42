//! Strict URL grammar and queryless/base URL helpers.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::InvalidUrlError;

/// Identity and return-to URL grammar.
///
/// Host is a dotted-quad IPv4 literal, `localhost`, or a domain ending in a
/// 2-6 letter top-level label. Port is 1-4 digits. The path may only use an
/// allow-listed character set.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^https?://",
        r"(",
        r"((25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])",
        r"|localhost",
        r"|([0-9A-Za-z_!~*'()-]+\.)*([0-9A-Za-z][0-9A-Za-z-]{0,61})?[0-9A-Za-z]\.[A-Za-z]{2,6}",
        r")",
        r"(:[0-9]{1,4})?",
        r"(/?|(/[0-9A-Za-z_!~*'().;?:@&=+$,%#-]+)+/?)$",
    ))
    .expect("URL_REGEX is a valid regex pattern")
});

/// Whether `url` matches the accepted identity/return-to grammar.
pub fn is_valid_url(url: &str) -> bool {
    URL_REGEX.is_match(url)
}

/// Like [`is_valid_url`], but as a typed result.
pub fn validate_url(url: &str) -> Result<(), InvalidUrlError> {
    if is_valid_url(url) {
        Ok(())
    } else {
        Err(InvalidUrlError(url.to_string()))
    }
}

/// Offset after which separators are searched; skips the scheme.
const SCHEME_SKIP: usize = 8;

fn has_http_scheme(url: &str) -> bool {
    url.len() >= SCHEME_SKIP && (url.starts_with("http://") || url.starts_with("https://"))
}

/// First position of `needle` at or after the scheme.
fn find_after_scheme(url: &str, needle: u8) -> Option<usize> {
    url.as_bytes()[SCHEME_SKIP..]
        .iter()
        .position(|&b| b == needle)
        .map(|pos| pos + SCHEME_SKIP)
}

/// `url` with its query string removed.
///
/// Returns an empty string unless `url` starts with `http://` or `https://`
/// and is at least 8 bytes long.
pub fn get_queryless_url(url: &str) -> String {
    if !has_http_scheme(url) {
        return String::new();
    }
    match find_after_scheme(url, b'?') {
        Some(end) => url[..end].to_string(),
        None => url.to_string(),
    }
}

/// `url` truncated to scheme, host and port.
///
/// Cuts at whichever of the first `/` or `?` after the scheme comes first.
pub fn get_base_url(url: &str) -> String {
    if !has_http_scheme(url) {
        return String::new();
    }
    let slash = find_after_scheme(url, b'/');
    let query = find_after_scheme(url, b'?');
    let end = match (slash, query) {
        (Some(s), Some(q)) => Some(s.min(q)),
        (s, q) => s.or(q),
    };
    match end {
        Some(end) => url[..end].to_string(),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(is_valid_url("http://localhost:8080/a?b=1"));
        assert!(is_valid_url("http://localhost"));
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("https://example.com/"));
        assert!(is_valid_url("http://www.example.museum/~alice/"));
        assert!(is_valid_url("http://alice.myopenid.com/"));
        assert!(is_valid_url("http://199.194.52.184:80/server"));
        assert!(is_valid_url("https://idp.example.com/openid?mode=x&y=%20#frag"));
        assert!(is_valid_url("http://Example.COM/Users/Bob"));
    }

    #[test]
    fn test_invalid_urls() {
        assert!(!is_valid_url("javascript:alert(1)"));
        assert!(!is_valid_url("http://256.256.256.256"));
        assert!(!is_valid_url("ftp://example.com/"));
        assert!(!is_valid_url("http://example"));
        assert!(!is_valid_url("http://example.toolongtld"));
        assert!(!is_valid_url("http://localhost:123456"));
        assert!(!is_valid_url("http://example.com/a b"));
        assert!(!is_valid_url("http://example.com/<script>"));
        assert!(!is_valid_url("http://example.com/\r\nSet-Cookie:x=y"));
        assert!(!is_valid_url("http://example.com/\n"));
        assert!(!is_valid_url(" http://example.com"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com").is_ok());
        assert_eq!(
            validate_url("nope"),
            Err(InvalidUrlError("nope".to_string()))
        );
    }

    #[test]
    fn test_queryless_url() {
        assert_eq!(get_queryless_url("http://a.com/x?y=1"), "http://a.com/x");
        assert_eq!(get_queryless_url("http://a.com/x"), "http://a.com/x");
        assert_eq!(get_queryless_url("https://a.com?q"), "https://a.com");
        assert_eq!(get_queryless_url("ftp://a.com"), "");
        assert_eq!(get_queryless_url("http://"), "");
        assert_eq!(get_queryless_url("x http://a.com?q"), "");
    }

    #[test]
    fn test_base_url() {
        assert_eq!(get_base_url("http://a.com/x/y?z=1"), "http://a.com");
        assert_eq!(get_base_url("http://a.com?z=1"), "http://a.com");
        assert_eq!(get_base_url("http://a.com?z=/1"), "http://a.com");
        assert_eq!(get_base_url("https://a.com:8443/x"), "https://a.com:8443");
        assert_eq!(get_base_url("https://a.com"), "https://a.com");
        assert_eq!(get_base_url("mailto:someone"), "");
    }

    #[test]
    fn test_multibyte_host() {
        assert_eq!(get_base_url("http://bü.de/x"), "http://bü.de");
        assert_eq!(get_queryless_url("http://ü?x"), "http://ü");
    }
}
