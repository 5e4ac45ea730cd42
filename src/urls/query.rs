//! Query string parsing, rebuilding and percent-decoding.

use std::collections::BTreeMap;

use crate::error::DecodeError;

/// Decoded query parameters. Key order carries no meaning.
pub type Params = BTreeMap<String, String>;

/// Prefix of parameters reserved by the OpenID protocol.
pub const OPENID_PREFIX: &str = "openid.";

/// Percent-decode `s`.
///
/// Every `%` must be followed by two hex digits and the decoded bytes must
/// be UTF-8. `+` is left as is.
pub fn url_decode(s: &str) -> Result<String, DecodeError> {
    let bytes = s.as_bytes();
    for (offset, _) in s.match_indices('%') {
        let well_formed = bytes
            .get(offset + 1..offset + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(DecodeError::MalformedEscape { offset });
        }
    }
    urlencoding::decode(s)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DecodeError::InvalidUtf8)
}

/// Parse a query string into parameters.
///
/// Pieces without `=`, or whose only `=` is the last character, are skipped.
/// The first `=` splits key from value. Later duplicates win.
pub fn parse_query_string(s: &str) -> Result<Params, DecodeError> {
    let mut params = Params::new();
    for piece in s.split('&').filter(|piece| !piece.is_empty()) {
        let Some((key, value)) = piece.split_once('=') else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        params.insert(url_decode(key)?, url_decode(value)?);
    }
    Ok(params)
}

/// Serialize parameters back into a percent-encoded query string.
pub fn build_query_string(params: &Params) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Copy of `params` without any `openid.`-prefixed keys.
pub fn remove_openid_vars(params: &Params) -> Params {
    params
        .iter()
        .filter(|(key, _)| !key.starts_with(OPENID_PREFIX))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("a%20b").unwrap(), "a b");
        assert_eq!(url_decode("http%3A%2F%2Fa.com%2F").unwrap(), "http://a.com/");
        assert_eq!(url_decode("a+b").unwrap(), "a+b");
        assert_eq!(url_decode("%C3%BC").unwrap(), "ü");
        assert_eq!(url_decode("").unwrap(), "");
    }

    #[test]
    fn test_url_decode_malformed() {
        assert_eq!(
            url_decode("100%"),
            Err(DecodeError::MalformedEscape { offset: 3 })
        );
        assert_eq!(
            url_decode("a%zzb"),
            Err(DecodeError::MalformedEscape { offset: 1 })
        );
        assert_eq!(
            url_decode("%4"),
            Err(DecodeError::MalformedEscape { offset: 0 })
        );
        assert_eq!(url_decode("%ff"), Err(DecodeError::InvalidUtf8));
    }

    #[test]
    fn test_parse_last_wins() {
        assert_eq!(
            parse_query_string("a=1&b=2&a=3").unwrap(),
            params(&[("a", "3"), ("b", "2")])
        );
    }

    #[test]
    fn test_parse_skips_incomplete_pieces() {
        assert!(parse_query_string("a&b=").unwrap().is_empty());
        assert!(parse_query_string("").unwrap().is_empty());
        assert_eq!(
            parse_query_string("&&x=1&&").unwrap(),
            params(&[("x", "1")])
        );
    }

    #[test]
    fn test_parse_splits_on_first_equals() {
        assert_eq!(
            parse_query_string("return_to=http%3A%2F%2Fa.com%2F%3Fx%3D1&k=a=b").unwrap(),
            params(&[("return_to", "http://a.com/?x=1"), ("k", "a=b")])
        );
    }

    #[test]
    fn test_parse_propagates_decode_errors() {
        assert_eq!(
            parse_query_string("ok=1&bad=%G0"),
            Err(DecodeError::MalformedEscape { offset: 0 })
        );
    }

    #[test]
    fn test_build_query_string() {
        let p = params(&[("b", "x y"), ("a", "http://a.com/?q=1")]);
        let built = build_query_string(&p);
        assert_eq!(built, "a=http%3A%2F%2Fa.com%2F%3Fq%3D1&b=x%20y");
        assert_eq!(parse_query_string(&built).unwrap(), p);
        assert_eq!(build_query_string(&Params::new()), "");
    }

    #[test]
    fn test_remove_openid_vars() {
        let input = params(&[("openid.mode", "x"), ("foo", "bar")]);
        assert_eq!(remove_openid_vars(&input), params(&[("foo", "bar")]));

        let mixed = params(&[
            ("openid.identity", "http://a.com/"),
            ("openid.sig", "abc"),
            ("openid", "kept"),
            ("openidx", "kept"),
            ("modauth", "kept"),
        ]);
        let stripped = remove_openid_vars(&mixed);
        assert_eq!(stripped.len(), 3);
        assert!(stripped.keys().all(|k| !k.starts_with(OPENID_PREFIX)));
        assert_eq!(mixed.len(), 5);
    }
}
