//! Locator parsing on top of `url::Url`, shared by the URL managers.

use url::Url;
use vdr_types::reserved::public_key_param;
use vdr_types::{PublicKey, Queries};

use crate::error::{UrlError, UrlResult};

/// Parse `text` as an absolute URL.
///
/// Whitespace and control characters are rejected up front; the URL parser
/// would otherwise strip or percent-encode them silently.
pub(crate) fn parse_url(text: &str) -> UrlResult<Url> {
    if text.is_empty() {
        return Err(UrlError::Empty);
    }
    if let Some((position, character)) = text
        .char_indices()
        .find(|(_, c)| c.is_whitespace() || c.is_control())
    {
        return Err(UrlError::InvalidCharacter {
            character,
            position,
        });
    }
    Url::parse(text).map_err(|source| UrlError::Malformed {
        url: text.to_string(),
        source,
    })
}

/// Non-empty `/`-delimited components of the path of `url`.
pub(crate) fn path_segments(url: &Url) -> Vec<String> {
    match url.path_segments() {
        Some(segments) => segments
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        // opaque path, e.g. `urn:isbn:123`
        None => Some(url.path())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .into_iter()
            .collect(),
    }
}

/// Parse `k1=v1&k2=v2`. A key without `=` maps to `""`; later duplicates win.
pub(crate) fn parse_query(query: &str) -> UrlResult<Queries> {
    let mut queries = Queries::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key.is_empty() {
            return Err(UrlError::InvalidQuery(pair.to_string()));
        }
        queries.insert(key.to_string(), value.to_string());
    }
    Ok(queries)
}

/// Render queries as `k1=v1&k2=v2` in key order.
pub(crate) fn query_string(queries: &Queries) -> String {
    queries
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode the `pk1`, `pk2`, ... entries of a query map.
///
/// Reading stops at the first missing index. Returns `None` when there is no
/// `pk1`.
pub fn public_keys_from_queries(queries: &Queries) -> UrlResult<Option<Vec<PublicKey>>> {
    let mut keys = Vec::new();
    loop {
        let key = public_key_param(keys.len());
        let Some(encoded) = queries.get(&key) else {
            break;
        };
        let decoded = PublicKey::from_base64url(encoded).map_err(|e| UrlError::InvalidPublicKey {
            key,
            reason: e.to_string(),
        })?;
        keys.push(decoded);
    }
    Ok((!keys.is_empty()).then_some(keys))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_http_url() {
        let url = parse_url("http://localhost/api/v1?a=1#frag").unwrap();
        assert_eq!(path_segments(&url), vec!["api", "v1"]);
        assert_eq!(url.query(), Some("a=1"));
        assert_eq!(url.fragment(), Some("frag"));
    }

    #[test]
    fn parses_custom_scheme_with_empty_authority() {
        let url = parse_url("vdr:///resources?foo=bar#hello").unwrap();
        assert_eq!(url.scheme(), "vdr");
        assert_eq!(path_segments(&url), vec!["resources"]);
    }

    #[test]
    fn opaque_path_is_one_segment() {
        let url = parse_url("urn:isbn:123?x=1").unwrap();
        assert_eq!(path_segments(&url), vec!["isbn:123"]);
    }

    #[test]
    fn question_mark_in_fragment_is_not_a_query() {
        let url = parse_url("vdr:/a#b?c").unwrap();
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), Some("b?c"));
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert_eq!(parse_url(""), Err(UrlError::Empty));
        assert_eq!(
            parse_url("http://local host/"),
            Err(UrlError::InvalidCharacter {
                character: ' ',
                position: 12
            })
        );
        assert!(parse_url("http://h/\n").is_err());
    }

    #[test]
    fn rejects_relative_and_bad_scheme() {
        for text in ["items/abc?x=1", "1http://x/", ":nothing"] {
            assert!(
                matches!(parse_url(text), Err(UrlError::Malformed { .. })),
                "{text}"
            );
        }
    }

    #[test]
    fn empty_path_segments_are_dropped() {
        let url = parse_url("vdr://h//a///b/").unwrap();
        assert_eq!(path_segments(&url), vec!["a", "b"]);
        assert!(path_segments(&parse_url("http://localhost/").unwrap()).is_empty());
    }

    #[test]
    fn query_parsing() {
        let q = parse_query("a=1&flag&b=x=y&&a=2").unwrap();
        assert_eq!(q.get("a").map(String::as_str), Some("2"));
        assert_eq!(q.get("flag").map(String::as_str), Some(""));
        assert_eq!(q.get("b").map(String::as_str), Some("x=y"));
        assert_eq!(q.len(), 3);
        assert!(matches!(parse_query("=v"), Err(UrlError::InvalidQuery(_))));
    }

    #[test]
    fn public_keys_are_read_contiguously() {
        let k1 = PublicKey::from_bytes(vec![1, 2, 3]);
        let k2 = PublicKey::from_bytes(vec![4, 5]);
        let mut q = Queries::new();
        q.insert("pk1".into(), k1.to_base64url());
        q.insert("pk2".into(), k2.to_base64url());
        q.insert("pk4".into(), k1.to_base64url());
        assert_eq!(public_keys_from_queries(&q).unwrap(), Some(vec![k1, k2]));
    }

    #[test]
    fn public_keys_absent_or_invalid() {
        assert_eq!(public_keys_from_queries(&Queries::new()).unwrap(), None);
        let mut q = Queries::new();
        q.insert("pk1".into(), "***".into());
        assert!(matches!(
            public_keys_from_queries(&q),
            Err(UrlError::InvalidPublicKey { .. })
        ));
    }
}
