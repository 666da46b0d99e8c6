use url::Url;
use vdr_types::reserved::public_key_param;
use vdr_types::Locator;

use crate::error::UrlResult;
use crate::parse::{parse_query, parse_url, path_segments, query_string};
use crate::traits::UrlManager;

/// Builds locators under a fixed base address.
///
/// The base may be an HTTP origin (`https://registry.example`), an origin
/// with a path (`https://registry.example/vdr`), or a custom scheme
/// (`vdr://`). `resolve` accepts any absolute URL; for URLs under the
/// base (same scheme, host and port, and a path starting with the base
/// path), the base's own path segments are dropped from the result.
#[derive(Debug, Clone)]
pub struct BaseUrlManager {
    base: String,
    base_url: Option<Url>,
    base_segments: Vec<String>,
    kind: String,
}

impl BaseUrlManager {
    pub const KIND: &'static str = "BaseURL";
    pub const LOCALHOST_KIND: &'static str = "Localhost";

    pub fn new(base: impl Into<String>) -> Self {
        Self::with_kind(base, Self::KIND)
    }

    /// Manager rooted at `http://localhost`.
    pub fn localhost() -> Self {
        Self::with_kind("http://localhost", Self::LOCALHOST_KIND)
    }

    fn with_kind(base: impl Into<String>, kind: &str) -> Self {
        let mut base = base.into();
        while base.ends_with('/') && !base.ends_with("//") {
            base.pop();
        }
        let base_url = parse_url(&base).ok();
        let base_segments = base_url.as_ref().map(path_segments).unwrap_or_default();
        Self {
            base,
            base_url,
            base_segments,
            kind: kind.to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn is_under_base(&self, url: &Url) -> bool {
        self.base_url.as_ref().is_some_and(|base| {
            base.scheme() == url.scheme()
                && base.host_str() == url.host_str()
                && base.port_or_known_default() == url.port_or_known_default()
        })
    }
}

impl UrlManager for BaseUrlManager {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn create(&self, locator: &Locator) -> String {
        let mut queries = locator.queries.clone();
        if let Some(keys) = &locator.public_keys {
            for (index, key) in keys.iter().enumerate() {
                queries.insert(public_key_param(index), key.to_base64url());
            }
        }

        let mut url = format!(
            "{}/{}?{}",
            self.base,
            locator.paths.join("/"),
            query_string(&queries)
        );
        if let Some(fragment) = locator.fragment() {
            url.push('#');
            url.push_str(fragment);
        }
        url
    }

    fn resolve(&self, url: &str) -> UrlResult<Locator> {
        let parsed = parse_url(url)?;

        let mut paths = path_segments(&parsed);
        if !self.base_segments.is_empty()
            && paths.starts_with(&self.base_segments)
            && self.is_under_base(&parsed)
        {
            paths.drain(..self.base_segments.len());
        }

        let queries = parsed.query().map(parse_query).transpose()?.unwrap_or_default();

        Ok(Locator {
            paths,
            queries,
            fragment: parsed
                .fragment()
                .filter(|f| !f.is_empty())
                .map(str::to_string),
            public_keys: None,
        })
    }
}
