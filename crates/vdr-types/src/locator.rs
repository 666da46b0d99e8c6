use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::key::PublicKey;

/// Query parameters of a locator.
///
/// Keys are unique and kept sorted, so the textual form a URL manager builds
/// from the same components is always identical.
pub type Queries = BTreeMap<String, String>;

/// Structured form of a locator URL.
///
/// This is what a URL manager encodes into, and decodes out of, the opaque
/// string handed to callers. Drivers receive it on read, update, delete, and
/// verify and use whichever parts they need, usually just the fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    /// Ordered, non-empty path segments.
    pub paths: Vec<String>,
    /// Query parameters, driver hints plus reserved keys.
    pub queries: Queries,
    /// The driver's primary key for the item, if any.
    pub fragment: Option<String>,
    /// Public keys relevant to the item. Not reconstructed by generic resolvers.
    pub public_keys: Option<Vec<PublicKey>>,
}

impl Locator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.queries.insert(key.into(), value.into());
        self
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn with_public_keys(mut self, keys: Vec<PublicKey>) -> Self {
        self.public_keys = Some(keys);
        self
    }

    /// Look up a query value.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.queries.get(key).map(String::as_str)
    }

    /// The fragment, treating an empty fragment as absent.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref().filter(|f| !f.is_empty())
    }
}
