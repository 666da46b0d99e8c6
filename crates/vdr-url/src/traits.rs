use vdr_types::Locator;

use crate::error::UrlResult;

/// Encodes locators into strings and parses them back.
pub trait UrlManager: Send + Sync {
    /// Short name of the manager flavour, e.g. `"BaseURL"`.
    fn kind(&self) -> &str;

    /// Build the locator string for `locator`.
    ///
    /// Public keys are appended as `pkN` query entries; the fragment is only
    /// written when non-empty.
    fn create(&self, locator: &Locator) -> String;

    /// Parse a locator string.
    ///
    /// The returned locator never carries `public_keys`; the `pkN` entries
    /// stay in its query map.
    fn resolve(&self, url: &str) -> UrlResult<Locator>;

    /// Whether [`resolve`](Self::resolve) would accept `url`.
    fn can_resolve(&self, url: &str) -> bool {
        self.resolve(url).is_ok()
    }
}
