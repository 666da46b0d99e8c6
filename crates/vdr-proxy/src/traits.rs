use vdr_types::{Options, Proof};

use crate::error::ProxyResult;

/// The caller-facing registry API.
///
/// Every stored item is addressed by an opaque locator string returned from
/// [`create`](Vdr::create).
pub trait Vdr: Send + Sync {
    fn identifier(&self) -> &str;

    fn version(&self) -> &str;

    /// Store `data` and return its locator.
    fn create(&self, data: &[u8], options: &Options) -> ProxyResult<String>;

    /// Replace the payload at `url`.
    ///
    /// Returns the new locator, or `None` when it is textually identical to
    /// `url`.
    fn update(&self, data: &[u8], url: &str, options: &Options) -> ProxyResult<Option<String>>;

    fn read(&self, url: &str) -> ProxyResult<Vec<u8>>;

    fn delete(&self, url: &str, options: &Options) -> ProxyResult<()>;

    /// Tamper-evidence for the payload at `url`, with the payload attached
    /// when `return_data` is set.
    fn verify(&self, url: &str, return_data: bool) -> ProxyResult<Proof>;
}
