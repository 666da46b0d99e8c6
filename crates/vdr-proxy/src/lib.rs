//! Driver-routing proxy for the verifiable data registry.
//!
//! [`VdrProxy`] is the caller-facing [`Vdr`] implementation. It owns a
//! [`UrlManager`](vdr_url::UrlManager) and an ordered list of
//! [`Driver`](vdr_driver::Driver)s, and for each call it:
//!
//! 1. picks a driver from the `drid`/`drf` metadata (caller options on
//!    create, the locator's query map otherwise),
//! 2. delegates the operation to it,
//! 3. on writes, folds the driver's result and its identity into a locator
//!    string.
//!
//! The proxy keeps no per-call state and never retries. Driver failures are
//! returned unchanged inside [`ProxyError::Driver`].

pub mod error;
pub mod proxy;
pub mod traits;

pub use error::{ProxyError, ProxyResult};
pub use proxy::VdrProxy;
pub use traits::Vdr;
