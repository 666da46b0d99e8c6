//! Locator URL codec for the verifiable data registry.
//!
//! A [`UrlManager`] turns a structured [`Locator`](vdr_types::Locator) into
//! the opaque string handed to callers and parses such strings back. The
//! syntax stays close to plain URI grammar:
//!
//! ```text
//! <base>/<seg>/<seg>?<k1>=<v1>&<k2>=<v2>#<fragment>
//! ```
//!
//! so a locator under an HTTP base doubles as an openable web address,
//! while custom schemes such as `vdr:///items` work the same way.
//!
//! Public keys are written as `pk1`, `pk2`, ... query entries (base64url,
//! no padding). `resolve` leaves them in the query map; use
//! [`public_keys_from_queries`] when the key material is needed.

pub mod base;
pub mod error;
pub mod parse;
pub mod traits;

pub use base::BaseUrlManager;
pub use error::{UrlError, UrlResult};
pub use parse::public_keys_from_queries;
pub use traits::UrlManager;
