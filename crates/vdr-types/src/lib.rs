//! Foundation types for the verifiable data registry (VDR).
//!
//! Every other VDR crate depends on `vdr-types`. The types here are the
//! vocabulary shared by drivers, URL managers, and the routing proxy.
//!
//! # Key Types
//!
//! - [`Locator`]: Structured form of a locator URL: paths, queries, fragment, keys
//! - [`OperationResult`]: What a driver reports after a create or update
//! - [`OperationId`]: UUID v7 identifier of a single write operation
//! - [`OperationState`]: `Running`, `Success`, or `Error`
//! - [`Proof`]: Tamper-evidence returned by `verify`
//! - [`PublicKey`]: Encoded public key bytes carried inside locators
//! - [`Options`]: Caller-supplied loosely typed metadata
//!
//! The [`reserved`] module fixes the query keys the proxy owns on the wire.

pub mod encoding;
pub mod error;
pub mod key;
pub mod locator;
pub mod operation;
pub mod options;
pub mod proof;
pub mod reserved;

pub use error::TypeError;
pub use key::PublicKey;
pub use locator::{Locator, Queries};
pub use operation::{OperationId, OperationResult, OperationState};
pub use options::Options;
pub use proof::Proof;
