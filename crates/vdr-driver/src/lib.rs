//! Storage driver contract for the verifiable data registry.
//!
//! A driver is a storage back-end (in-memory table, embedded database,
//! ledger, ...) exposing create/update/read/delete/verify over opaque byte
//! payloads. The registry proxy is polymorphic over [`Driver`] and never
//! talks to a storage medium directly.
//!
//! # Contract
//!
//! 1. `create` picks a fresh, non-colliding location and reports it as the
//!    fragment of an [`OperationResult`](vdr_types::OperationResult).
//! 2. `update`, `read`, `delete`, and `verify` require a fragment naming an
//!    existing location; anything else is [`DriverError::DataNotFound`].
//! 3. `update` replaces the whole payload. There is no patching.
//! 4. Each call is atomic with respect to itself. Nothing more is promised
//!    across calls.
//!
//! # Drivers in this crate
//!
//! - [`InMemoryDriver`]: `RwLock<HashMap>` table for tests and embedding
//!
//! The database and ledger drivers live in `vdr-database` and `vdr-ledger`.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{DriverError, DriverResult};
pub use memory::InMemoryDriver;
pub use traits::{require_fragment, Driver, DriverDescriptor, CONTENT_HASH_KEY};
