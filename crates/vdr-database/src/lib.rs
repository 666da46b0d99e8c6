//! Database storage drivers for the verifiable data registry.
//!
//! - [`SqlDriver`] keeps payloads in a SQLite `storage(id, data)` table
//!   through an sqlx pool.
//! - [`DatabaseDriver`] persists payloads in a single embedded `sled` tree.
//!
//! Both key rows by a random UUID and report family `"database"`. Writes are
//! synchronous, so every operation reports `SUCCESS` or fails outright.

pub mod config;
pub mod driver;
pub mod sql;

pub use config::{DatabaseConfig, SqlConfig};
pub use driver::DatabaseDriver;
pub use sql::SqlDriver;
