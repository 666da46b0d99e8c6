//! Ledger-anchored storage driver for the verifiable data registry.
//!
//! [`LedgerDriver`] records every write as a block in an append-only,
//! BLAKE3 hash-chained log. Payloads are mutable (updates and deletes append
//! new blocks), so `verify` returns an Ed25519 signature over the payload
//! digest and the height of the block that anchors it, which attests
//! freshness as well as integrity.
//!
//! # Confirmations
//!
//! With a non-zero `finality_depth`, a write stays `RUNNING` until that many
//! further blocks have been appended on top of it. Callers poll
//! `store_result_state` with the operation id.
//!
//! # Persistence
//!
//! With `path` set, blocks, live items and the signing seed are journaled in
//! a sled database and the chain is re-verified on open, so locators (and
//! their `pk1`) stay valid across restarts.
//!
//! # Modules
//!
//! - [`block`]: Block layout and hashing
//! - [`config`]: [`LedgerConfig`]
//! - [`driver`]: [`LedgerDriver`]

pub mod block;
pub mod config;
pub mod driver;
mod store;

pub use block::{Block, BlockEntry};
pub use config::LedgerConfig;
pub use driver::{LedgerDriver, BLOCK_HEIGHT_KEY};
