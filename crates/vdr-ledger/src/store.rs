//! On-disk journal backing a persistent ledger.
//!
//! One sled tree holds three key spaces:
//!
//! - `b/<height be>`: JSON-encoded [`Block`]
//! - `i/<fragment>`: anchoring height (8 bytes, big-endian) followed by the payload
//! - `meta/signing-key`: the Ed25519 seed
//!
//! A block and the item row it touches are written in one batch.

use std::path::Path;

use vdr_driver::{DriverError, DriverResult};

use crate::block::Block;

const BLOCK_PREFIX: &[u8] = b"b/";
const ITEM_PREFIX: &[u8] = b"i/";
const SEED_KEY: &[u8] = b"meta/signing-key";

fn db_err(e: sled::Error) -> DriverError {
    DriverError::backend(e)
}

fn block_key(height: u64) -> Vec<u8> {
    [BLOCK_PREFIX, &height.to_be_bytes()].concat()
}

fn item_key(fragment: &str) -> Vec<u8> {
    [ITEM_PREFIX, fragment.as_bytes()].concat()
}

/// A stored item as read back from the journal.
pub(crate) struct StoredItem {
    pub fragment: String,
    pub height: u64,
    pub data: Vec<u8>,
}

pub(crate) struct LedgerStore {
    db: sled::Db,
}

impl LedgerStore {
    pub fn open(path: &Path) -> DriverResult<Self> {
        let db = sled::open(path).map_err(db_err)?;
        Ok(Self { db })
    }

    /// Every block, genesis first.
    pub fn blocks(&self) -> DriverResult<Vec<Block>> {
        self.db
            .scan_prefix(BLOCK_PREFIX)
            .values()
            .map(|value| {
                let value = value.map_err(db_err)?;
                serde_json::from_slice(&value).map_err(DriverError::backend)
            })
            .collect()
    }

    pub fn items(&self) -> DriverResult<Vec<StoredItem>> {
        self.db
            .scan_prefix(ITEM_PREFIX)
            .map(|entry| {
                let (key, value) = entry.map_err(db_err)?;
                let fragment = String::from_utf8(key[ITEM_PREFIX.len()..].to_vec())
                    .map_err(DriverError::backend)?;
                if value.len() < 8 {
                    return Err(DriverError::Integrity(format!(
                        "truncated journal row for {fragment}"
                    )));
                }
                let (height, data) = value.split_at(8);
                let height = <[u8; 8]>::try_from(height).map_err(DriverError::backend)?;
                Ok(StoredItem {
                    fragment,
                    height: u64::from_be_bytes(height),
                    data: data.to_vec(),
                })
            })
            .collect()
    }

    pub fn seed(&self) -> DriverResult<Option<[u8; 32]>> {
        let Some(raw) = self.db.get(SEED_KEY).map_err(db_err)? else {
            return Ok(None);
        };
        <[u8; 32]>::try_from(raw.as_ref()).map(Some).map_err(|_| {
            DriverError::Integrity(format!("stored signing key is {} bytes", raw.len()))
        })
    }

    pub fn store_seed(&self, seed: &[u8; 32]) -> DriverResult<()> {
        self.db.insert(SEED_KEY, &seed[..]).map_err(db_err)?;
        self.db.flush().map_err(db_err)?;
        Ok(())
    }

    /// Persist `block` together with the item it writes (`Some`) or deletes (`None`).
    pub fn record(&self, block: &Block, data: Option<&[u8]>) -> DriverResult<()> {
        let encoded = serde_json::to_vec(block).map_err(DriverError::backend)?;
        let mut batch = sled::Batch::default();
        batch.insert(block_key(block.height), encoded);
        match data {
            Some(data) => {
                let mut row = block.height.to_be_bytes().to_vec();
                row.extend_from_slice(data);
                batch.insert(item_key(&block.key), row);
            }
            None => batch.remove(item_key(&block.key)),
        }
        self.db.apply_batch(batch).map_err(db_err)?;
        self.db.flush().map_err(db_err)?;
        Ok(())
    }
}
