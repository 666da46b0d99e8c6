use std::fmt;

use serde::{Deserialize, Serialize};
use vdr_crypto::{ChainLink, HashChainVerifier};

/// What a block records about one storage location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockEntry {
    /// The location now holds a payload with this SHA-256 digest.
    Put { digest: [u8; 32] },
    /// The location was deleted.
    Tombstone,
}

/// One entry of the hash-chained ledger.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// 1-based position in the chain.
    pub height: u64,
    pub prev_hash: Option<[u8; 32]>,
    /// Location the entry applies to.
    pub key: String,
    pub entry: BlockEntry,
    pub hash: [u8; 32],
}

impl Block {
    /// Build and seal a block on top of `prev_hash`.
    pub fn seal(height: u64, prev_hash: Option<[u8; 32]>, key: String, entry: BlockEntry) -> Self {
        let mut block = Self {
            height,
            prev_hash,
            key,
            entry,
            hash: [0; 32],
        };
        block.hash = HashChainVerifier::compute_hash(&block.payload_bytes(), prev_hash);
        block
    }
}

impl ChainLink for Block {
    fn block_hash(&self) -> [u8; 32] {
        self.hash
    }

    fn prev_hash(&self) -> Option<[u8; 32]> {
        self.prev_hash
    }

    fn payload_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + 4 + self.key.len() + 33);
        out.extend_from_slice(&self.height.to_be_bytes());
        out.extend_from_slice(&(self.key.len() as u32).to_be_bytes());
        out.extend_from_slice(self.key.as_bytes());
        match &self.entry {
            BlockEntry::Put { digest } => {
                out.push(1);
                out.extend_from_slice(digest);
            }
            BlockEntry::Tombstone => out.push(0),
        }
        out
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("height", &self.height)
            .field("key", &self.key)
            .field("entry", &self.entry)
            .field("hash", &hex::encode(&self.hash[..4]))
            .finish()
    }
}
