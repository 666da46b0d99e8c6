/// A block that participates in a hash chain.
pub trait ChainLink {
    /// The block's own hash.
    fn block_hash(&self) -> [u8; 32];
    /// The previous block's hash (None for genesis).
    fn prev_hash(&self) -> Option<[u8; 32]>;
    /// Canonical payload bytes covered by the hash.
    fn payload_bytes(&self) -> Vec<u8>;
}

/// Hash chain integrity verifier.
///
/// A sequence of blocks is valid when every block's `prev_hash` names the
/// block before it and every block hash recomputes from its payload.
pub struct HashChainVerifier;

impl HashChainVerifier {
    /// Verify a chain of blocks, genesis first.
    pub fn verify_chain(blocks: &[impl ChainLink]) -> Result<(), ChainError> {
        let mut expected_prev: Option<[u8; 32]> = None;

        for (index, block) in blocks.iter().enumerate() {
            match (block.prev_hash(), expected_prev) {
                (None, None) => {}
                (Some(_), None) => return Err(ChainError::GenesisHasPrevHash),
                (None, Some(_)) => return Err(ChainError::MissingPrevHash { index }),
                (Some(prev), Some(expected)) if prev != expected => {
                    return Err(ChainError::BrokenLink { index })
                }
                (Some(_), Some(_)) => {}
            }

            let computed = Self::compute_hash(&block.payload_bytes(), block.prev_hash());
            if computed != block.block_hash() {
                return Err(ChainError::HashMismatch { index });
            }
            expected_prev = Some(computed);
        }

        Ok(())
    }

    /// Domain-separated BLAKE3 hash of a payload and its predecessor.
    pub fn compute_hash(payload: &[u8], prev_hash: Option<[u8; 32]>) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"vdr-block-v1:");
        if let Some(prev) = prev_hash {
            hasher.update(&prev);
        }
        hasher.update(payload);
        *hasher.finalize().as_bytes()
    }
}

/// Errors from chain verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("genesis block has a previous hash")]
    GenesisHasPrevHash,

    #[error("broken link at index {index}: prev_hash does not match")]
    BrokenLink { index: usize },

    #[error("missing prev_hash at index {index}")]
    MissingPrevHash { index: usize },

    #[error("hash mismatch at index {index}")]
    HashMismatch { index: usize },
}
