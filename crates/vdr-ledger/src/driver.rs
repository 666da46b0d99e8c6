use std::collections::HashMap;
use std::sync::RwLock;

use tracing::{debug, info};
use vdr_crypto::{ContentDigest, HashChainVerifier, Signature, SigningKey, VerifyingKey};
use vdr_driver::{require_fragment, Driver, DriverError, DriverResult, CONTENT_HASH_KEY};
use vdr_types::reserved::public_key_param;
use vdr_types::{
    Locator, OperationId, OperationResult, OperationState, Options, Proof, PublicKey,
};

use crate::block::{Block, BlockEntry};
use crate::config::LedgerConfig;
use crate::store::LedgerStore;

/// Locator hint carrying the height of the block that anchored the write.
pub const BLOCK_HEIGHT_KEY: &str = "blk";

const PROOF_DOMAIN: &[u8] = b"vdr-ledger-proof-v1:";

/// Driver anchoring payloads in an append-only hash-chained ledger.
pub struct LedgerDriver {
    identifier: String,
    version: String,
    supported_versions: Vec<String>,
    finality_depth: u64,
    signing_key: SigningKey,
    public_key: PublicKey,
    store: Option<LedgerStore>,
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    blocks: Vec<Block>,
    items: HashMap<String, Anchored>,
    /// Anchoring height per write made by this instance. Grows by one entry
    /// per write for the life of the driver and is not journaled, so ids
    /// issued before a restart are unknown.
    operations: HashMap<OperationId, u64>,
}

struct Anchored {
    data: Vec<u8>,
    height: u64,
}

impl LedgerState {
    fn tip(&self) -> u64 {
        self.blocks.len() as u64
    }

    fn next_block(&self, key: &str, entry: BlockEntry) -> Block {
        let prev = self.blocks.last().map(|b| b.hash);
        Block::seal(self.tip() + 1, prev, key.to_string(), entry)
    }

    /// Rebuild from the journal, re-verifying the chain.
    fn restore(store: &LedgerStore) -> DriverResult<Self> {
        let blocks = store.blocks()?;
        HashChainVerifier::verify_chain(&blocks)
            .map_err(|e| DriverError::Integrity(e.to_string()))?;
        let tip = blocks.len() as u64;
        let mut items = HashMap::new();
        for item in store.items()? {
            if item.height == 0 || item.height > tip {
                return Err(DriverError::Integrity(format!(
                    "item {} anchored at missing block {}",
                    item.fragment, item.height
                )));
            }
            items.insert(
                item.fragment,
                Anchored {
                    data: item.data,
                    height: item.height,
                },
            );
        }
        Ok(Self {
            blocks,
            items,
            operations: HashMap::new(),
        })
    }
}

impl LedgerDriver {
    /// Family reported by every ledger driver.
    pub const FAMILY: &'static str = "blockchain";

    /// Open the ledger described by `config`.
    ///
    /// Without a `path` the chain lives in memory. The signing key is the
    /// configured seed, else the journaled one, else freshly generated (and
    /// journaled when persistent).
    pub fn open(
        identifier: impl Into<String>,
        version: impl Into<String>,
        config: &LedgerConfig,
    ) -> DriverResult<Self> {
        let store = config.path.as_deref().map(LedgerStore::open).transpose()?;
        let seed = match (config.signing_seed()?, &store) {
            (Some(seed), _) => seed,
            (None, Some(store)) => match store.seed()? {
                Some(seed) => seed,
                None => {
                    let seed = SigningKey::generate().to_bytes();
                    store.store_seed(&seed)?;
                    seed
                }
            },
            (None, None) => SigningKey::generate().to_bytes(),
        };
        let state = match &store {
            Some(store) => LedgerState::restore(store)?,
            None => LedgerState::default(),
        };

        let identifier = identifier.into();
        let version = version.into();
        let signing_key = SigningKey::from_bytes(seed);
        let public_key = signing_key.verifying_key().to_public_key();
        info!(
            driver = %identifier,
            finality_depth = config.finality_depth,
            path = ?config.path,
            height = state.tip(),
            key = %public_key.to_base64url(),
            "ledger driver opened"
        );
        Ok(Self {
            identifier,
            supported_versions: vec![version.clone()],
            version,
            finality_depth: config.finality_depth,
            signing_key,
            public_key,
            store,
            inner: RwLock::new(state),
        })
    }

    /// Replace the set of supported locator versions.
    pub fn with_supported_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_versions = versions.into_iter().map(Into::into).collect();
        self
    }

    /// The key that verifies this ledger's proofs.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Height of the newest block (0 for an empty ledger).
    pub fn height(&self) -> u64 {
        self.inner.read().expect("lock poisoned").tip()
    }

    /// Snapshot of the chain, genesis first.
    pub fn blocks(&self) -> Vec<Block> {
        self.inner.read().expect("lock poisoned").blocks.clone()
    }

    /// Re-derive every block hash and link.
    pub fn verify_chain(&self) -> DriverResult<()> {
        let state = self.inner.read().expect("lock poisoned");
        HashChainVerifier::verify_chain(&state.blocks)
            .map_err(|e| DriverError::Integrity(e.to_string()))
    }

    /// Check a proof produced by [`Driver::verify`] against `data`.
    ///
    /// Returns the block height the proof attests to.
    pub fn check_proof(public_key: &PublicKey, proof: &Proof, data: &[u8]) -> DriverResult<u64> {
        if proof.kind != Proof::ED25519 || proof.proof.len() != 8 + 64 {
            return Err(DriverError::Integrity(format!(
                "not a ledger proof: {} ({} bytes)",
                proof.kind,
                proof.proof.len()
            )));
        }
        let (height_bytes, sig_bytes) = proof.proof.split_at(8);
        let mut height = [0u8; 8];
        height.copy_from_slice(height_bytes);
        let height = u64::from_be_bytes(height);

        let key = VerifyingKey::from_public_key(public_key)
            .map_err(|e| DriverError::Integrity(e.to_string()))?;
        let signature =
            Signature::from_slice(sig_bytes).map_err(|e| DriverError::Integrity(e.to_string()))?;
        key.verify(&proof_message(&ContentDigest::of(data), height), &signature)
            .map_err(|e| DriverError::Integrity(e.to_string()))?;
        Ok(height)
    }

    /// Seal the next block, journal it, then apply it to `state`.
    ///
    /// `data` is the new payload of `key`, or `None` for a tombstone.
    fn commit(&self, state: &mut LedgerState, key: &str, data: Option<&[u8]>) -> DriverResult<u64> {
        let entry = match data {
            Some(data) => BlockEntry::Put {
                digest: *ContentDigest::of(data).as_bytes(),
            },
            None => BlockEntry::Tombstone,
        };
        let block = state.next_block(key, entry);
        if let Some(store) = &self.store {
            store.record(&block, data)?;
        }

        let height = block.height;
        state.blocks.push(block);
        match data {
            Some(data) => {
                let anchored = Anchored {
                    data: data.to_vec(),
                    height,
                };
                state.items.insert(key.to_string(), anchored);
            }
            None => {
                state.items.remove(key);
            }
        }
        Ok(height)
    }

    fn written(&self, fragment: String, data: &[u8], height: u64) -> OperationResult {
        let state = if self.finality_depth == 0 {
            OperationState::Success
        } else {
            OperationState::Running
        };
        OperationResult::success(fragment)
            .with_state(state)
            .with_query(CONTENT_HASH_KEY, ContentDigest::of(data).to_base64url())
            .with_query(BLOCK_HEIGHT_KEY, height.to_string())
            .with_public_keys(vec![self.public_key.clone()])
    }

    /// Reject locators naming a different signing key than this ledger's.
    fn check_locator_key(&self, target: &Locator) -> DriverResult<()> {
        let named = match &target.public_keys {
            Some(keys) => keys.first().cloned(),
            None => target
                .query(&public_key_param(0))
                .map(PublicKey::from_base64url)
                .transpose()
                .map_err(|e| DriverError::Integrity(e.to_string()))?,
        };
        match named {
            Some(key) if key != self.public_key => Err(DriverError::Integrity(format!(
                "locator key {} does not belong to ledger {}",
                key.to_base64url(),
                self.identifier
            ))),
            _ => Ok(()),
        }
    }
}

fn proof_message(digest: &ContentDigest, height: u64) -> Vec<u8> {
    let mut message = Vec::with_capacity(PROOF_DOMAIN.len() + 32 + 8);
    message.extend_from_slice(PROOF_DOMAIN);
    message.extend_from_slice(digest.as_bytes());
    message.extend_from_slice(&height.to_be_bytes());
    message
}

impl Driver for LedgerDriver {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn family(&self) -> &str {
        Self::FAMILY
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn supported_versions(&self) -> &[String] {
        &self.supported_versions
    }

    fn create(&self, data: &[u8], _options: &Options) -> DriverResult<OperationResult> {
        let mut state = self.inner.write().expect("lock poisoned");
        let fragment = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            if !state.items.contains_key(&candidate) {
                break candidate;
            }
        };
        let height = self.commit(&mut state, &fragment, Some(data))?;

        let result = self.written(fragment, data, height);
        state.operations.insert(result.operation_id.clone(), height);
        debug!(driver = %self.identifier, height, op = %result.operation_id, "anchored new item");
        Ok(result)
    }

    fn update(
        &self,
        data: &[u8],
        target: &Locator,
        _options: &Options,
    ) -> DriverResult<OperationResult> {
        let fragment = require_fragment(target)?;
        let mut state = self.inner.write().expect("lock poisoned");
        if !state.items.contains_key(fragment) {
            return Err(DriverError::not_found(Some(fragment)));
        }
        let height = self.commit(&mut state, fragment, Some(data))?;

        let result = self.written(fragment.to_string(), data, height);
        state.operations.insert(result.operation_id.clone(), height);
        debug!(driver = %self.identifier, height, op = %result.operation_id, "anchored update");
        Ok(result)
    }

    fn read(&self, target: &Locator) -> DriverResult<Vec<u8>> {
        let fragment = require_fragment(target)?;
        let state = self.inner.read().expect("lock poisoned");
        state
            .items
            .get(fragment)
            .map(|item| item.data.clone())
            .ok_or_else(|| DriverError::not_found(Some(fragment)))
    }

    fn delete(&self, target: &Locator, _options: &Options) -> DriverResult<()> {
        let fragment = require_fragment(target)?;
        let mut state = self.inner.write().expect("lock poisoned");
        if !state.items.contains_key(fragment) {
            return Err(DriverError::not_found(Some(fragment)));
        }
        let height = self.commit(&mut state, fragment, None)?;
        debug!(driver = %self.identifier, height, %fragment, "anchored tombstone");
        Ok(())
    }

    fn verify(&self, target: &Locator, return_data: bool) -> DriverResult<Proof> {
        let fragment = require_fragment(target)?;
        self.check_locator_key(target)?;
        let (data, height) = {
            let state = self.inner.read().expect("lock poisoned");
            let item = state
                .items
                .get(fragment)
                .ok_or_else(|| DriverError::not_found(Some(fragment)))?;
            (item.data.clone(), item.height)
        };

        let signature = self
            .signing_key
            .sign(&proof_message(&ContentDigest::of(&data), height));
        let mut evidence = Vec::with_capacity(8 + 64);
        evidence.extend_from_slice(&height.to_be_bytes());
        evidence.extend_from_slice(&signature.to_bytes());
        Ok(Proof::new(Proof::ED25519, evidence).with_data(data, return_data))
    }

    fn store_result_state(&self, operation_id: &OperationId) -> DriverResult<OperationState> {
        let state = self.inner.read().expect("lock poisoned");
        let height = state
            .operations
            .get(operation_id)
            .copied()
            .ok_or_else(|| DriverError::UnknownOperation(operation_id.to_string()))?;
        if state.tip() - height >= self.finality_depth {
            Ok(OperationState::Success)
        } else {
            Ok(OperationState::Running)
        }
    }
}

impl std::fmt::Debug for LedgerDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerDriver")
            .field("identifier", &self.identifier)
            .field("version", &self.version)
            .field("finality_depth", &self.finality_depth)
            .field("persistent", &self.store.is_some())
            .field("height", &self.height())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> LedgerDriver {
        LedgerDriver::open("chain1", "1.0", &LedgerConfig::default()).unwrap()
    }

    fn at(fragment: &str) -> Locator {
        Locator::new().with_fragment(fragment)
    }

    fn create(driver: &LedgerDriver, data: &[u8]) -> String {
        driver
            .create(data, &Options::new())
            .unwrap()
            .fragment
            .expect("create reports a fragment")
    }

    // -----------------------------------------------------------------------
    // Storage
    // -----------------------------------------------------------------------

    #[test]
    fn create_anchors_block_and_reports_hints() {
        let d = ledger();
        let result = d.create(b"hello", &Options::new()).unwrap();
        assert_eq!(result.state, OperationState::Success);
        assert_eq!(result.queries.get(BLOCK_HEIGHT_KEY).map(String::as_str), Some("1"));
        assert_eq!(
            result.queries.get(CONTENT_HASH_KEY),
            Some(&ContentDigest::of(b"hello").to_base64url())
        );
        assert_eq!(result.public_keys, Some(vec![d.public_key().clone()]));
        assert_eq!(d.height(), 1);
    }

    #[test]
    fn update_and_delete_append_blocks() {
        let d = ledger();
        let fragment = create(&d, b"v1");
        d.update(b"v2", &at(&fragment), &Options::new()).unwrap();
        assert_eq!(d.read(&at(&fragment)).unwrap(), b"v2");
        d.delete(&at(&fragment), &Options::new()).unwrap();
        assert!(d.read(&at(&fragment)).unwrap_err().is_not_found());

        let blocks = d.blocks();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[2].entry, BlockEntry::Tombstone);
        assert!(d.verify_chain().is_ok());
    }

    #[test]
    fn unknown_fragment_is_not_found_and_appends_nothing() {
        let d = ledger();
        assert!(d
            .update(b"x", &at("ghost"), &Options::new())
            .unwrap_err()
            .is_not_found());
        assert!(d
            .delete(&at("ghost"), &Options::new())
            .unwrap_err()
            .is_not_found());
        assert!(d.verify(&at("ghost"), false).unwrap_err().is_not_found());
        assert_eq!(d.height(), 0);
    }

    // -----------------------------------------------------------------------
    // Proofs
    // -----------------------------------------------------------------------

    #[test]
    fn verify_returns_checkable_signature() {
        let d = ledger();
        let fragment = create(&d, b"anchored");
        let proof = d.verify(&at(&fragment), true).unwrap();
        assert_eq!(proof.kind, Proof::ED25519);
        assert_eq!(proof.data.as_deref(), Some(&b"anchored"[..]));
        assert_eq!(
            LedgerDriver::check_proof(d.public_key(), &proof, b"anchored").unwrap(),
            1
        );
    }

    #[test]
    fn proof_attests_latest_height() {
        let d = ledger();
        let fragment = create(&d, b"v1");
        create(&d, b"other");
        d.update(b"v2", &at(&fragment), &Options::new()).unwrap();
        let proof = d.verify(&at(&fragment), false).unwrap();
        assert_eq!(LedgerDriver::check_proof(d.public_key(), &proof, b"v2").unwrap(), 3);
    }

    #[test]
    fn proof_fails_for_other_data_or_key() {
        let d = ledger();
        let fragment = create(&d, b"real");
        let proof = d.verify(&at(&fragment), false).unwrap();
        assert!(LedgerDriver::check_proof(d.public_key(), &proof, b"fake").is_err());

        let stranger = ledger();
        assert!(LedgerDriver::check_proof(stranger.public_key(), &proof, b"real").is_err());
    }

    #[test]
    fn verify_rejects_foreign_locator_key() {
        let d = ledger();
        let fragment = create(&d, b"x");
        let foreign = SigningKey::generate().verifying_key().to_public_key();
        let target = at(&fragment).with_query("pk1", foreign.to_base64url());
        assert!(matches!(
            d.verify(&target, false),
            Err(DriverError::Integrity(_))
        ));

        let own = at(&fragment).with_query("pk1", d.public_key().to_base64url());
        assert!(d.verify(&own, false).is_ok());
    }

    #[test]
    fn configured_seed_is_used() {
        let expected = SigningKey::from_bytes([9; 32]).verifying_key().to_public_key();
        let config = LedgerConfig {
            signing_key: Some(hex::encode([9u8; 32])),
            ..Default::default()
        };
        let d = LedgerDriver::open("c", "1.0", &config).unwrap();
        assert_eq!(d.public_key(), &expected);
    }

    // -----------------------------------------------------------------------
    // Confirmations
    // -----------------------------------------------------------------------

    #[test]
    fn writes_run_until_finality_depth() {
        let config = LedgerConfig {
            finality_depth: 2,
            ..Default::default()
        };
        let d = LedgerDriver::open("c", "1.0", &config).unwrap();
        let first = d.create(b"a", &Options::new()).unwrap();
        assert_eq!(first.state, OperationState::Running);
        assert_eq!(
            d.store_result_state(&first.operation_id).unwrap(),
            OperationState::Running
        );

        create(&d, b"b");
        assert_eq!(
            d.store_result_state(&first.operation_id).unwrap(),
            OperationState::Running
        );

        create(&d, b"c");
        assert_eq!(
            d.store_result_state(&first.operation_id).unwrap(),
            OperationState::Success
        );
    }

    #[test]
    fn unknown_operation_is_an_error() {
        let d = ledger();
        assert!(matches!(
            d.store_result_state(&OperationId::new()),
            Err(DriverError::UnknownOperation(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    #[test]
    fn journaled_ledger_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig::at(dir.path().join("chain"));

        let (kept, gone, key) = {
            let d = LedgerDriver::open("c", "1.0", &config).unwrap();
            let kept = create(&d, b"v1");
            d.update(b"v2", &at(&kept), &Options::new()).unwrap();
            let gone = create(&d, b"temp");
            d.delete(&at(&gone), &Options::new()).unwrap();
            (kept, gone, d.public_key().clone())
        };

        let d = LedgerDriver::open("c", "1.0", &config).unwrap();
        assert_eq!(d.public_key(), &key);
        assert_eq!(d.height(), 4);
        assert!(d.verify_chain().is_ok());
        assert_eq!(d.read(&at(&kept)).unwrap(), b"v2");
        assert!(d.read(&at(&gone)).unwrap_err().is_not_found());

        let own = at(&kept).with_query("pk1", key.to_base64url());
        let proof = d.verify(&own, false).unwrap();
        assert_eq!(LedgerDriver::check_proof(&key, &proof, b"v2").unwrap(), 2);

        create(&d, b"after restart");
        assert_eq!(d.height(), 5);
        assert!(d.verify_chain().is_ok());
    }

    #[test]
    fn operation_ids_do_not_outlive_the_instance() {
        let dir = tempfile::tempdir().unwrap();
        let config = LedgerConfig::at(dir.path().join("chain"));

        let op = {
            let d = LedgerDriver::open("c", "1.0", &config).unwrap();
            let result = d.create(b"x", &Options::new()).unwrap();
            assert_eq!(
                d.store_result_state(&result.operation_id).unwrap(),
                OperationState::Success
            );
            result.operation_id
        };

        let d = LedgerDriver::open("c", "1.0", &config).unwrap();
        assert!(matches!(
            d.store_result_state(&op),
            Err(DriverError::UnknownOperation(_))
        ));
    }

    #[test]
    fn configured_seed_overrides_journaled_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LedgerConfig::at(dir.path().join("chain"));
        let journaled = LedgerDriver::open("c", "1.0", &config)
            .unwrap()
            .public_key()
            .clone();

        config.signing_key = Some(hex::encode([3u8; 32]));
        let seeded = LedgerDriver::open("c", "1.0", &config).unwrap();
        assert_ne!(seeded.public_key(), &journaled);
        assert_eq!(
            seeded.public_key(),
            &SigningKey::from_bytes([3; 32]).verifying_key().to_public_key()
        );
    }

    #[test]
    fn bad_seed_fails_to_open() {
        let config = LedgerConfig {
            signing_key: Some("not hex".into()),
            ..Default::default()
        };
        assert!(matches!(
            LedgerDriver::open("c", "1.0", &config),
            Err(DriverError::Config(_))
        ));
    }

    #[test]
    fn family_is_blockchain() {
        let d = ledger().with_supported_versions(["1.0", "0.9"]);
        assert_eq!(d.family(), "blockchain");
        assert!(d.supports("0.9"));
    }
}
