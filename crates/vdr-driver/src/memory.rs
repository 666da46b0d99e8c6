use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;
use vdr_crypto::ContentDigest;
use vdr_types::{Locator, OperationResult, Options};

use crate::error::{DriverError, DriverResult};
use crate::traits::{require_fragment, Driver, CONTENT_HASH_KEY};

/// In-memory, HashMap-based driver.
///
/// Intended for tests and embedding. Payloads live behind a `RwLock`, so
/// concurrent creates never lose data. Locations are random UUID v4 strings.
pub struct InMemoryDriver {
    identifier: String,
    family: String,
    version: String,
    supported_versions: Vec<String>,
    storage: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryDriver {
    /// Family name conventionally used for in-memory drivers.
    pub const FAMILY: &'static str = "memory";

    /// Create an empty driver that supports only its own version.
    pub fn new(
        identifier: impl Into<String>,
        family: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let version = version.into();
        Self {
            identifier: identifier.into(),
            family: family.into(),
            supported_versions: vec![version.clone()],
            version,
            storage: RwLock::new(HashMap::new()),
        }
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

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.storage.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.read().expect("lock poisoned").is_empty()
    }

    /// Returns `true` if an item is stored under `fragment`.
    pub fn contains(&self, fragment: &str) -> bool {
        self.storage
            .read()
            .expect("lock poisoned")
            .contains_key(fragment)
    }

    /// Store `data` under a caller-chosen location, bypassing `create`.
    pub fn insert(&self, fragment: impl Into<String>, data: Vec<u8>) {
        self.storage
            .write()
            .expect("lock poisoned")
            .insert(fragment.into(), data);
    }

    fn written(fragment: String, data: &[u8]) -> OperationResult {
        OperationResult::success(fragment)
            .with_query(CONTENT_HASH_KEY, ContentDigest::of(data).to_base64url())
    }
}

impl Driver for InMemoryDriver {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn family(&self) -> &str {
        &self.family
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn supported_versions(&self) -> &[String] {
        &self.supported_versions
    }

    fn create(&self, data: &[u8], _options: &Options) -> DriverResult<OperationResult> {
        let mut map = self.storage.write().expect("lock poisoned");
        let fragment = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            if let Entry::Vacant(slot) = map.entry(candidate.clone()) {
                slot.insert(data.to_vec());
                break candidate;
            }
        };
        debug!(driver = %self.identifier, %fragment, len = data.len(), "stored item");
        Ok(Self::written(fragment, data))
    }

    fn update(
        &self,
        data: &[u8],
        target: &Locator,
        _options: &Options,
    ) -> DriverResult<OperationResult> {
        let fragment = require_fragment(target)?;
        let mut map = self.storage.write().expect("lock poisoned");
        let slot = map
            .get_mut(fragment)
            .ok_or_else(|| DriverError::not_found(Some(fragment)))?;
        *slot = data.to_vec();
        debug!(driver = %self.identifier, %fragment, len = data.len(), "replaced item");
        Ok(Self::written(fragment.to_string(), data))
    }

    fn read(&self, target: &Locator) -> DriverResult<Vec<u8>> {
        let fragment = require_fragment(target)?;
        let map = self.storage.read().expect("lock poisoned");
        map.get(fragment)
            .cloned()
            .ok_or_else(|| DriverError::not_found(Some(fragment)))
    }

    fn delete(&self, target: &Locator, _options: &Options) -> DriverResult<()> {
        let fragment = require_fragment(target)?;
        let mut map = self.storage.write().expect("lock poisoned");
        if map.remove(fragment).is_none() {
            return Err(DriverError::not_found(Some(fragment)));
        }
        debug!(driver = %self.identifier, %fragment, "deleted item");
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDriver")
            .field("identifier", &self.identifier)
            .field("family", &self.family)
            .field("version", &self.version)
            .field("item_count", &self.len())
            .finish()
    }
}
