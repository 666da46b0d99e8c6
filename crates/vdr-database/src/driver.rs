use tracing::{debug, info};
use vdr_crypto::ContentDigest;
use vdr_driver::{require_fragment, Driver, DriverError, DriverResult, CONTENT_HASH_KEY};
use vdr_types::{Locator, OperationResult, Options};

use crate::config::DatabaseConfig;

fn db_err(e: sled::Error) -> DriverError {
    DriverError::backend(e)
}

/// Driver storing payloads in an embedded `sled` database.
///
/// Rows are `(uuid, payload)` pairs in one tree. Every call maps onto a
/// single atomic tree operation, so concurrent calls on different rows never
/// interfere and same-row writes are last-write-wins.
pub struct DatabaseDriver {
    identifier: String,
    version: String,
    supported_versions: Vec<String>,
    table: sled::Tree,
    flush_on_write: bool,
    _db: sled::Db,
}

impl DatabaseDriver {
    /// Family reported by every database driver.
    pub const FAMILY: &'static str = "database";

    /// Open (or create) the database described by `config`.
    pub fn open(
        identifier: impl Into<String>,
        version: impl Into<String>,
        config: &DatabaseConfig,
    ) -> DriverResult<Self> {
        let sled_config = match &config.path {
            Some(path) => sled::Config::new().path(path),
            None => sled::Config::new().temporary(true),
        };
        let db = sled_config.open().map_err(db_err)?;
        let table = db.open_tree(config.table.as_bytes()).map_err(db_err)?;

        let identifier = identifier.into();
        let version = version.into();
        info!(
            driver = %identifier,
            path = ?config.path,
            rows = table.len(),
            "database driver opened"
        );

        Ok(Self {
            identifier,
            supported_versions: vec![version.clone()],
            version,
            table,
            flush_on_write: config.flush_on_write,
            _db: db,
        })
    }

    /// Open a throwaway database, removed when the driver is dropped.
    pub fn temporary(
        identifier: impl Into<String>,
        version: impl Into<String>,
    ) -> DriverResult<Self> {
        Self::open(identifier, version, &DatabaseConfig::default())
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

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn after_write(&self) -> DriverResult<()> {
        if self.flush_on_write {
            self.table.flush().map_err(db_err)?;
        }
        Ok(())
    }

    fn written(fragment: String, data: &[u8]) -> OperationResult {
        OperationResult::success(fragment)
            .with_query(CONTENT_HASH_KEY, ContentDigest::of(data).to_base64url())
    }
}

impl Driver for DatabaseDriver {
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
        let fragment = loop {
            let candidate = uuid::Uuid::new_v4().to_string();
            let swapped = self
                .table
                .compare_and_swap(candidate.as_bytes(), None::<&[u8]>, Some(data))
                .map_err(db_err)?;
            if swapped.is_ok() {
                break candidate;
            }
        };
        self.after_write()?;
        debug!(driver = %self.identifier, %fragment, len = data.len(), "inserted row");
        Ok(Self::written(fragment, data))
    }

    fn update(
        &self,
        data: &[u8],
        target: &Locator,
        _options: &Options,
    ) -> DriverResult<OperationResult> {
        let fragment = require_fragment(target)?;
        let updated = self
            .table
            .update_and_fetch(fragment.as_bytes(), |old| old.map(|_| data.to_vec()))
            .map_err(db_err)?;
        if updated.is_none() {
            return Err(DriverError::not_found(Some(fragment)));
        }
        self.after_write()?;
        debug!(driver = %self.identifier, %fragment, len = data.len(), "updated row");
        Ok(Self::written(fragment.to_string(), data))
    }

    fn read(&self, target: &Locator) -> DriverResult<Vec<u8>> {
        let fragment = require_fragment(target)?;
        self.table
            .get(fragment.as_bytes())
            .map_err(db_err)?
            .map(|row| row.to_vec())
            .ok_or_else(|| DriverError::not_found(Some(fragment)))
    }

    fn delete(&self, target: &Locator, _options: &Options) -> DriverResult<()> {
        let fragment = require_fragment(target)?;
        if self.table.remove(fragment.as_bytes()).map_err(db_err)?.is_none() {
            return Err(DriverError::not_found(Some(fragment)));
        }
        self.after_write()?;
        debug!(driver = %self.identifier, %fragment, "deleted row");
        Ok(())
    }
}

impl std::fmt::Debug for DatabaseDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseDriver")
            .field("identifier", &self.identifier)
            .field("version", &self.version)
            .field("rows", &self.len())
            .finish()
    }
}
