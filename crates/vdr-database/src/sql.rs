use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tokio::runtime::Runtime;
use tracing::{debug, info};
use vdr_crypto::ContentDigest;
use vdr_driver::{require_fragment, Driver, DriverError, DriverResult, CONTENT_HASH_KEY};
use vdr_types::{Locator, OperationResult, Options};

use crate::config::SqlConfig;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS storage (
        id VARCHAR(36) PRIMARY KEY,
        data BLOB NOT NULL
    )
"#;

fn sql_err(e: sqlx::Error) -> DriverError {
    DriverError::backend(e)
}

/// Driver storing payloads as rows of a SQLite `storage(id, data)` table.
///
/// The pool is async; every call blocks on a private current-thread runtime,
/// so the driver must not be called from inside another tokio runtime.
/// Row-level statements give each call its own atomicity.
pub struct SqlDriver {
    identifier: String,
    version: String,
    supported_versions: Vec<String>,
    pool: SqlitePool,
    runtime: Runtime,
}

impl SqlDriver {
    /// Family reported by every SQL driver.
    pub const FAMILY: &'static str = "database";

    /// Connect to the database described by `config`, creating the file and
    /// the `storage` table when missing.
    pub fn open(
        identifier: impl Into<String>,
        version: impl Into<String>,
        config: &SqlConfig,
    ) -> DriverResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(DriverError::backend)?;

        let pool = match &config.path {
            Some(path) => {
                create_parent_dir(path)?;
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);
                runtime.block_on(
                    SqlitePoolOptions::new()
                        .max_connections(config.max_connections.max(1))
                        .connect_with(options),
                )
            }
            // every in-memory connection is its own database: keep exactly one alive
            None => {
                let options =
                    SqliteConnectOptions::from_str("sqlite::memory:").map_err(sql_err)?;
                runtime.block_on(
                    SqlitePoolOptions::new()
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None)
                        .connect_with(options),
                )
            }
        }
        .map_err(sql_err)?;
        runtime
            .block_on(sqlx::query(CREATE_TABLE).execute(&pool))
            .map_err(sql_err)?;
        let rows = count_rows(&runtime, &pool)?;

        let identifier = identifier.into();
        let version = version.into();
        info!(driver = %identifier, path = ?config.path, rows, "sql driver opened");
        Ok(Self {
            identifier,
            supported_versions: vec![version.clone()],
            version,
            pool,
            runtime,
        })
    }

    /// In-memory database, gone when the driver is dropped.
    pub fn temporary(
        identifier: impl Into<String>,
        version: impl Into<String>,
    ) -> DriverResult<Self> {
        Self::open(identifier, version, &SqlConfig::default())
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
    pub fn len(&self) -> DriverResult<u64> {
        count_rows(&self.runtime, &self.pool)
    }

    pub fn is_empty(&self) -> DriverResult<bool> {
        Ok(self.len()? == 0)
    }

    fn written(fragment: String, data: &[u8]) -> OperationResult {
        OperationResult::success(fragment)
            .with_query(CONTENT_HASH_KEY, ContentDigest::of(data).to_base64url())
    }
}

fn count_rows(runtime: &Runtime, pool: &SqlitePool) -> DriverResult<u64> {
    let count: i64 = runtime
        .block_on(sqlx::query_scalar("SELECT COUNT(*) FROM storage").fetch_one(pool))
        .map_err(sql_err)?;
    Ok(count.max(0) as u64)
}

fn create_parent_dir(path: &Path) -> DriverResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(DriverError::backend)
        }
        _ => Ok(()),
    }
}

impl Driver for SqlDriver {
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
            let inserted = self
                .runtime
                .block_on(
                    sqlx::query("INSERT OR IGNORE INTO storage (id, data) VALUES (?, ?)")
                        .bind(candidate.as_str())
                        .bind(data)
                        .execute(&self.pool),
                )
                .map_err(sql_err)?;
            if inserted.rows_affected() == 1 {
                break candidate;
            }
        };
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
            .runtime
            .block_on(
                sqlx::query("UPDATE storage SET data = ? WHERE id = ?")
                    .bind(data)
                    .bind(fragment)
                    .execute(&self.pool),
            )
            .map_err(sql_err)?;
        if updated.rows_affected() == 0 {
            return Err(DriverError::not_found(Some(fragment)));
        }
        debug!(driver = %self.identifier, %fragment, len = data.len(), "updated row");
        Ok(Self::written(fragment.to_string(), data))
    }

    fn read(&self, target: &Locator) -> DriverResult<Vec<u8>> {
        let fragment = require_fragment(target)?;
        let row: Option<Vec<u8>> = self
            .runtime
            .block_on(
                sqlx::query_scalar("SELECT data FROM storage WHERE id = ?")
                    .bind(fragment)
                    .fetch_optional(&self.pool),
            )
            .map_err(sql_err)?;
        row.ok_or_else(|| DriverError::not_found(Some(fragment)))
    }

    fn delete(&self, target: &Locator, _options: &Options) -> DriverResult<()> {
        let fragment = require_fragment(target)?;
        let deleted = self
            .runtime
            .block_on(
                sqlx::query("DELETE FROM storage WHERE id = ?")
                    .bind(fragment)
                    .execute(&self.pool),
            )
            .map_err(sql_err)?;
        if deleted.rows_affected() == 0 {
            return Err(DriverError::not_found(Some(fragment)));
        }
        debug!(driver = %self.identifier, %fragment, "deleted row");
        Ok(())
    }
}

impl Drop for SqlDriver {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl std::fmt::Debug for SqlDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlDriver")
            .field("identifier", &self.identifier)
            .field("version", &self.version)
            .finish()
    }
}
