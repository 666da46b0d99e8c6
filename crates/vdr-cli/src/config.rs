//! Registry configuration loaded from TOML.
//!
//! ```toml
//! identifier = "registry"
//! version = "1.0"
//! base_url = "https://registry.example"
//!
//! [[drivers]]
//! kind = "sqlite"
//! identifier = "db"
//! version = "1.0"
//! path = "./vdr-data/registry.db"
//!
//! [[drivers]]
//! kind = "ledger"
//! identifier = "chain"
//! version = "1.0"
//! path = "./vdr-data/chain"
//! finality_depth = 2
//! ```
//!
//! Driver order in the file is selection order. Every kind is persistent and
//! needs a `path`: each `vdr` invocation is a fresh process, so a locator
//! printed by one run must still resolve in the next.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use vdr_database::{DatabaseConfig, DatabaseDriver, SqlConfig, SqlDriver};
use vdr_driver::Driver;
use vdr_ledger::{LedgerConfig, LedgerDriver};
use vdr_proxy::VdrProxy;
use vdr_url::BaseUrlManager;

/// Database file used when no configuration is given.
pub const DEFAULT_DATABASE: &str = ".vdr/registry.db";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub identifier: String,
    pub version: String,
    /// Locator base address. `None` means `http://localhost`.
    pub base_url: Option<String>,
    pub drivers: Vec<DriverConfig>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            identifier: "vdr".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            base_url: None,
            drivers: vec![DriverConfig::Sqlite {
                identifier: "sqlite".into(),
                version: "1.0".into(),
                path: PathBuf::from(DEFAULT_DATABASE),
                max_connections: default_max_connections(),
                supported_versions: Vec::new(),
            }],
        }
    }
}

/// One storage back-end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DriverConfig {
    /// SQLite `storage(id, data)` table.
    Sqlite {
        identifier: String,
        version: String,
        path: PathBuf,
        #[serde(default = "default_max_connections")]
        max_connections: u32,
        #[serde(default)]
        supported_versions: Vec<String>,
    },
    /// Embedded sled tree.
    Sled {
        identifier: String,
        version: String,
        path: PathBuf,
        #[serde(default = "default_flush_on_write")]
        flush_on_write: bool,
        #[serde(default)]
        supported_versions: Vec<String>,
    },
    /// Journaled hash-chained ledger.
    Ledger {
        identifier: String,
        version: String,
        path: PathBuf,
        #[serde(default)]
        finality_depth: u64,
        /// Hex Ed25519 seed; the journal keeps a generated one otherwise.
        #[serde(default)]
        signing_key: Option<String>,
        #[serde(default)]
        supported_versions: Vec<String>,
    },
}

fn default_max_connections() -> u32 {
    SqlConfig::default().max_connections
}

fn default_flush_on_write() -> bool {
    true
}

impl DriverConfig {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Sqlite { identifier, .. }
            | Self::Sled { identifier, .. }
            | Self::Ledger { identifier, .. } => identifier,
        }
    }

    pub fn build(&self) -> anyhow::Result<Arc<dyn Driver>> {
        let context = || format!("opening driver {}", self.identifier());
        let driver: Arc<dyn Driver> = match self {
            Self::Sqlite {
                identifier,
                version,
                path,
                max_connections,
                supported_versions,
            } => {
                let config = SqlConfig {
                    path: Some(path.clone()),
                    max_connections: *max_connections,
                };
                let mut driver =
                    SqlDriver::open(identifier, version, &config).with_context(context)?;
                if !supported_versions.is_empty() {
                    driver = driver.with_supported_versions(supported_versions.clone());
                }
                Arc::new(driver)
            }
            Self::Sled {
                identifier,
                version,
                path,
                flush_on_write,
                supported_versions,
            } => {
                let config = DatabaseConfig {
                    path: Some(path.clone()),
                    flush_on_write: *flush_on_write,
                    ..DatabaseConfig::default()
                };
                let mut driver =
                    DatabaseDriver::open(identifier, version, &config).with_context(context)?;
                if !supported_versions.is_empty() {
                    driver = driver.with_supported_versions(supported_versions.clone());
                }
                Arc::new(driver)
            }
            Self::Ledger {
                identifier,
                version,
                path,
                finality_depth,
                signing_key,
                supported_versions,
            } => {
                let config = LedgerConfig {
                    finality_depth: *finality_depth,
                    path: Some(path.clone()),
                    signing_key: signing_key.clone(),
                };
                let mut driver =
                    LedgerDriver::open(identifier, version, &config).with_context(context)?;
                if !supported_versions.is_empty() {
                    driver = driver.with_supported_versions(supported_versions.clone());
                }
                Arc::new(driver)
            }
        };
        Ok(driver)
    }
}

impl RegistryConfig {
    /// Load from `path`, or the default configuration when `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Open every configured driver and assemble the proxy.
    pub fn build_proxy(&self) -> anyhow::Result<VdrProxy> {
        let drivers = self
            .drivers
            .iter()
            .map(DriverConfig::build)
            .collect::<anyhow::Result<Vec<_>>>()?;
        let url_manager = match &self.base_url {
            Some(base) => BaseUrlManager::new(base),
            None => BaseUrlManager::localhost(),
        };
        tracing::info!(
            registry = %self.identifier,
            drivers = drivers.len(),
            "registry configured"
        );
        Ok(VdrProxy::new(url_manager, drivers, &self.identifier, &self.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vdr_proxy::Vdr;
    use vdr_types::Options;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("vdr.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn default_is_one_sqlite_driver_on_localhost() {
        let config = RegistryConfig::default();
        assert_eq!(config.base_url, None);
        assert_eq!(
            config.drivers,
            vec![DriverConfig::Sqlite {
                identifier: "sqlite".into(),
                version: "1.0".into(),
                path: PathBuf::from(".vdr/registry.db"),
                max_connections: 4,
                supported_versions: Vec::new(),
            }]
        );
        assert_eq!(RegistryConfig::load(None).unwrap(), config);
    }

    #[test]
    fn parses_every_driver_kind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().display().to_string();
        let config = RegistryConfig::parse(&format!(
            r#"
identifier = "registry"
version = "2.0"
base_url = "vdr://"

[[drivers]]
kind = "sqlite"
identifier = "sql"
version = "1.0"
path = "{root}/sql/vdr.db"

[[drivers]]
kind = "sled"
identifier = "kv"
version = "1.1"
path = "{root}/kv"
supported_versions = ["1.0", "1.1"]

[[drivers]]
kind = "ledger"
identifier = "chain"
version = "1.0"
path = "{root}/chain"
finality_depth = 3
"#
        ))
        .unwrap();

        assert_eq!(config.identifier, "registry");
        assert_eq!(config.base_url.as_deref(), Some("vdr://"));
        assert!(matches!(
            &config.drivers[0],
            DriverConfig::Sqlite { max_connections: 4, .. }
        ));
        assert!(matches!(
            &config.drivers[1],
            DriverConfig::Sled { flush_on_write: true, supported_versions, .. }
                if supported_versions.len() == 2
        ));
        assert!(matches!(
            &config.drivers[2],
            DriverConfig::Ledger { finality_depth: 3, signing_key: None, .. }
        ));
        assert_eq!(config.drivers[2].identifier(), "chain");

        let vdr = config.build_proxy().unwrap();
        let families: Vec<_> = vdr.drivers().iter().map(|d| d.family().to_string()).collect();
        assert_eq!(families, ["database", "database", "blockchain"]);
        assert_eq!(vdr.drivers()[1].supported_versions(), ["1.0", "1.1"]);
        assert_eq!(vdr.identifier(), "registry");
        assert_eq!(vdr.url_manager().kind(), "BaseURL");
    }

    #[test]
    fn process_local_kinds_are_rejected() {
        for kind in ["memory", "tape"] {
            let parsed = RegistryConfig::parse(&format!(
                "[[drivers]]\nkind = \"{kind}\"\nidentifier = \"t\"\nversion = \"1\"\n"
            ));
            assert!(parsed.is_err(), "{kind}");
        }
    }

    #[test]
    fn path_is_required() {
        let parsed = RegistryConfig::parse(
            "[[drivers]]\nkind = \"sqlite\"\nidentifier = \"db\"\nversion = \"1.0\"\n",
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn every_kind_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().display().to_string();
        let path = write_config(
            dir.path(),
            &format!(
                r#"
[[drivers]]
kind = "sqlite"
identifier = "sql"
version = "1.0"
path = "{root}/sql/vdr.db"

[[drivers]]
kind = "sled"
identifier = "kv"
version = "1.0"
path = "{root}/kv"

[[drivers]]
kind = "ledger"
identifier = "chain"
version = "1.0"
path = "{root}/chain"
"#
            ),
        );

        let urls: Vec<String> = {
            let vdr = RegistryConfig::load(Some(&path)).unwrap().build_proxy().unwrap();
            ["sql", "kv", "chain"]
                .iter()
                .map(|id| {
                    let mut options = Options::new();
                    options.insert("drid".into(), (*id).into());
                    vdr.create(id.as_bytes(), &options).unwrap()
                })
                .collect()
        };

        let vdr = RegistryConfig::load(Some(&path)).unwrap().build_proxy().unwrap();
        for (url, expected) in urls.iter().zip(["sql", "kv", "chain"]) {
            assert_eq!(vdr.read(url).unwrap(), expected.as_bytes());
            assert!(vdr.verify(url, false).is_ok(), "{url}");
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RegistryConfig::load(Some(Path::new("/nonexistent/vdr.toml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/vdr.toml"));
    }
}
