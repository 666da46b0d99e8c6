use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vdr_driver::{DriverError, DriverResult};

/// Configuration for a [`LedgerDriver`](crate::LedgerDriver).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Blocks that must sit on top of a write before it reports `SUCCESS`.
    pub finality_depth: u64,
    /// Journal directory. `None` keeps the chain in memory only.
    pub path: Option<PathBuf>,
    /// Hex-encoded 32-byte Ed25519 seed. Overrides the key stored in the
    /// journal; a fresh key is generated when neither is present.
    pub signing_key: Option<String>,
}

impl LedgerConfig {
    /// Persistent ledger journaled under `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// The decoded `signing_key` seed, if configured.
    pub fn signing_seed(&self) -> DriverResult<Option<[u8; 32]>> {
        let Some(text) = &self.signing_key else {
            return Ok(None);
        };
        let bytes = hex::decode(text.trim())
            .map_err(|e| DriverError::Config(format!("signing_key: {e}")))?;
        let seed = <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
            DriverError::Config(format!("signing_key must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Some(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_immediately_final_and_in_memory() {
        let c = LedgerConfig::default();
        assert_eq!(c.finality_depth, 0);
        assert!(c.path.is_none());
        assert_eq!(c.signing_seed().unwrap(), None);
    }

    #[test]
    fn parses_from_toml() {
        let c: LedgerConfig = toml::from_str(
            r#"
finality_depth = 6
path = "/var/lib/vdr/chain"
signing_key = "0707070707070707070707070707070707070707070707070707070707070707"
"#,
        )
        .unwrap();
        assert_eq!(c.finality_depth, 6);
        assert_eq!(c.path, Some(PathBuf::from("/var/lib/vdr/chain")));
        assert_eq!(c.signing_seed().unwrap(), Some([7u8; 32]));

        let empty: LedgerConfig = toml::from_str("").unwrap();
        assert_eq!(empty, LedgerConfig::default());
    }

    #[test]
    fn malformed_seed_is_a_config_error() {
        for bad in ["zz", "0101"] {
            let c = LedgerConfig {
                signing_key: Some(bad.into()),
                ..Default::default()
            };
            assert!(matches!(c.signing_seed(), Err(DriverError::Config(_))));
        }
    }
}
