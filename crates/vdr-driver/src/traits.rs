//! The [`Driver`] trait: the entire surface a storage back-end exposes.

use serde::{Deserialize, Serialize};
use vdr_crypto::ContentDigest;
use vdr_types::{Locator, OperationId, OperationResult, OperationState, Options, Proof};

use crate::error::{DriverError, DriverResult};

/// Locator hint carrying the base64url SHA-256 of the payload as written.
pub const CONTENT_HASH_KEY: &str = "h";

/// Identity metadata of a driver, as used for routing and diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverDescriptor {
    pub identifier: String,
    pub family: String,
    pub version: String,
    pub supported_versions: Vec<String>,
}

/// A storage back-end.
///
/// Implementations must be thread-safe (`Send + Sync`): concurrent calls
/// against different locations are expected. Same-location concurrent writes
/// get whatever ordering the storage medium provides.
pub trait Driver: Send + Sync {
    /// Unique identifier of this driver instance within a proxy.
    fn identifier(&self) -> &str;

    /// Storage technology class, e.g. `"memory"`, `"database"`, `"blockchain"`.
    fn family(&self) -> &str;

    /// Version written into locators this driver produces.
    fn version(&self) -> &str;

    /// Locator versions this driver can serve.
    fn supported_versions(&self) -> &[String];

    /// Store `data` at a fresh location.
    fn create(&self, data: &[u8], options: &Options) -> DriverResult<OperationResult>;

    /// Replace the payload at the location named by `target`'s fragment.
    ///
    /// Fails with [`DriverError::DataNotFound`] if the fragment is absent or
    /// unknown.
    fn update(
        &self,
        data: &[u8],
        target: &Locator,
        options: &Options,
    ) -> DriverResult<OperationResult>;

    /// Read the payload at `target`.
    fn read(&self, target: &Locator) -> DriverResult<Vec<u8>>;

    /// Remove the payload at `target`.
    fn delete(&self, target: &Locator, options: &Options) -> DriverResult<()>;

    /// Produce tamper-evidence for the payload at `target`.
    ///
    /// The default reads the payload and returns its SHA-256 digest.
    /// `return_data` only controls whether the payload is attached.
    fn verify(&self, target: &Locator, return_data: bool) -> DriverResult<Proof> {
        let data = self.read(target)?;
        let digest = ContentDigest::of(&data);
        Ok(Proof::new(Proof::SHA256, digest.to_vec()).with_data(data, return_data))
    }

    /// Poll the state of an earlier write.
    ///
    /// Synchronous drivers always answer [`OperationState::Success`].
    fn store_result_state(&self, _operation_id: &OperationId) -> DriverResult<OperationState> {
        Ok(OperationState::Success)
    }

    /// Whether locators written by driver `version` can be served.
    fn supports(&self, version: &str) -> bool {
        version == self.version() || self.supported_versions().iter().any(|v| v == version)
    }

    fn descriptor(&self) -> DriverDescriptor {
        DriverDescriptor {
            identifier: self.identifier().to_string(),
            family: self.family().to_string(),
            version: self.version().to_string(),
            supported_versions: self.supported_versions().to_vec(),
        }
    }
}

/// The fragment of `target`, or [`DriverError::DataNotFound`].
pub fn require_fragment(target: &Locator) -> DriverResult<&str> {
    target.fragment().ok_or(DriverError::DataNotFound { fragment: None })
}
