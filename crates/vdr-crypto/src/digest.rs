use std::fmt;

use sha2::{Digest, Sha256};
use vdr_types::encoding::encode_base64url;

/// SHA-256 digest of a stored payload.
///
/// This is the default tamper-evidence a driver reports from `verify`, and the
/// `h` locator hint some drivers attach on write.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Digest `data`.
    pub fn of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Compact form used as a locator query value.
    pub fn to_base64url(&self) -> String {
        encode_base64url(&self.0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns `true` if `data` hashes to this digest.
    pub fn matches(&self, data: &[u8]) -> bool {
        Self::of(data) == *self
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", hex::encode(&self.0[..4]))
    }
}

impl From<ContentDigest> for Vec<u8> {
    fn from(digest: ContentDigest) -> Self {
        digest.to_vec()
    }
}
