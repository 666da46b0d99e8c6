use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::{decode_base64url, encode_base64url};
use crate::error::TypeError;

/// An encoded public key relevant to a stored item.
///
/// The registry never interprets key material: a key is the opaque encoded
/// form produced by whichever scheme the driver uses (for the ledger driver,
/// the raw 32-byte Ed25519 verifying key). Inside a locator it travels as
/// base64url without padding.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(Vec<u8>);

impl PublicKey {
    /// Wrap encoded key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The encoded key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Canonical compact text form used in locator queries.
    pub fn to_base64url(&self) -> String {
        encode_base64url(&self.0)
    }

    /// Parse the canonical compact text form.
    pub fn from_base64url(text: &str) -> Result<Self, TypeError> {
        decode_base64url(text).map(Self)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_base64url())
    }
}

impl From<Vec<u8>> for PublicKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}
