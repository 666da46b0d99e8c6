//! Ed25519 keys for drivers that sign their proofs.
//!
//! Verifying keys travel inside locators as [`PublicKey`] (raw 32 bytes,
//! base64url on the wire), so conversions go through that type rather than
//! through raw arrays.

use std::fmt;

use ed25519_dalek::{Signer, Verifier};
use vdr_types::PublicKey;

pub const PUBLIC_KEY_LEN: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;
pub const SIGNATURE_LEN: usize = ed25519_dalek::SIGNATURE_LENGTH;

/// Private half of a driver's proof key.
pub struct SigningKey(ed25519_dalek::SigningKey);

/// Public half, as recovered from a locator.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

#[derive(Clone, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl SigningKey {
    pub fn generate() -> Self {
        Self(ed25519_dalek::SigningKey::generate(&mut rand::thread_rng()))
    }

    /// Deterministic key from a 32-byte seed.
    pub fn from_bytes(seed: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&seed))
    }

    /// The seed, for persisting the key.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message))
    }
}

impl VerifyingKey {
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), SignatureError> {
        self.0
            .verify(message, &signature.0)
            .map_err(|_| SignatureError::InvalidSignature)
    }

    /// The form carried in locators and operation results.
    pub fn to_public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.0.to_bytes().to_vec())
    }

    /// Recover a verifying key from its locator form.
    pub fn from_public_key(key: &PublicKey) -> Result<Self, SignatureError> {
        let bytes: [u8; PUBLIC_KEY_LEN] = key
            .as_bytes()
            .try_into()
            .map_err(|_| SignatureError::InvalidKey(format!("{} bytes", key.as_bytes().len())))?;
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map(Self)
            .map_err(|_| SignatureError::InvalidKey("not a curve point".into()))
    }
}

impl Signature {
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.0.to_bytes()
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        ed25519_dalek::Signature::from_slice(bytes)
            .map(Self)
            .map_err(|_| SignatureError::InvalidLength(bytes.len()))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey(pub={})", self.verifying_key().to_public_key().to_base64url())
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerifyingKey({})", self.to_public_key().to_base64url())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.to_bytes()[..6]))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature does not match")]
    InvalidSignature,
    #[error("unusable verifying key: {0}")]
    InvalidKey(String),
    #[error("signature must be 64 bytes, got {0}")]
    InvalidLength(usize),
}
