//! Cryptographic primitives for the verifiable data registry.
//!
//! Provides SHA-256 content digests (the default `verify` proof), Ed25519
//! signing for drivers that attest freshness, and BLAKE3 hash chains for
//! ledger-anchored storage.
//!
//! All primitives come from established libraries.

pub mod chain;
pub mod digest;
pub mod signer;

pub use chain::{ChainError, ChainLink, HashChainVerifier};
pub use digest::ContentDigest;
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
