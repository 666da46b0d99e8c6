use serde::{Deserialize, Serialize};

/// Tamper-evidence for a stored item, produced by `verify`.
///
/// Equality is by content. `data` carries the payload only when the caller
/// asked for it; it never changes which bytes `proof` covers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Proof scheme, e.g. [`Proof::SHA256`].
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Option<Vec<u8>>,
    /// The evidence itself: a digest or a signature.
    pub proof: Vec<u8>,
}

impl Proof {
    /// Plain SHA-256 content digest.
    pub const SHA256: &'static str = "SHA256";
    /// Ed25519 signature over digest and ledger height.
    pub const ED25519: &'static str = "Ed25519";

    pub fn new(kind: impl Into<String>, proof: Vec<u8>) -> Self {
        Self {
            kind: kind.into(),
            data: None,
            proof,
        }
    }

    /// Attach the payload when `include` is set.
    pub fn with_data(mut self, data: Vec<u8>, include: bool) -> Self {
        self.data = include.then_some(data);
        self
    }
}
