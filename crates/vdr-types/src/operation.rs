use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::key::PublicKey;
use crate::locator::Queries;

/// Identifier of a single driver write (UUID v7 for time-ordering).
///
/// This names the operation, not the stored item: the item is addressed by
/// the locator built from the rest of the [`OperationResult`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(uuid::Uuid);

impl OperationId {
    /// Generate a new time-ordered operation ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperationId({})", self.short_id())
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OperationId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidOperationId(e.to_string()))
    }
}

/// Completion state of a driver write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationState {
    /// Accepted but not yet final (e.g. awaiting ledger confirmations).
    Running,
    /// Durable.
    Success,
    /// Failed; the result carries the reason.
    Error,
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Running => "RUNNING",
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

/// Result of a driver create or update.
///
/// Built fresh by the driver for each call and consumed immediately by the
/// proxy to produce a locator. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    pub operation_id: OperationId,
    pub state: OperationState,
    /// Path segments contributed by the driver.
    pub paths: Vec<String>,
    /// Driver-specific locator hints (e.g. a content hash).
    pub queries: Queries,
    /// The item's primary key inside the driver.
    pub fragment: Option<String>,
    pub public_keys: Option<Vec<PublicKey>>,
    /// Present only when `state` is [`OperationState::Error`].
    pub error: Option<String>,
}

impl OperationResult {
    /// A finished write addressed by `fragment`.
    pub fn success(fragment: impl Into<String>) -> Self {
        Self {
            operation_id: OperationId::new(),
            state: OperationState::Success,
            paths: Vec::new(),
            queries: Queries::new(),
            fragment: Some(fragment.into()),
            public_keys: None,
            error: None,
        }
    }

    /// A write that failed inside the driver.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            operation_id: OperationId::new(),
            state: OperationState::Error,
            paths: Vec::new(),
            queries: Queries::new(),
            fragment: None,
            public_keys: None,
            error: Some(reason.into()),
        }
    }

    pub fn with_state(mut self, state: OperationState) -> Self {
        self.state = state;
        self
    }

    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.queries.insert(key.into(), value.into());
        self
    }

    pub fn with_public_keys(mut self, keys: Vec<PublicKey>) -> Self {
        self.public_keys = Some(keys);
        self
    }

    pub fn is_error(&self) -> bool {
        self.state == OperationState::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_ids_are_unique() {
        assert_ne!(OperationId::new(), OperationId::new());
    }

    #[test]
    fn operation_id_parses_its_display_form() {
        let id = OperationId::new();
        let parsed: OperationId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<OperationId>().is_err());
    }

    #[test]
    fn success_result_has_fragment_and_no_error() {
        let result = OperationResult::success("abc").with_query("h", "xyz");
        assert_eq!(result.state, OperationState::Success);
        assert_eq!(result.fragment.as_deref(), Some("abc"));
        assert_eq!(result.queries.get("h").map(String::as_str), Some("xyz"));
        assert!(result.error.is_none());
        assert!(!result.is_error());
    }

    #[test]
    fn failed_result_carries_reason() {
        let result = OperationResult::failed("disk full");
        assert!(result.is_error());
        assert_eq!(result.error.as_deref(), Some("disk full"));
        assert!(result.fragment.is_none());
    }

    #[test]
    fn state_display_matches_wire_names() {
        assert_eq!(OperationState::Running.to_string(), "RUNNING");
        assert_eq!(OperationState::Success.to_string(), "SUCCESS");
        assert_eq!(OperationState::Error.to_string(), "ERROR");
    }
}
