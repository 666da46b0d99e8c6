//! Error types for driver operations.

use thiserror::Error;

/// Errors a driver can report.
///
/// The proxy passes these through to callers unchanged.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The locator omitted its fragment, or the fragment names no stored item.
    #[error("could not find the data: {}", .fragment.as_deref().unwrap_or("<no fragment>"))]
    DataNotFound { fragment: Option<String> },

    /// The driver reported a failed write.
    #[error("operation {operation_id} failed: {reason}")]
    OperationFailed { operation_id: String, reason: String },

    /// No write with this operation id is known to the driver.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// Integrity check of the storage medium failed.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// The driver's configuration cannot be used.
    #[error("invalid driver configuration: {0}")]
    Config(String),

    /// Opaque failure from the storage back-end.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DriverError {
    pub fn not_found(fragment: Option<&str>) -> Self {
        Self::DataNotFound {
            fragment: fragment.map(str::to_string),
        }
    }

    /// Wrap a back-end specific error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DataNotFound { .. })
    }
}

/// Convenience type alias for driver operations.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_fragment() {
        let err = DriverError::not_found(Some("abc"));
        assert_eq!(err.to_string(), "could not find the data: abc");
        assert!(err.is_not_found());
    }

    #[test]
    fn not_found_without_fragment() {
        let err = DriverError::not_found(None);
        assert_eq!(err.to_string(), "could not find the data: <no fragment>");
    }

    #[test]
    fn failed_operation_is_not_not_found() {
        let err = DriverError::OperationFailed {
            operation_id: "op-1".into(),
            reason: "disk full".into(),
        };
        assert_eq!(err.to_string(), "operation op-1 failed: disk full");
        assert!(!err.is_not_found());
    }

    #[test]
    fn backend_keeps_source() {
        use std::error::Error as _;
        let err = DriverError::backend(std::io::Error::other("disk gone"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("disk gone"));
    }
}
