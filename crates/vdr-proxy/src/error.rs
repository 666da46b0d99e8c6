//! Error types for the routing proxy.

use thiserror::Error;
use vdr_driver::DriverError;
use vdr_url::UrlError;

/// Errors returned by [`Vdr`](crate::Vdr) operations.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The proxy holds no drivers at all.
    #[error("the registry does not have any driver associated")]
    NoDriversConfigured,

    /// The selection metadata matched none of the registered drivers.
    #[error(
        "no driver with identifier: '{}' or family: '{}'. Available drivers are: {}.",
        .identifier.as_deref().unwrap_or("N/A"),
        .family.as_deref().unwrap_or("N/A"),
        describe_available(.available)
    )]
    NoMatchingDriver {
        identifier: Option<String>,
        family: Option<String>,
        /// `(identifier, family)` of every registered driver, in order.
        available: Vec<(String, String)>,
    },

    /// The locator string could not be parsed.
    #[error("invalid locator: {0}")]
    Url(#[from] UrlError),

    /// Failure reported by the selected driver.
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl ProxyError {
    /// Whether this is a driver's [`DriverError::DataNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Driver(e) if e.is_not_found())
    }
}

fn describe_available(available: &[(String, String)]) -> String {
    available
        .iter()
        .map(|(identifier, family)| {
            format!("driverIdentifier: {identifier}, driverFamily: {family}")
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience type alias for proxy operations.
pub type ProxyResult<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_matching_driver_lists_available() {
        let err = ProxyError::NoMatchingDriver {
            identifier: None,
            family: Some("sql".into()),
            available: vec![
                ("d1".into(), "memory".into()),
                ("d2".into(), "database".into()),
            ],
        };
        assert_eq!(
            err.to_string(),
            "no driver with identifier: 'N/A' or family: 'sql'. Available drivers are: \
             driverIdentifier: d1, driverFamily: memory; \
             driverIdentifier: d2, driverFamily: database."
        );
    }

    #[test]
    fn driver_errors_pass_through() {
        let err: ProxyError = DriverError::not_found(Some("x")).into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "could not find the data: x");
        assert!(!ProxyError::NoDriversConfigured.is_not_found());
    }
}
