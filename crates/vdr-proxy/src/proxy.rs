use std::sync::Arc;

use tracing::{debug, warn};
use vdr_driver::{Driver, DriverError, DriverResult};
use vdr_types::options::{flag_option, string_option};
use vdr_types::reserved::{
    is_reserved, DRIVER_FAMILY, DRIVER_IDENTIFIER, DRIVER_VERSION, MUTABLE,
};
use vdr_types::{Locator, OperationResult, Options, Proof};
use vdr_url::UrlManager;

use crate::error::{ProxyError, ProxyResult};
use crate::traits::Vdr;

/// Routes registry calls to one of several drivers.
///
/// Driver order matters: when several drivers share a family (or an
/// identifier), a family-only (or identifier-only) lookup picks the first.
pub struct VdrProxy {
    url_manager: Box<dyn UrlManager>,
    drivers: Vec<Arc<dyn Driver>>,
    identifier: String,
    version: String,
}

impl VdrProxy {
    pub fn new(
        url_manager: impl UrlManager + 'static,
        drivers: Vec<Arc<dyn Driver>>,
        identifier: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            url_manager: Box::new(url_manager),
            drivers,
            identifier: identifier.into(),
            version: version.into(),
        }
    }

    pub fn url_manager(&self) -> &dyn UrlManager {
        self.url_manager.as_ref()
    }

    pub fn drivers(&self) -> &[Arc<dyn Driver>] {
        &self.drivers
    }

    /// Replace the whole driver list.
    pub fn set_drivers(&mut self, drivers: Vec<Arc<dyn Driver>>) {
        self.drivers = drivers;
    }

    /// Register one more driver, lowest priority.
    pub fn add_driver(&mut self, driver: Arc<dyn Driver>) {
        self.drivers.push(driver);
    }

    fn ensure_drivers(&self) -> ProxyResult<()> {
        if self.drivers.is_empty() {
            return Err(ProxyError::NoDriversConfigured);
        }
        Ok(())
    }

    /// Pick the driver named by `identifier` and/or `family`.
    ///
    /// A proxy with a single driver always answers with it.
    fn select(&self, identifier: Option<&str>, family: Option<&str>) -> ProxyResult<&dyn Driver> {
        self.ensure_drivers()?;
        if let [only] = self.drivers.as_slice() {
            return Ok(only.as_ref());
        }

        let found = match (identifier, family) {
            (Some(id), Some(fam)) => self
                .drivers
                .iter()
                .find(|d| d.identifier() == id && d.family() == fam),
            (None, Some(fam)) => self.drivers.iter().find(|d| d.family() == fam),
            (Some(id), None) => self.drivers.iter().find(|d| d.identifier() == id),
            (None, None) => None,
        };

        found.map(|d| d.as_ref()).ok_or_else(|| ProxyError::NoMatchingDriver {
            identifier: identifier.map(str::to_string),
            family: family.map(str::to_string),
            available: self
                .drivers
                .iter()
                .map(|d| (d.identifier().to_string(), d.family().to_string()))
                .collect(),
        })
    }

    /// Resolve `url` and pick its driver from the decoded query map.
    ///
    /// `drv` is carried for the driver's benefit only and never gates routing.
    fn route(&self, url: &str) -> ProxyResult<(&dyn Driver, Locator)> {
        self.ensure_drivers()?;
        let target = self.url_manager.resolve(url)?;
        let driver = self.select(
            non_blank(target.query(DRIVER_IDENTIFIER)),
            non_blank(target.query(DRIVER_FAMILY)),
        )?;
        Ok((driver, target))
    }

    /// Fold a write result and the driver's identity into a locator string.
    ///
    /// Driver queries inside the reserved namespace are dropped.
    fn locator_for(
        &self,
        driver: &dyn Driver,
        result: OperationResult,
        mutable: Option<bool>,
    ) -> String {
        let mut queries = result.queries;
        queries.retain(|key, value| {
            if !is_reserved(key) {
                return true;
            }
            warn!(
                driver = driver.identifier(),
                key = key.as_str(),
                shadowed = value.as_str(),
                "driver query uses a reserved locator key"
            );
            false
        });

        queries.insert(DRIVER_FAMILY.to_string(), driver.family().to_string());
        queries.insert(DRIVER_IDENTIFIER.to_string(), driver.identifier().to_string());
        queries.insert(DRIVER_VERSION.to_string(), driver.version().to_string());
        if let Some(mutable) = mutable {
            let flag = if mutable { "1" } else { "0" };
            queries.insert(MUTABLE.to_string(), flag.to_string());
        }

        self.url_manager.create(&Locator {
            paths: result.paths,
            queries,
            fragment: result.fragment,
            public_keys: result.public_keys,
        })
    }
}

/// Surface an `ERROR` write result as a driver failure.
fn completed(result: OperationResult) -> DriverResult<OperationResult> {
    if result.is_error() {
        return Err(DriverError::OperationFailed {
            operation_id: result.operation_id.to_string(),
            reason: result.error.unwrap_or_else(|| "unspecified driver error".to_string()),
        });
    }
    Ok(result)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl Vdr for VdrProxy {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn create(&self, data: &[u8], options: &Options) -> ProxyResult<String> {
        let driver = self.select(
            string_option(options, DRIVER_IDENTIFIER),
            string_option(options, DRIVER_FAMILY),
        )?;
        let result = completed(driver.create(data, options)?)?;
        debug!(
            driver = driver.identifier(),
            family = driver.family(),
            op = %result.operation_id,
            state = %result.state,
            bytes = data.len(),
            "created"
        );
        Ok(self.locator_for(driver, result, Some(flag_option(options, MUTABLE))))
    }

    fn update(&self, data: &[u8], url: &str, options: &Options) -> ProxyResult<Option<String>> {
        let (driver, target) = self.route(url)?;
        let result = completed(driver.update(data, &target, options)?)?;
        debug!(
            driver = driver.identifier(),
            family = driver.family(),
            op = %result.operation_id,
            state = %result.state,
            bytes = data.len(),
            "updated"
        );
        let updated = self.locator_for(driver, result, None);
        Ok((updated != url).then_some(updated))
    }

    fn read(&self, url: &str) -> ProxyResult<Vec<u8>> {
        let (driver, target) = self.route(url)?;
        debug!(driver = driver.identifier(), fragment = ?target.fragment(), "read");
        Ok(driver.read(&target)?)
    }

    fn delete(&self, url: &str, options: &Options) -> ProxyResult<()> {
        let (driver, target) = self.route(url)?;
        debug!(driver = driver.identifier(), fragment = ?target.fragment(), "delete");
        Ok(driver.delete(&target, options)?)
    }

    fn verify(&self, url: &str, return_data: bool) -> ProxyResult<Proof> {
        let (driver, target) = self.route(url)?;
        debug!(driver = driver.identifier(), fragment = ?target.fragment(), return_data, "verify");
        Ok(driver.verify(&target, return_data)?)
    }
}

impl std::fmt::Debug for VdrProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VdrProxy")
            .field("identifier", &self.identifier)
            .field("version", &self.version)
            .field("url_manager", &self.url_manager.kind())
            .field(
                "drivers",
                &self.drivers.iter().map(|d| d.identifier()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
