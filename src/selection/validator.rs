//! Allowed driver values
//!
//! The set of values a package may be switched to comes from outside the
//! crate. It is asked for on every operation, so narrowing the catalog
//! between two calls takes effect on the next one.

use std::sync::{Arc, PoisonError, RwLock};

use crate::types::DriverValue;

/// Whether `value` is one of `allowed`.
pub fn is_allowed(value: &DriverValue, allowed: &[DriverValue]) -> bool {
    allowed.contains(value)
}

/// Source of the currently allowed driver values
pub trait DriverCatalog {
    fn driver_values(&self) -> Vec<DriverValue>;

    fn allows(&self, value: &DriverValue) -> bool {
        is_allowed(value, &self.driver_values())
    }
}

impl DriverCatalog for [DriverValue] {
    fn driver_values(&self) -> Vec<DriverValue> {
        self.to_vec()
    }
}

impl DriverCatalog for Vec<DriverValue> {
    fn driver_values(&self) -> Vec<DriverValue> {
        self.clone()
    }
}

impl<T: DriverCatalog + ?Sized> DriverCatalog for &T {
    fn driver_values(&self) -> Vec<DriverValue> {
        (**self).driver_values()
    }
}

/// Catalog that can be replaced at runtime through any of its clones
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    values: Arc<RwLock<Vec<DriverValue>>>,
}

impl SharedCatalog {
    pub fn new(values: Vec<DriverValue>) -> Self {
        Self {
            values: Arc::new(RwLock::new(values)),
        }
    }

    /// Replace the allowed values for all holders of this catalog.
    pub fn replace(&self, values: Vec<DriverValue>) {
        *self.values.write().unwrap_or_else(PoisonError::into_inner) = values;
    }

    /// Drop a single value from the catalog.
    pub fn withdraw(&self, value: &DriverValue) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|v| v != value);
    }
}

impl DriverCatalog for SharedCatalog {
    fn driver_values(&self) -> Vec<DriverValue> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
