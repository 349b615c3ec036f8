//! Per-application driver selections
//!
//! `DriverSelections` owns the in-memory override table and keeps the
//! settings store in step with it:
//!
//! - every `set`/`reset` writes the whole table back immediately, so readers
//!   in other processes (the app launcher) see the change at once
//! - `merge` batches its insertions into one write-back
//! - `resync` throws away in-memory state and reloads from the store
//!
//! # Corruption
//!
//! The two list keys are written one after the other with no transaction, so
//! a reader can observe a packages list and a values list of different
//! lengths. That is expected, not a bug: loading such a state clears the
//! table and writes the empty form back as the new truth.
//!
//! # Concurrency
//!
//! No internal locking. Mutating methods take `&mut self`; callers sharing a
//! `DriverSelections` across threads must serialize access themselves.

pub mod codec;
pub mod merge;
pub mod table;
pub mod validator;

pub use codec::{CodecError, EncodedSelections, decode, encode};
pub use merge::{Predetermined, apply_predetermined};
pub use table::{OverrideEntry, OverrideTable};
pub use validator::{DriverCatalog, SharedCatalog, is_allowed};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::store::{SettingsStore, StoreError};
use crate::types::{DriverValue, SettingKey, is_valid_package_name};

/// Why a `set` did not take effect
#[derive(Error, Debug)]
pub enum SetError {
    /// The value is not offered by the catalog; nothing changed
    #[error("driver value '{value}' is not allowed for package '{package}'")]
    InvalidValue { package: String, value: DriverValue },

    /// The package name cannot be stored; nothing changed
    #[error("invalid package name '{package}'")]
    InvalidPackage { package: String },

    /// The table changed in memory but the store write failed
    #[error("selection not saved: {0}")]
    Persistence(#[from] StoreError),
}

/// Override table bound to a settings store and a driver catalog
#[derive(Debug)]
pub struct DriverSelections<S, C> {
    store: S,
    catalog: C,
    table: OverrideTable,
    system_driver: Option<DriverValue>,
}

impl<S: SettingsStore, C: DriverCatalog> DriverSelections<S, C> {
    /// Load from the store, then fold in predetermined defaults.
    ///
    /// Corrupt persisted state is reset rather than reported. Only store
    /// failures are returned.
    pub fn init(store: S, catalog: C, predetermined: &Predetermined) -> Result<Self, StoreError> {
        let mut selections = Self::load(store, catalog)?;
        selections.merge(predetermined)?;
        Ok(selections)
    }

    /// Load from the store without applying any defaults.
    pub fn load(store: S, catalog: C) -> Result<Self, StoreError> {
        let mut selections = Self {
            store,
            catalog,
            table: OverrideTable::new(),
            system_driver: None,
        };
        selections.resync()?;
        Ok(selections)
    }

    /// Force every package's effective driver to `driver`, as when the
    /// system image ships a single GL driver. The table is left as is.
    pub fn with_system_driver(mut self, driver: Option<DriverValue>) -> Self {
        self.system_driver = driver;
        self
    }

    /// Reload the table from the store, discarding in-memory state.
    ///
    /// Call this after being told another process changed the selection keys.
    pub fn resync(&mut self) -> Result<(), StoreError> {
        let packages = self.read(SettingKey::DriverSelectionPackages)?;
        let values = self.read(SettingKey::DriverSelectionValues)?;

        match decode(packages.as_deref(), values.as_deref()) {
            Ok(table) => {
                debug!(entries = table.len(), "Loaded driver selections");
                self.table = table;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Resetting corrupt driver selections");
                self.reset()
            }
        }
    }

    /// Stored selection for `package`; `Default` when there is none.
    pub fn get(&self, package: &str) -> DriverValue {
        self.table.get(package)
    }

    /// Driver the package will actually load, honouring a system driver.
    pub fn effective(&self, package: &str) -> DriverValue {
        match &self.system_driver {
            Some(driver) => driver.clone(),
            None => self.get(package),
        }
    }

    pub fn system_driver(&self) -> Option<&DriverValue> {
        self.system_driver.as_ref()
    }

    /// Select `value` for `package` and write the table back.
    ///
    /// `Default` removes the override. On `SetError::Persistence` the
    /// in-memory table already holds the change but the store may not.
    pub fn set(&mut self, package: &str, value: DriverValue) -> Result<(), SetError> {
        if !is_valid_package_name(package) {
            warn!(package, "Rejecting invalid package name");
            return Err(SetError::InvalidPackage {
                package: package.to_string(),
            });
        }
        if !value.is_canonical() || !self.catalog.allows(&value) {
            warn!(package, value = %value, "Rejecting driver value that is not allowed");
            return Err(SetError::InvalidValue {
                package: package.to_string(),
                value,
            });
        }

        info!(package, value = %value, "Updating driver selection");
        self.table.set(package, value);
        self.write_back()?;
        Ok(())
    }

    /// Drop every override and write the empty table back.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        info!(entries = self.table.len(), "Resetting driver selections");
        self.table.clear();
        self.write_back()
    }

    /// Apply predetermined defaults where no explicit selection exists.
    ///
    /// Writes back once, and only if something was added. Returns whether
    /// the table changed.
    pub fn merge(&mut self, predetermined: &Predetermined) -> Result<bool, StoreError> {
        let allowed = self.catalog.driver_values();
        let added = apply_predetermined(&mut self.table, predetermined, &allowed);
        if added == 0 {
            debug!("Predetermined defaults already applied");
            return Ok(false);
        }
        info!(added, "Applied predetermined driver defaults");
        self.write_back()?;
        Ok(true)
    }

    /// Current overrides in persisted order
    pub fn entries(&self) -> impl Iterator<Item = &OverrideEntry> {
        self.table.iter()
    }

    pub fn table(&self) -> &OverrideTable {
        &self.table
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Whether the app launcher should show a notice naming the driver in use
    pub fn show_in_use_notice(&self) -> Result<bool, StoreError> {
        read_notice_flag(&self.store)
    }

    pub fn set_show_in_use_notice(&self, show: bool) -> Result<(), StoreError> {
        write_notice_flag(&self.store, show)
    }

    fn read(&self, key: SettingKey) -> Result<Option<String>, StoreError> {
        self.store.get(key.as_ref())
    }

    fn write_back(&self) -> Result<(), StoreError> {
        let encoded = encode(&self.table);
        write_encoded(&self.store, &encoded)
    }
}

fn write_encoded<S: SettingsStore + ?Sized>(
    store: &S,
    encoded: &EncodedSelections,
) -> Result<(), StoreError> {
    store.put(SettingKey::DriverSelectionPackages.as_ref(), &encoded.packages)?;
    store.put(SettingKey::DriverSelectionValues.as_ref(), &encoded.values)
}

/// Read the in-use notice flag. Absent or non-numeric reads as off.
pub fn read_notice_flag<S: SettingsStore + ?Sized>(store: &S) -> Result<bool, StoreError> {
    let raw = store.get(SettingKey::ShowInUseNotice.as_ref())?;
    let flag = raw
        .as_deref()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(0);
    Ok(flag == 1)
}

pub fn write_notice_flag<S: SettingsStore + ?Sized>(store: &S, show: bool) -> Result<(), StoreError> {
    debug!(show, "Writing in-use notice flag");
    store.put(
        SettingKey::ShowInUseNotice.as_ref(),
        if show { "1" } else { "0" },
    )
}

/// Package allowed to load a debug driver build, if any
pub fn debug_package<S: SettingsStore + ?Sized>(store: &S) -> Result<Option<String>, StoreError> {
    let raw = store.get(SettingKey::DebugPackage.as_ref())?;
    Ok(raw.filter(|p| !p.is_empty()))
}

/// Return every key this crate owns to its factory state.
///
/// Turns the notice off, empties both selection lists and clears the debug
/// package. A live `DriverSelections` must `resync` afterwards.
pub fn clear_all_settings<S: SettingsStore + ?Sized>(store: &S) -> Result<(), StoreError> {
    info!("Clearing all driver selection settings");
    write_notice_flag(store, false)?;
    write_encoded(store, &EncodedSelections::default())?;
    store.put(SettingKey::DebugPackage.as_ref(), "")
}
