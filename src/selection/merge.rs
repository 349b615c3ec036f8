//! Predetermined defaults
//!
//! A rules source outside this crate decides that some packages should use a
//! particular driver unless the user says otherwise. Those lists are folded
//! into the table only where no explicit selection exists.
//!
//! # Precedence
//!
//! Groups are applied in the order they were added. Once a group has filled
//! in a package, later groups see an explicit entry and leave it alone, so
//! the first group that lists a package wins.

use tracing::{debug, warn};

use super::table::OverrideTable;
use super::validator::is_allowed;
use crate::types::{DriverValue, is_valid_package_name};

/// Ordered driver → packages lists from a rules source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predetermined {
    groups: Vec<(DriverValue, Vec<String>)>,
}

impl Predetermined {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a group. Packages for a driver already present are added to
    /// that driver's existing group.
    pub fn with<I, P>(mut self, driver: DriverValue, packages: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.add(driver, packages);
        self
    }

    pub fn add<I, P>(&mut self, driver: DriverValue, packages: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let packages = packages.into_iter().map(Into::into);
        match self.groups.iter_mut().find(|(d, _)| *d == driver) {
            Some((_, existing)) => existing.extend(packages),
            None => self.groups.push((driver, packages.collect())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|(_, packages)| packages.is_empty())
    }

    pub fn groups(&self) -> impl Iterator<Item = (&DriverValue, &[String])> {
        self.groups.iter().map(|(d, p)| (d, p.as_slice()))
    }
}

/// Fill in predetermined drivers for packages without an explicit entry.
///
/// Groups whose driver is `Default`, is not a canonical token, or is not in
/// `allowed` are skipped, as are package names that cannot be persisted.
/// Returns the number of entries added.
pub fn apply_predetermined(
    table: &mut OverrideTable,
    predetermined: &Predetermined,
    allowed: &[DriverValue],
) -> usize {
    let mut added = 0;
    for (driver, packages) in predetermined.groups() {
        if driver.is_default() {
            continue;
        }
        if !driver.is_canonical() {
            warn!(driver = %driver, "Skipping predetermined group with an unpersistable driver token");
            continue;
        }
        if !is_allowed(driver, allowed) {
            warn!(driver = %driver, "Skipping predetermined group for a driver that is not allowed");
            continue;
        }
        for package in packages {
            if !is_valid_package_name(package) {
                warn!(package = %package, "Skipping invalid predetermined package name");
                continue;
            }
            if !table.get(package).is_default() {
                debug!(package = %package, "Keeping explicit selection over predetermined default");
                continue;
            }
            table.set(package, driver.clone());
            added += 1;
        }
    }
    added
}
