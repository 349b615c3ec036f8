//! In-memory override table
//!
//! Ordered package → driver mapping. Order is insertion order and only exists
//! so the persisted strings are stable between writes. The table never holds
//! a `Default` entry: storing `Default` removes the package instead.

use crate::types::DriverValue;

/// One explicit selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    pub package: String,
    pub value: DriverValue,
}

impl OverrideEntry {
    pub fn new(package: impl Into<String>, value: DriverValue) -> Self {
        Self {
            package: package.into(),
            value,
        }
    }
}

/// Package → driver overrides, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    entries: Vec<OverrideEntry>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value for `package`, or `Default` when there is none
    pub fn get(&self, package: &str) -> DriverValue {
        self.position(package)
            .map(|i| self.entries[i].value.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, package: &str) -> bool {
        self.position(package).is_some()
    }

    /// Upsert `package`, or remove it when `value` is `Default`.
    ///
    /// Returns true if the table changed.
    pub fn set(&mut self, package: &str, value: DriverValue) -> bool {
        match (self.position(package), value.is_default()) {
            (None, true) => false,
            (Some(i), true) => {
                self.entries.remove(i);
                true
            }
            (Some(i), false) => {
                if self.entries[i].value == value {
                    return false;
                }
                self.entries[i].value = value;
                true
            }
            (None, false) => {
                self.entries.push(OverrideEntry::new(package, value));
                true
            }
        }
    }

    pub fn remove(&mut self, package: &str) -> bool {
        self.set(package, DriverValue::Default)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverrideEntry> {
        self.entries.iter()
    }

    fn position(&self, package: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.package == package)
    }
}

impl<'a> IntoIterator for &'a OverrideTable {
    type Item = &'a OverrideEntry;
    type IntoIter = std::slice::Iter<'a, OverrideEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
