//! Persisted form of the override table
//!
//! The table is stored as two parallel comma-joined strings, one for package
//! names and one for driver tokens. `Default` is represented by absence.
//!
//! ```text
//! driver_selection_pkgs   = "com.a,com.b"
//! driver_selection_values = "angle,native"
//! ```
//!
//! Decoding never repairs: a count mismatch or an empty element is reported
//! as corruption and the caller decides what to do with it.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use super::table::OverrideTable;
use crate::types::{DriverValue, LIST_SEPARATOR, SettingKey};

/// The persisted state is inconsistent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("persisted selections are corrupt: {packages} package(s) but {values} value(s)")]
    LengthMismatch { packages: usize, values: usize },

    #[error("persisted selections are corrupt: empty element {index} in '{key}'")]
    EmptyElement { key: SettingKey, index: usize },
}

/// The two strings written to the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedSelections {
    pub packages: String,
    pub values: String,
}

/// Join the table into its persisted strings, preserving order.
pub fn encode(table: &OverrideTable) -> EncodedSelections {
    let sep = LIST_SEPARATOR.to_string();
    let packages: Vec<&str> = table.iter().map(|e| e.package.as_str()).collect();
    let values: Vec<&str> = table.iter().map(|e| e.value.as_str()).collect();
    EncodedSelections {
        packages: packages.join(&sep),
        values: values.join(&sep),
    }
}

/// Split the persisted strings back into a table.
///
/// Absent and empty strings both decode to an empty list. Entries whose
/// token is `default` are dropped, and a package listed twice keeps its
/// first value.
pub fn decode(packages: Option<&str>, values: Option<&str>) -> Result<OverrideTable, CodecError> {
    let packages = split_list(SettingKey::DriverSelectionPackages, packages)?;
    let values = split_list(SettingKey::DriverSelectionValues, values)?;

    if packages.len() != values.len() {
        return Err(CodecError::LengthMismatch {
            packages: packages.len(),
            values: values.len(),
        });
    }

    let mut table = OverrideTable::new();
    let mut seen = HashSet::new();
    for (package, token) in packages.into_iter().zip(values) {
        // a package's first occurrence decides, even when it says default
        if !seen.insert(package) {
            debug!(package, "Ignoring duplicate persisted entry");
            continue;
        }
        // split_list guarantees non-empty, separator-free tokens
        let value = DriverValue::try_from(token.to_string()).unwrap_or_default();
        if value.is_default() {
            debug!(package, "Dropping persisted default entry");
            continue;
        }
        table.set(package, value);
    }
    Ok(table)
}

fn split_list(key: SettingKey, raw: Option<&str>) -> Result<Vec<&str>, CodecError> {
    let raw = match raw {
        None | Some("") => return Ok(Vec::new()),
        Some(raw) => raw,
    };
    let items: Vec<&str> = raw.split(LIST_SEPARATOR).collect();
    if let Some(index) = items.iter().position(|item| item.is_empty()) {
        return Err(CodecError::EmptyElement { key, index });
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_parallel_lists() {
        let table = decode(Some("com.a,com.b"), Some("angle,native")).unwrap();
        assert_eq!(table.get("com.a"), DriverValue::Angle);
        assert_eq!(table.get("com.b"), DriverValue::Native);
        assert_eq!(table.get("com.c"), DriverValue::Default);
    }

    #[test]
    fn test_decode_absent_and_empty() {
        assert!(decode(None, None).unwrap().is_empty());
        assert!(decode(Some(""), Some("")).unwrap().is_empty());
        assert!(decode(None, Some("")).unwrap().is_empty());
    }

    #[test]
    fn test_decode_length_mismatch_is_corruption() {
        let err = decode(Some("com.a,com.b"), Some("angle")).unwrap_err();
        assert_eq!(err, CodecError::LengthMismatch { packages: 2, values: 1 });

        let err = decode(Some("com.a"), None).unwrap_err();
        assert_eq!(err, CodecError::LengthMismatch { packages: 1, values: 0 });
    }

    #[test]
    fn test_decode_empty_element_is_corruption() {
        let err = decode(Some("com.a,,com.b"), Some("angle,native,angle")).unwrap_err();
        assert_eq!(
            err,
            CodecError::EmptyElement {
                key: SettingKey::DriverSelectionPackages,
                index: 1
            }
        );

        let err = decode(Some("com.a,com.b"), Some("angle,")).unwrap_err();
        assert!(matches!(
            err,
            CodecError::EmptyElement { key: SettingKey::DriverSelectionValues, index: 1 }
        ));
    }

    #[test]
    fn test_decode_drops_default_and_duplicates() {
        let table = decode(Some("com.a,com.b,com.a"), Some("default,angle,native")).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("com.b"), DriverValue::Angle);

        let table = decode(Some("com.a,com.a"), Some("angle,native")).unwrap();
        assert_eq!(table.get("com.a"), DriverValue::Angle);
    }

    #[test]
    fn test_decode_default_first_occurrence_shadows_later_duplicate() {
        let table = decode(Some("com.a,com.a"), Some("default,native")).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.get("com.a"), DriverValue::Default);
    }

    #[test]
    fn test_decode_keeps_unknown_tokens() {
        let table = decode(Some("com.a"), Some("vulkan-sw")).unwrap();
        assert_eq!(table.get("com.a"), DriverValue::Other("vulkan-sw".to_string()));
    }

    #[test]
    fn test_encode_preserves_order() {
        let mut table = OverrideTable::new();
        table.set("com.b", DriverValue::Native);
        table.set("com.a", DriverValue::Angle);

        let encoded = encode(&table);
        assert_eq!(encoded.packages, "com.b,com.a");
        assert_eq!(encoded.values, "native,angle");
    }

    #[test]
    fn test_encode_empty_table() {
        assert_eq!(encode(&OverrideTable::new()), EncodedSelections::default());
    }
}
