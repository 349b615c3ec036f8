//! Driver values and persisted setting keys
//!
//! `DriverValue` is the symbolic driver choice for a package. The well-known
//! choices get their own variants; anything else a catalog offers is carried
//! as `Other` so new drivers can be added without touching this crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Separator used by the persisted list encoding.
pub const LIST_SEPARATOR: char = ',';

/// Driver implementation selected for a package
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DriverValue {
    /// No explicit selection; never stored
    #[default]
    Default,
    /// The device's native GL driver
    Native,
    /// ANGLE, GLES over Vulkan
    Angle,
    /// Any other driver token offered by the catalog
    Other(String),
}

/// Errors from parsing a driver token
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseDriverValueError {
    #[error("driver value cannot be empty")]
    Empty,

    #[error("driver value '{token}' contains the list separator ','")]
    ContainsSeparator { token: String },
}

impl DriverValue {
    /// Token used in the persisted form and on the command line
    pub fn as_str(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::Native => "native",
            Self::Angle => "angle",
            Self::Other(token) => token,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// True when the token parses back to this exact value.
    ///
    /// `Other` can be built directly with a token that holds the separator,
    /// is empty, or spells a builtin name; such values cannot be persisted.
    pub fn is_canonical(&self) -> bool {
        self.as_str().parse::<DriverValue>().as_ref() == Ok(self)
    }

    /// The values every catalog starts from
    pub fn builtin() -> Vec<DriverValue> {
        vec![Self::Default, Self::Native, Self::Angle]
    }
}

impl FromStr for DriverValue {
    type Err = ParseDriverValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(ParseDriverValueError::Empty),
            "default" => Ok(Self::Default),
            "native" => Ok(Self::Native),
            "angle" => Ok(Self::Angle),
            token if token.contains(LIST_SEPARATOR) => {
                Err(ParseDriverValueError::ContainsSeparator {
                    token: token.to_string(),
                })
            }
            token => Ok(Self::Other(token.to_string())),
        }
    }
}

impl fmt::Display for DriverValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for DriverValue {
    type Error = ParseDriverValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DriverValue> for String {
    fn from(value: DriverValue) -> Self {
        match value {
            DriverValue::Other(token) => token,
            other => other.as_str().to_string(),
        }
    }
}

/// Keys this crate reads and writes in the settings store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter, AsRefStr, IntoStaticStr)]
pub enum SettingKey {
    /// Comma-joined package names
    #[strum(serialize = "driver_selection_pkgs")]
    DriverSelectionPackages,
    /// Comma-joined driver tokens, index-aligned with the packages key
    #[strum(serialize = "driver_selection_values")]
    DriverSelectionValues,
    /// `"1"` / `"0"` flag for the driver-in-use notice
    #[strum(serialize = "show_driver_in_use_notice")]
    ShowInUseNotice,
    /// Package allowed to load a debug driver build; only ever cleared here
    #[strum(serialize = "driver_debug_package")]
    DebugPackage,
}

/// Check that a package name can be stored in the comma-joined list.
pub fn is_valid_package_name(package: &str) -> bool {
    !package.is_empty() && !package.contains(LIST_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_builtin_tokens_parse() {
        assert_eq!("default".parse::<DriverValue>(), Ok(DriverValue::Default));
        assert_eq!("native".parse::<DriverValue>(), Ok(DriverValue::Native));
        assert_eq!("angle".parse::<DriverValue>(), Ok(DriverValue::Angle));
    }

    #[test]
    fn test_unknown_token_is_other() {
        let value: DriverValue = "swiftshader".parse().unwrap();
        assert_eq!(value, DriverValue::Other("swiftshader".to_string()));
        assert_eq!(value.to_string(), "swiftshader");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let value: DriverValue = "ANGLE".parse().unwrap();
        assert_ne!(value, DriverValue::Angle);
    }

    #[test]
    fn test_invalid_tokens_rejected() {
        assert_eq!("".parse::<DriverValue>(), Err(ParseDriverValueError::Empty));
        assert!(matches!(
            "angle,native".parse::<DriverValue>(),
            Err(ParseDriverValueError::ContainsSeparator { .. })
        ));
    }

    #[test]
    fn test_hand_built_other_must_be_canonical() {
        assert!(DriverValue::Default.is_canonical());
        assert!(DriverValue::Angle.is_canonical());
        assert!(DriverValue::Other("vk".to_string()).is_canonical());

        assert!(!DriverValue::Other("vk,gl".to_string()).is_canonical());
        assert!(!DriverValue::Other(String::new()).is_canonical());
        assert!(!DriverValue::Other("default".to_string()).is_canonical());
        assert!(!DriverValue::Other("angle".to_string()).is_canonical());
    }

    #[test]
    fn test_serde_uses_tokens() {
        let json = serde_json::to_string(&vec![DriverValue::Angle, DriverValue::Default]).unwrap();
        assert_eq!(json, r#"["angle","default"]"#);

        let parsed: Vec<DriverValue> = serde_json::from_str(r#"["native","vk"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![DriverValue::Native, DriverValue::Other("vk".to_string())]
        );

        assert!(serde_json::from_str::<DriverValue>(r#""""#).is_err());
    }

    #[test]
    fn test_setting_keys_are_distinct() {
        let names: Vec<&'static str> = SettingKey::iter().map(Into::into).collect();
        assert_eq!(names.len(), 4);
        assert!(names.contains(&"driver_selection_pkgs"));
        assert!(names.contains(&"driver_selection_values"));
        assert!(names.contains(&"show_driver_in_use_notice"));
        assert_eq!(
            "driver_debug_package".parse::<SettingKey>(),
            Ok(SettingKey::DebugPackage)
        );
    }

    #[test]
    fn test_package_name_validation() {
        assert!(is_valid_package_name("com.example.app"));
        assert!(!is_valid_package_name(""));
        assert!(!is_valid_package_name("com.a,com.b"));
    }
}
