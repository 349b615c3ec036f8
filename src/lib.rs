//! driver-selection library
//!
//! Keeps a per-application override of which graphics driver an app loads,
//! persisted in a shared settings store that other processes also read and
//! write. Predetermined defaults are merged in without clobbering explicit
//! user choices.

pub mod cli;
pub mod config_file;
pub mod error;
pub mod notify;
pub mod selection;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use config_file::{PredeterminedGroup, SelectionConfig};
pub use error::{Result, SelectionError};
pub use notify::{ChangeNotice, forward_signals, notify_watcher, pump, watch};
pub use selection::{
    CodecError, DriverCatalog, DriverSelections, EncodedSelections, OverrideEntry, OverrideTable,
    Predetermined, SetError, SharedCatalog, clear_all_settings, debug_package, decode, encode,
    is_allowed, read_notice_flag, write_notice_flag,
};
pub use store::{FileStore, MemoryStore, SettingsStore, StoreError};
pub use types::{DriverValue, ParseDriverValueError, SettingKey};
