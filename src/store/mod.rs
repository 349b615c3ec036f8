//! Settings store — the process-external key/value store overrides live in.
//!
//! The store is string-valued with per-key atomic writes and nothing more:
//! no multi-key transactions, and another process may rewrite any key between
//! two of our reads. Every load is therefore a snapshot that can already be
//! stale by the time it is used.
//!
//! # Implementations
//!
//! - `memory` — in-process map, for tests and embedding
//! - `file` — one file per key in a directory, atomic replace via rename

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;
use thiserror::Error;

/// Failures of the underlying settings store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing a key hit an IO error
    #[error("settings store IO error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The key cannot be represented by this store
    #[error("invalid settings key '{key}'")]
    InvalidKey { key: String },

    /// The store refused the operation
    #[error("settings store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// String-valued key/value store with per-key atomicity.
///
/// Methods take `&self`; implementations that mutate use interior mutability
/// so a store can be shared between a `DriverSelections` and other writers.
pub trait SettingsStore {
    /// Read a key. `Ok(None)` means the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value of a key.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).put(key, value)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).put(key, value)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).put(key, value)
    }
}
