//! Storage
//!
//! Register state is persisted as one JSON document per top-level collection.
//! Writes replace the whole value under a key.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, warn};

/// Keys the register persists under.
pub mod keys {
    /// Product catalog
    pub const PRODUCTS: &str = "pos_products";

    /// Open cart
    pub const CART: &str = "pos_cart";

    /// Sales ledger
    pub const SALES: &str = "pos_sales";

    /// Flat discount
    pub const DISCOUNT: &str = "pos_discount";

    /// Tax rate
    pub const TAX: &str = "pos_tax";

    /// Low-stock threshold
    pub const LOW_STOCK_THRESHOLD: &str = "pos_low_threshold";

    /// Shop profile
    pub const PROFILE: &str = "pos_profile";
}

/// Errors raised by a key/value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key cannot be used as a file name.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Reading or writing the backing file failed.
    #[error("Storage I/O error for {key}: {source}")]
    Io {
        /// Key being read or written
        key: String,

        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A value could not be encoded.
    #[error("Failed to encode {key}: {source}")]
    Encode {
        /// Key being written
        key: String,

        /// Underlying error
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value persistence.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store. Nothing outlives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: FxHashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());

        Ok(())
    }
}

/// Directory of JSON files, one per key (`<dir>/<key>.json`).
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store in `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();

        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;

        Ok(Self { dir })
    }

    /// Directory the store writes to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let staging = path.with_extension("json.tmp");

        let io_error = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };

        fs::write(&staging, value).map_err(io_error)?;
        fs::rename(&staging, &path).map_err(io_error)?;

        Ok(())
    }
}

/// Load the value under `key`, falling back to `default` when it is missing or malformed.
///
/// Malformed values are logged and left in place until the next save.
///
/// # Errors
///
/// Returns a [`StorageError`] if the store itself cannot be read.
pub fn load_or_else<T, S, F>(store: &S, key: &str, default: F) -> Result<T, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
    F: FnOnce() -> T,
{
    let Some(raw) = store.get(key)? else {
        debug!(key, "no stored value, using default");

        return Ok(default());
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(error) => {
            warn!(key, %error, "stored value is malformed, using default");

            Ok(default())
        }
    }
}

/// Serialize `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if the value cannot be encoded or stored.
pub fn save<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;

    store.set(key, &json)
}
