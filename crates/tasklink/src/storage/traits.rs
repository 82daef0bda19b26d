//! Storage trait definitions

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Trait for settings storage operations
///
/// Values are stored as JSON text keyed by a flat string. Implementations
/// must survive concurrent access from several views of the same process.
pub trait SettingsStore: Send + Sync {
    /// Get the raw JSON stored under `key`
    fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace the raw JSON stored under `key`
    fn set_raw(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// List all stored keys, sorted
    fn keys(&self) -> Result<Vec<String>>;
}

impl<'a> dyn SettingsStore + 'a {
    /// Get and deserialize the value stored under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to decode setting '{}'", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Serialize and store `value` under `key`
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("Failed to encode setting '{}'", key))?;
        self.set_raw(key, &raw)
    }

    /// Check whether `key` holds a value
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get_raw(key)?.is_some())
    }
}
