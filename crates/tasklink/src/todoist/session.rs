//! Bearer-token session
//!
//! The token lives in the settings store under a fixed key. It is created by
//! the user pasting it into a form and removed by an explicit "clear token".
//! Invalid tokens are only discovered when a request fails.

use log::info;
use std::sync::Arc;

use super::TodoistError;
use crate::storage::SettingsStore;

/// Settings key for the stored token
pub const TOKEN_KEY: &str = "todoistToken";

/// Token session backed by the settings store
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SettingsStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// Read the stored token
    pub fn get_token(&self) -> Result<Option<String>, TodoistError> {
        Ok(self.store.get::<String>(TOKEN_KEY)?)
    }

    /// Persist a new token
    ///
    /// # Errors
    /// Returns `InvalidInput` if the value is empty or whitespace-only.
    pub fn save_token(&self, value: &str) -> Result<(), TodoistError> {
        if value.trim().is_empty() {
            return Err(TodoistError::InvalidInput("No token provided".to_string()));
        }
        self.store.set(TOKEN_KEY, value)?;
        info!("Saved Todoist token");
        Ok(())
    }

    /// Remove the stored token, whether or not one exists
    pub fn clear_token(&self) -> Result<(), TodoistError> {
        self.store.remove(TOKEN_KEY)?;
        info!("Cleared Todoist token");
        Ok(())
    }

    /// Check whether a token is stored
    pub fn has_token(&self) -> bool {
        matches!(self.get_token(), Ok(Some(_)))
    }
}
