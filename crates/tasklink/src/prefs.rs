//! User preferences kept in the settings store
//!
//! Every value lives under its own key so views can read and write them
//! independently. Missing keys read as defaults.

use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::storage::SettingsStore;

/// Settings keys
pub mod keys {
    pub const TASK_FILTERS: &str = "taskFilters";
    pub const LAST_USED_PROJECT: &str = "lastUsedProjectId";
    pub const LAST_USED_TASK: &str = "lastUsedTaskId";
    pub const COMPOSE_SETTINGS: &str = "composeSettings";
    pub const COMPOSE_STATES: &str = "composeStates";
    pub const PREFERENCES: &str = "todoistPreferences";
    pub const ICON_ONLY_MODE: &str = "iconOnlyMode";
}

/// Saved project/label filters for the task list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilters {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub label: String,
}

/// Defaults for the compose window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeSettings {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub target_section_id: String,
}

/// Task chosen in a compose window, applied when the message is sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeState {
    pub task_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    /// Never an empty string; no section is `None`
    #[serde(default)]
    pub section_id: Option<String>,
}

impl ComposeState {
    pub fn new(task_id: impl Into<String>, project_id: Option<String>, section_id: Option<String>) -> Self {
        Self {
            task_id: task_id.into(),
            project_id,
            section_id: section_id.filter(|s| !s.is_empty()),
        }
    }
}

/// General options from the settings page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub default_project: String,
    pub include_body: bool,
    pub include_attachments: bool,
    pub include_headers: bool,
    pub auto_add_todoist: bool,
    pub mark_as_processed: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_project: String::new(),
            include_body: true,
            include_attachments: false,
            include_headers: true,
            auto_add_todoist: false,
            mark_as_processed: false,
        }
    }
}

/// Typed access to preferences
#[derive(Clone)]
pub struct Prefs {
    store: Arc<dyn SettingsStore>,
}

impl Prefs {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    // === Task list filters ===

    pub fn task_filters(&self) -> Result<Option<TaskFilters>> {
        self.store.get(keys::TASK_FILTERS)
    }

    pub fn save_task_filters(&self, filters: &TaskFilters) -> Result<()> {
        self.store.set(keys::TASK_FILTERS, filters)
    }

    pub fn clear_task_filters(&self) -> Result<()> {
        self.store.remove(keys::TASK_FILTERS)
    }

    // === Last used ===

    pub fn last_used_project(&self) -> Result<Option<String>> {
        self.store.get(keys::LAST_USED_PROJECT)
    }

    pub fn set_last_used_project(&self, project_id: &str) -> Result<()> {
        self.store.set(keys::LAST_USED_PROJECT, project_id)
    }

    pub fn last_used_task(&self) -> Result<Option<String>> {
        self.store.get(keys::LAST_USED_TASK)
    }

    pub fn set_last_used_task(&self, task_id: &str) -> Result<()> {
        self.store.set(keys::LAST_USED_TASK, task_id)
    }

    // === Compose ===

    pub fn compose_settings(&self) -> Result<ComposeSettings> {
        Ok(self.store.get(keys::COMPOSE_SETTINGS)?.unwrap_or_default())
    }

    pub fn save_compose_settings(&self, settings: &ComposeSettings) -> Result<()> {
        self.store.set(keys::COMPOSE_SETTINGS, settings)
    }

    fn compose_states(&self) -> Result<HashMap<String, ComposeState>> {
        Ok(self.store.get(keys::COMPOSE_STATES)?.unwrap_or_default())
    }

    /// Compose state for a tab, if a task was chosen there
    pub fn compose_state(&self, tab_id: &str) -> Result<Option<ComposeState>> {
        Ok(self.compose_states()?.remove(tab_id))
    }

    /// Set or clear (`None`) the compose state for a tab
    pub fn save_compose_state(&self, tab_id: &str, state: Option<ComposeState>) -> Result<()> {
        let mut states = self.compose_states()?;
        match state {
            Some(mut state) => {
                state.section_id = state.section_id.filter(|s| !s.is_empty());
                states.insert(tab_id.to_string(), state);
            }
            None => {
                states.remove(tab_id);
            }
        }
        debug!("Compose state for tab {} updated ({} tabs tracked)", tab_id, states.len());
        self.store.set(keys::COMPOSE_STATES, &states)
    }

    pub fn clear_compose_state(&self, tab_id: &str) -> Result<()> {
        self.save_compose_state(tab_id, None)
    }

    // === Settings page ===

    pub fn preferences(&self) -> Result<Preferences> {
        Ok(self.store.get(keys::PREFERENCES)?.unwrap_or_default())
    }

    pub fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        self.store.set(keys::PREFERENCES, preferences)
    }

    pub fn icon_only_mode(&self) -> Result<bool> {
        Ok(self.store.get(keys::ICON_ONLY_MODE)?.unwrap_or(false))
    }

    pub fn set_icon_only_mode(&self, enabled: bool) -> Result<()> {
        self.store.set(keys::ICON_ONLY_MODE, &enabled)
    }

    /// Restore settings-page defaults
    pub fn reset_preferences(&self) -> Result<()> {
        self.save_preferences(&Preferences::default())?;
        self.set_icon_only_mode(false)
    }
}
