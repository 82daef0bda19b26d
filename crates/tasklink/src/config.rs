//! Configuration loading for tasklink
//!
//! Settings are resolved in order of priority:
//! 1. Runtime environment variables
//! 2. JSON file (~/.config/tasklink/tasklink.json)
//! 3. Built-in defaults

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::todoist::TodoistClient;

/// Config filename in the tasklink config directory
const CONFIG_FILE: &str = "tasklink.json";

/// Default settings database filename in the config directory
const DATABASE_FILE: &str = "settings.sqlite";

/// Overrides the Todoist API base URL
pub const API_BASE_ENV: &str = "TASKLINK_API_BASE";

/// Overrides the settings database path
pub const DATABASE_ENV: &str = "TASKLINK_DB";

/// Resolved application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    /// `None` when no config directory could be determined
    pub db_path: Option<PathBuf>,
}

/// On-disk config file format
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    api_base: Option<String>,
    db_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: TodoistClient::BASE_URL.to_string(),
            db_path: config::config_path(DATABASE_FILE),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment, the config file and defaults
    pub fn load() -> Result<Self> {
        let file: ConfigFile = config::load_json_or_default(CONFIG_FILE)?;
        Ok(Self::resolve(
            file,
            std::env::var(API_BASE_ENV).ok(),
            std::env::var(DATABASE_ENV).ok(),
        ))
    }

    fn resolve(file: ConfigFile, env_api_base: Option<String>, env_db: Option<String>) -> Self {
        let defaults = Self::default();

        let api_base = env_api_base
            .filter(|v| !v.trim().is_empty())
            .or(file.api_base)
            .unwrap_or(defaults.api_base);

        let db_path = env_db
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or(file.db_path)
            .or(defaults.db_path);

        Self { api_base, db_path }
    }
}
