//! Email back-references on tasks
//!
//! A task created from an email carries a marker at the end of its
//! description naming the email's Message-ID. The marker stays readable in
//! any Todoist client. The side table in the settings store is consulted
//! first; the marker is the fallback for tasks created elsewhere.

use anyhow::Result;
use log::debug;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::storage::SettingsStore;
use crate::todoist::api::Task;

/// Label that introduces the email id inside a description
pub const LINK_LABEL: &str = "📧 Email ID: ";

/// Settings key for the task id -> email id table
pub const LINKS_KEY: &str = "emailLinks";

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"📧 Email ID: (.+?)(?:\n|$)").unwrap());

/// Build the marker to append to a task description
///
/// Returns an empty string for an absent or empty id.
pub fn encode(header_message_id: Option<&str>) -> String {
    match header_message_id {
        Some(id) if !id.is_empty() => format!("\n\n---\n{}{}", LINK_LABEL, id),
        _ => String::new(),
    }
}

/// Recover the email id from a task description
///
/// The first occurrence of the label wins. A description containing the
/// label as ordinary text will decode too.
pub fn decode(description: Option<&str>) -> Option<String> {
    let captures = LINK_RE.captures(description?)?;
    let id = captures.get(1)?.as_str().trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Side table mapping task ids to email Message-IDs
#[derive(Clone)]
pub struct LinkIndex {
    store: Arc<dyn SettingsStore>,
}

impl LinkIndex {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        Ok(self.store.get(LINKS_KEY)?.unwrap_or_default())
    }

    /// Remember that `task_id` was created from `header_message_id`
    pub fn record(&self, task_id: &str, header_message_id: &str) -> Result<()> {
        let mut links = self.load()?;
        links.insert(task_id.to_string(), header_message_id.to_string());
        self.store.set(LINKS_KEY, &links)?;
        debug!("Linked task {} to email {}", task_id, header_message_id);
        Ok(())
    }

    pub fn lookup(&self, task_id: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(task_id))
    }

    pub fn forget(&self, task_id: &str) -> Result<()> {
        let mut links = self.load()?;
        if links.remove(task_id).is_some() {
            self.store.set(LINKS_KEY, &links)?;
        }
        Ok(())
    }

    /// Email id for a task: side table first, then the description marker
    pub fn resolve(&self, task: &Task) -> Result<Option<String>> {
        if let Some(id) = self.lookup(&task.id)? {
            return Ok(Some(id));
        }
        Ok(decode(task.description.as_deref()))
    }
}
