//! Todoist API integration
//!
//! This module provides:
//! - Bearer-token session management over the settings store
//! - A Todoist API client with cursor pagination and sync commands
//! - Wire types for the entities the extension reads and writes

mod client;
mod error;
mod session;

pub use client::{
    ApiResponse, ConnectionStatus, Destination, Method, Payload, RequestOptions, TodoistClient,
};
pub use error::TodoistError;
pub use session::{Session, TOKEN_KEY};

/// Todoist API wire types
pub mod api {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use std::collections::HashMap;

    /// A Todoist task
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Task {
        pub id: String,
        pub content: String,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default)]
        pub project_id: Option<String>,
        #[serde(default)]
        pub section_id: Option<String>,
        #[serde(default)]
        pub parent_id: Option<String>,
        #[serde(default)]
        pub labels: Vec<String>,
        #[serde(default)]
        pub priority: Option<i32>,
        #[serde(default)]
        pub due: Option<Due>,
        #[serde(default)]
        pub checked: bool,
    }

    /// Due date information for a task
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Due {
        #[serde(default)]
        pub date: Option<String>,
        #[serde(default)]
        pub string: Option<String>,
        #[serde(default)]
        pub is_recurring: bool,
    }

    /// A Todoist project
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Project {
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub color: Option<String>,
        #[serde(default)]
        pub is_favorite: bool,
        #[serde(default)]
        pub inbox_project: bool,
    }

    /// A section (column) within a project
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Section {
        pub id: String,
        pub project_id: String,
        pub name: String,
        #[serde(default)]
        pub section_order: Option<i32>,
    }

    /// A personal label
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Label {
        pub id: String,
        pub name: String,
        #[serde(default)]
        pub color: Option<String>,
    }

    /// A comment on a task or project
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Comment {
        pub id: String,
        pub content: String,
        #[serde(default)]
        pub task_id: Option<String>,
        #[serde(default)]
        pub posted_at: Option<String>,
    }

    /// Request body for creating a task
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct CreateTaskRequest {
        #[serde(default)]
        pub content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub project_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub section_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub parent_id: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub labels: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub priority: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub due_string: Option<String>,
    }

    /// Request body for creating a comment
    #[derive(Debug, Clone, Serialize)]
    pub struct CreateCommentRequest {
        pub task_id: String,
        pub content: String,
    }

    /// A typed command for the sync endpoint
    #[derive(Debug, Clone, Serialize)]
    pub struct SyncCommand {
        #[serde(rename = "type")]
        pub kind: String,
        pub uuid: String,
        pub args: Value,
    }

    impl SyncCommand {
        /// Create a command tagged with a fresh random identifier
        pub fn new(kind: impl Into<String>, args: Value) -> Self {
            Self::with_uuid(kind, uuid::Uuid::new_v4().to_string(), args)
        }

        /// Create a command with a caller-chosen identifier
        pub fn with_uuid(kind: impl Into<String>, uuid: impl Into<String>, args: Value) -> Self {
            Self {
                kind: kind.into(),
                uuid: uuid.into(),
                args,
            }
        }
    }

    /// Response from the sync endpoint
    ///
    /// `sync_status` maps each command uuid to `"ok"` or an error object.
    #[derive(Debug, Deserialize)]
    pub struct SyncResponse {
        #[serde(default)]
        pub sync_status: HashMap<String, Value>,
    }
}
