//! Tasklink crate - Business logic linking email messages to Todoist tasks
//!
//! This crate provides platform-independent functionality including:
//! - Todoist API client with token session, cursor pagination and sync commands
//! - Plain-text body extraction from message part trees
//! - Email back-reference encoding in task descriptions
//! - Settings storage and typed preferences
//! - Action handlers and task list queries for UI consumption
//! - A request/reply service facade for views
//!
//! The mail client itself is reached only through the traits in [`host`].

pub mod actions;
pub mod config;
pub mod host;
pub mod link;
pub mod message;
pub mod prefs;
pub mod query;
pub mod service;
pub mod storage;
pub mod todoist;

pub use actions::ActionHandler;
pub use config::AppConfig;
pub use host::{ComposeHost, DraftFields, EmlComposeHost, EmlMailHost, MailHost};
pub use link::LinkIndex;
pub use message::{CurrentMessage, MessageHeader, MessageId, MessagePart, extract_text_body};
pub use prefs::{ComposeSettings, ComposeState, Preferences, Prefs, TaskFilters};
pub use query::{TaskFilter, TaskSummary, TaskView, due_label, load_task_view};
pub use service::{Reply, Request, Service};
pub use storage::{InMemorySettingsStore, SettingsStore, SqliteSettingsStore};
pub use todoist::{ApiResponse, Destination, Session, TodoistClient, TodoistError};
