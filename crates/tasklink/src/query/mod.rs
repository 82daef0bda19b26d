//! Query API for UI consumption
//!
//! Provides task list filtering, due-date labels and the per-view state
//! object the task picker works from.

mod tasks;

pub use tasks::{TaskFilter, TaskSummary, TaskView, due_label, load_task_view, sections_for_project, task_due_label};
