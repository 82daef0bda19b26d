//! Task actions module
//!
//! Provides the high-level operations the views trigger: creating tasks and
//! subtasks from an email, commenting, reopening the email behind a task,
//! and the compose pre-send flow.

mod handler;

pub use handler::ActionHandler;
