//! Error taxonomy for Todoist operations

/// Errors returned by the Todoist session and client
#[derive(Debug, thiserror::Error)]
pub enum TodoistError {
    /// No credential is stored; recoverable by prompting for a token
    #[error("No API token found")]
    NoToken,

    /// The remote rejected the request
    #[error("API Error: {status} - {body}")]
    Api { status: u16, body: String },

    /// The response did not match any supported shape
    #[error("Unexpected response format from Todoist API: {0}")]
    UnexpectedFormat(String),

    /// Transport-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// A sync command was not acknowledged with "ok"
    #[error("Sync command {uuid} failed: {reason}")]
    CommandFailed { uuid: String, reason: String },

    /// Caller supplied missing or empty arguments
    #[error("{0}")]
    InvalidInput(String),

    /// The settings store failed
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl TodoistError {
    /// HTTP status for `Api` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
