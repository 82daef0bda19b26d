//! Mail client collaborators
//!
//! The display and compose windows belong to the mail client. The library
//! talks to them through these traits; the CLI backs them with .eml files.

use anyhow::{Context, Result, bail};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::message::{MessageHeader, MessageId, MessagePart, parse_eml};

/// Read access to the message display and the ability to open a message
pub trait MailHost: Send + Sync {
    /// The message shown in the active display, if any
    fn displayed_message(&self) -> Result<Option<MessageHeader>>;

    /// Messages selected in the active folder view
    fn selected_messages(&self) -> Result<Vec<MessageHeader>>;

    /// Fetch the full part tree for a message
    fn full_message(&self, id: &MessageId) -> Result<MessagePart>;

    /// Show the message with the given RFC 822 Message-ID
    fn open_message(&self, header_message_id: &str) -> Result<()>;
}

/// Fields read from a compose window before it is sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftFields {
    pub subject: String,
    #[serde(default)]
    pub plain_body: Option<String>,
}

/// Access to compose windows, keyed by tab id
pub trait ComposeHost: Send + Sync {
    fn draft(&self, tab_id: &str) -> Result<DraftFields>;
}

/// MailHost backed by .eml files on disk
///
/// The first file is the "displayed" message; all files count as selected.
/// Message ids are the file paths.
pub struct EmlMailHost {
    files: Vec<PathBuf>,
}

impl EmlMailHost {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    fn header_for(&self, path: &Path) -> Result<MessageHeader> {
        let raw = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
        let mut header = parse_eml(&raw)?.header;
        header.id = Some(MessageId::new(path.to_string_lossy()));
        Ok(header)
    }
}

impl MailHost for EmlMailHost {
    fn displayed_message(&self) -> Result<Option<MessageHeader>> {
        match self.files.first() {
            Some(path) => Ok(Some(self.header_for(path)?)),
            None => Ok(None),
        }
    }

    fn selected_messages(&self) -> Result<Vec<MessageHeader>> {
        self.files.iter().map(|path| self.header_for(path)).collect()
    }

    fn full_message(&self, id: &MessageId) -> Result<MessagePart> {
        let raw = std::fs::read(id.as_str())
            .with_context(|| format!("Failed to read message {}", id.as_str()))?;
        Ok(parse_eml(&raw)?.root)
    }

    fn open_message(&self, header_message_id: &str) -> Result<()> {
        if header_message_id.trim().is_empty() {
            bail!("No email ID to open");
        }
        let url = format!("mid:{}", header_message_id);
        info!("Opening {}", url);
        open::that(&url).with_context(|| format!("Failed to open {}", url))?;
        Ok(())
    }
}

/// ComposeHost backed by .eml drafts, one per tab id
#[derive(Default)]
pub struct EmlComposeHost {
    drafts: HashMap<String, PathBuf>,
}

impl EmlComposeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the draft file for a tab
    pub fn with_draft(mut self, tab_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.drafts.insert(tab_id.into(), path.into());
        self
    }
}

impl ComposeHost for EmlComposeHost {
    fn draft(&self, tab_id: &str) -> Result<DraftFields> {
        let path = self
            .drafts
            .get(tab_id)
            .with_context(|| format!("No compose window for tab {}", tab_id))?;
        let raw = std::fs::read(path).with_context(|| format!("Failed to read draft {:?}", path))?;
        let eml = parse_eml(&raw)?;

        let body = crate::message::extract_text_body(&eml.root);
        Ok(DraftFields {
            subject: eml.header.subject,
            plain_body: if body.is_empty() { None } else { Some(body) },
        })
    }
}
