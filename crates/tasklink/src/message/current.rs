//! Resolve the message the user is looking at

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

use super::{MessageHeader, extract_text_body};
use crate::host::MailHost;

/// The current message with its extracted plain-text body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentMessage {
    #[serde(flatten)]
    pub header: MessageHeader,
    pub body: String,
}

/// Find the displayed message, falling back to the first selected one
///
/// A failed display lookup moves on to the selection, and a failure to load
/// the full message degrades to an empty body. Returns `None` when nothing is
/// displayed or selected.
pub fn current_message(host: &dyn MailHost) -> Result<Option<CurrentMessage>> {
    let displayed = host.displayed_message().unwrap_or_else(|e| {
        warn!("Could not read the displayed message: {:#}", e);
        None
    });

    let header = match displayed {
        Some(header) => header,
        None => match host.selected_messages()?.into_iter().next() {
            Some(header) => header,
            None => return Ok(None),
        },
    };

    let body = match &header.id {
        Some(id) => match host.full_message(id) {
            Ok(full) => extract_text_body(&full),
            Err(e) => {
                warn!("Could not load full message {}: {:#}", id.as_str(), e);
                String::new()
            }
        },
        None => String::new(),
    };

    Ok(Some(CurrentMessage { header, body }))
}
