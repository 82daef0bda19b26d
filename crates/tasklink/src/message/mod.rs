//! Email message model
//!
//! The mail host hands out messages as a header record plus a hierarchical
//! part tree. Bodies in the tree are already decoded text.

mod current;
mod eml;
mod extract;

pub use current::{CurrentMessage, current_message};
pub use eml::{ParsedEml, parse_eml};
pub use extract::{extract_text_body, find_part, strip_html};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Host-assigned message identifier (not the RFC 822 Message-ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Header fields of a message as reported by the mail host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeader {
    pub id: Option<MessageId>,
    /// RFC 822 Message-ID without angle brackets
    #[serde(default)]
    pub header_message_id: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// One node of a message part tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient_parts")]
    pub parts: Option<Vec<MessagePart>>,
}

impl MessagePart {
    /// A leaf node with a body
    pub fn leaf(content_type: &str, body: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            body: Some(body.into()),
            parts: None,
        }
    }

    /// A container node
    pub fn container(content_type: &str, parts: Vec<MessagePart>) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            body: None,
            parts: Some(parts),
        }
    }

    pub fn content_type_contains(&self, needle: &str) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains(needle))
    }

    /// The body, if present and non-empty
    pub fn non_empty_body(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.is_empty())
    }
}

/// Treat a non-array `parts` as absent and skip children that fail to parse
fn lenient_parts<'de, D>(deserializer: D) -> Result<Option<Vec<MessagePart>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}
