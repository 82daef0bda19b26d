//! RFC 822 (.eml) adapter
//!
//! Turns a raw message into the header record and part tree the rest of the
//! crate works with.

use anyhow::{Context, Result};
use mailparse::{MailHeaderMap, ParsedMail, parse_mail};

use super::{MessageHeader, MessagePart};

/// A parsed .eml file
#[derive(Debug, Clone)]
pub struct ParsedEml {
    pub header: MessageHeader,
    /// Synthetic `message/rfc822` root whose single child is the top-level MIME entity
    pub root: MessagePart,
}

/// Parse raw RFC 822 bytes
pub fn parse_eml(raw: &[u8]) -> Result<ParsedEml> {
    let parsed = parse_mail(raw).context("Failed to parse RFC 822 message")?;

    let header = MessageHeader {
        id: None,
        header_message_id: parsed
            .headers
            .get_first_value("Message-ID")
            .and_then(|v| normalize_message_id(&v)),
        subject: parsed.headers.get_first_value("Subject").unwrap_or_default(),
        author: parsed.headers.get_first_value("From").unwrap_or_default(),
        date: parsed.headers.get_first_value("Date"),
    };

    let root = MessagePart::container("message/rfc822", vec![to_part(&parsed)]);

    Ok(ParsedEml { header, root })
}

fn to_part(mail: &ParsedMail<'_>) -> MessagePart {
    let content_type = Some(mail.ctype.mimetype.to_ascii_lowercase());

    if mail.subparts.is_empty() {
        return MessagePart {
            content_type,
            body: mail.get_body().ok(),
            parts: None,
        };
    }

    MessagePart {
        content_type,
        body: None,
        parts: Some(mail.subparts.iter().map(to_part).collect()),
    }
}

/// Strip surrounding whitespace and angle brackets from a Message-ID header
fn normalize_message_id(raw: &str) -> Option<String> {
    let id = raw
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
