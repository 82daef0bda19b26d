//! Plain-text body extraction from a message part tree

use regex::Regex;
use std::sync::LazyLock;

use super::MessagePart;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Extract a readable plain-text body from a message
///
/// The first `text/plain` part found in pre-order wins. If that part is
/// missing or empty, the first `text/html` part is stripped to text.
/// Returns an empty string when neither yields anything.
pub fn extract_text_body(message: &MessagePart) -> String {
    let Some(parts) = message.parts.as_deref() else {
        return String::new();
    };

    if let Some(text) = find_part(parts, "text/plain").and_then(MessagePart::non_empty_body) {
        return text.to_string();
    }

    if let Some(html) = find_part(parts, "text/html").and_then(MessagePart::non_empty_body) {
        return strip_html(html);
    }

    String::new()
}

/// Depth-first pre-order search for the first part whose content type
/// contains `content_type`
pub fn find_part<'a>(parts: &'a [MessagePart], content_type: &str) -> Option<&'a MessagePart> {
    for part in parts {
        if part.content_type_contains(content_type) {
            return Some(part);
        }

        if let Some(nested) = &part.parts
            && let Some(found) = find_part(nested, content_type)
        {
            return Some(found);
        }
    }

    None
}

/// Remove tags and decode the four basic entities, each exactly once
pub fn strip_html(html: &str) -> String {
    TAG_RE
        .replace_all(html, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(parts: Vec<MessagePart>) -> MessagePart {
        MessagePart::container("message/rfc822", parts)
    }

    #[test]
    fn test_no_parts_is_empty() {
        assert_eq!(extract_text_body(&MessagePart::default()), "");
        assert_eq!(extract_text_body(&MessagePart::leaf("text/plain", "root body")), "");
    }

    #[test]
    fn test_plain_text_wins_over_html_at_any_depth() {
        let msg = message(vec![
            MessagePart::leaf("text/html", "<p>html first</p>"),
            MessagePart::container(
                "multipart/mixed",
                vec![MessagePart::container(
                    "multipart/alternative",
                    vec![MessagePart::leaf("text/plain; charset=utf-8", "deep plain")],
                )],
            ),
        ]);
        assert_eq!(extract_text_body(&msg), "deep plain");
    }

    #[test]
    fn test_plain_text_returned_verbatim() {
        let msg = message(vec![MessagePart::leaf("text/plain", "  keep <b>this</b> &amp; spaces \n")]);
        assert_eq!(extract_text_body(&msg), "  keep <b>this</b> &amp; spaces \n");
    }

    #[test]
    fn test_html_fallback_decodes_entities_once() {
        let msg = message(vec![MessagePart::leaf("text/html", "<p>A &amp;amp; B</p>")]);
        assert_eq!(extract_text_body(&msg), "A &amp; B");
    }

    #[test]
    fn test_html_fallback_strips_and_trims() {
        let msg = message(vec![MessagePart::leaf(
            "text/html",
            "\n<div>1&nbsp;&lt; 2&gt;0</div><br/>\n",
        )]);
        assert_eq!(extract_text_body(&msg), "1 < 2>0");
    }

    #[test]
    fn test_empty_plain_part_falls_through_to_html() {
        let msg = message(vec![
            MessagePart::leaf("text/plain", ""),
            MessagePart::leaf("text/plain", "second plain is never reached"),
            MessagePart::leaf("text/html", "<i>from html</i>"),
        ]);
        assert_eq!(extract_text_body(&msg), "from html");
    }

    #[test]
    fn test_no_text_parts_is_empty() {
        let msg = message(vec![MessagePart::leaf("image/png", "binary")]);
        assert_eq!(extract_text_body(&msg), "");
    }

    #[test]
    fn test_find_part_is_pre_order() {
        let parts = vec![
            MessagePart::container(
                "multipart/related",
                vec![MessagePart::leaf("text/html", "nested")],
            ),
            MessagePart::leaf("text/html", "sibling"),
        ];
        let found = find_part(&parts, "text/html").unwrap();
        assert_eq!(found.body.as_deref(), Some("nested"));
        assert!(find_part(&parts, "text/plain").is_none());
    }
}
