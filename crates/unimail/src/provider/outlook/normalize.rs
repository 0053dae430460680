//! Graph API response normalization
//!
//! Converts Graph messages to the unified message model.

use chrono::{DateTime, Utc};

use super::api::{GraphMessage, GraphRecipient};
use crate::models::{EmailAddress, EmailMessage};

/// Normalize a Graph message to a unified EmailMessage.
///
/// Derivations, per Graph semantics:
/// - the single `body` field is authoritative, typed by its own
///   `contentType` tag (`text` populates `body`, `html` populates
///   `body_html`)
/// - `is_read` comes from Graph's explicit `isRead` flag
/// - `is_starred` is true when the follow-up flag status is `flagged`
/// - `has_attachments` comes from Graph's own `hasAttachments` flag
pub fn normalize_message(msg: GraphMessage) -> EmailMessage {
    let (body, body_html) = match &msg.body {
        Some(item) => {
            let content = item.content.clone();
            match item.content_type.as_deref() {
                Some(t) if t.eq_ignore_ascii_case("html") => (None, content),
                _ => (content, None),
            }
        }
        None => (None, None),
    };

    let date = msg
        .received_date_time
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let is_starred = msg
        .flag
        .as_ref()
        .and_then(|f| f.flag_status.as_deref())
        .is_some_and(|status| status == "flagged");

    EmailMessage::builder(msg.id)
        .thread_id(msg.conversation_id)
        .subject(msg.subject.unwrap_or_default())
        .from(
            msg.from
                .as_ref()
                .map(recipient_address)
                .unwrap_or_else(|| EmailAddress::new("")),
        )
        .to(recipient_list(msg.to_recipients))
        .cc(recipient_list(msg.cc_recipients))
        .date(date)
        .snippet(msg.body_preview.unwrap_or_default())
        .body(body)
        .body_html(body_html)
        .labels(msg.categories.unwrap_or_default())
        .is_read(msg.is_read.unwrap_or(false))
        .is_starred(is_starred)
        .has_attachments(msg.has_attachments.unwrap_or(false))
        .build()
}

fn recipient_address(recipient: &GraphRecipient) -> EmailAddress {
    match &recipient.email_address {
        Some(addr) => EmailAddress {
            email: addr.address.clone().unwrap_or_default(),
            name: addr.name.clone(),
        },
        None => EmailAddress::new(""),
    }
}

fn recipient_list(recipients: Option<Vec<GraphRecipient>>) -> Vec<EmailAddress> {
    recipients
        .unwrap_or_default()
        .iter()
        .map(recipient_address)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> GraphMessage {
        serde_json::from_value(serde_json::json!({
            "id": "AAMk123",
            "conversationId": "conv1",
            "subject": "Status update",
            "bodyPreview": "Here is the latest",
            "body": { "contentType": "html", "content": "<p>Here is the latest</p>" },
            "from": { "emailAddress": { "address": "boss@example.com", "name": "The Boss" } },
            "toRecipients": [
                { "emailAddress": { "address": "me@example.com", "name": "Me" } }
            ],
            "receivedDateTime": "2023-11-14T22:13:20Z",
            "isRead": true,
            "flag": { "flagStatus": "flagged" },
            "categories": ["Blue category"],
            "hasAttachments": true
        }))
        .unwrap()
    }

    #[test]
    fn test_normalize_html_body() {
        let msg = normalize_message(sample_message());
        assert_eq!(msg.id, "AAMk123");
        assert_eq!(msg.thread_id.as_deref(), Some("conv1"));
        assert!(msg.body.is_none());
        assert_eq!(msg.body_html.as_deref(), Some("<p>Here is the latest</p>"));
        assert_eq!(msg.from.email, "boss@example.com");
        assert_eq!(msg.from.name.as_deref(), Some("The Boss"));
        assert_eq!(msg.to.len(), 1);
        assert_eq!(msg.labels, vec!["Blue category".to_string()]);
        assert!(msg.is_read);
        assert!(msg.is_starred);
        assert!(msg.has_attachments);
        assert_eq!(msg.date.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_normalize_text_body() {
        let mut raw = sample_message();
        raw.body = serde_json::from_value(serde_json::json!(
            { "contentType": "text", "content": "plain words" }
        ))
        .unwrap();

        let msg = normalize_message(raw);
        assert_eq!(msg.body.as_deref(), Some("plain words"));
        assert!(msg.body_html.is_none());
    }

    #[test]
    fn test_normalize_unflagged_defaults() {
        let raw: GraphMessage = serde_json::from_value(serde_json::json!({
            "id": "AAMk456"
        }))
        .unwrap();

        let msg = normalize_message(raw);
        assert!(!msg.is_read);
        assert!(!msg.is_starred);
        assert!(!msg.has_attachments);
        assert!(msg.labels.is_empty());
        assert_eq!(msg.subject, "");
    }
}
