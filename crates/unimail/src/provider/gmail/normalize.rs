//! Gmail API response normalization
//!
//! Converts Gmail API messages to the unified message model.

use base64::prelude::*;
use chrono::{DateTime, TimeZone, Utc};

use super::api::{GmailMessage, MessagePart, MessagePayload};
use crate::models::{EmailAddress, EmailMessage};

/// Normalize a Gmail API message to a unified EmailMessage.
///
/// Derivations, per Gmail semantics:
/// - `is_read` is the absence of the `UNREAD` label
/// - `is_starred` is the presence of the `STARRED` label
/// - `has_attachments` is true when any top-level part carries a filename
pub fn normalize_message(msg: GmailMessage) -> EmailMessage {
    let labels = msg.label_ids.unwrap_or_default();
    let is_read = !labels.iter().any(|l| l == "UNREAD");
    let is_starred = labels.iter().any(|l| l == "STARRED");

    let (subject, from, to, cc, date, body, body_html, has_attachments) = match &msg.payload {
        Some(payload) => {
            let subject = extract_header(payload, "Subject").unwrap_or_default();
            let from = extract_header(payload, "From")
                .map(|s| EmailAddress::parse(&s))
                .unwrap_or_else(|| EmailAddress::new(""));
            let to = extract_header(payload, "To")
                .map(|s| parse_address_list(&s))
                .unwrap_or_default();
            let cc = extract_header(payload, "Cc")
                .map(|s| parse_address_list(&s))
                .unwrap_or_default();

            let date = extract_header(payload, "Date")
                .and_then(|s| DateTime::parse_from_rfc2822(&s).ok())
                .map(|d| d.with_timezone(&Utc))
                .or_else(|| parse_internal_date(msg.internal_date.as_deref()))
                .unwrap_or_else(Utc::now);

            let (body, body_html) = extract_bodies(payload);

            let has_attachments = payload
                .parts
                .as_ref()
                .is_some_and(|parts| {
                    parts
                        .iter()
                        .any(|p| p.filename.as_deref().is_some_and(|f| !f.is_empty()))
                });

            (subject, from, to, cc, date, body, body_html, has_attachments)
        }
        None => (
            String::new(),
            EmailAddress::new(""),
            Vec::new(),
            Vec::new(),
            parse_internal_date(msg.internal_date.as_deref()).unwrap_or_else(Utc::now),
            None,
            None,
            false,
        ),
    };

    EmailMessage::builder(msg.id)
        .thread_id(msg.thread_id)
        .subject(subject)
        .from(from)
        .to(to)
        .cc(cc)
        .date(date)
        .snippet(decode_html_entities(&msg.snippet))
        .body(body)
        .body_html(body_html)
        .labels(labels)
        .is_read(is_read)
        .is_starred(is_starred)
        .has_attachments(has_attachments)
        .build()
}

/// Parse Gmail's internalDate (milliseconds since epoch, as a string)
fn parse_internal_date(internal_date: Option<&str>) -> Option<DateTime<Utc>> {
    let millis: i64 = internal_date?.parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

/// Extract a header value by name
fn extract_header(payload: &MessagePayload, name: &str) -> Option<String> {
    payload.headers.as_ref()?.iter().find_map(|h| {
        if h.name.eq_ignore_ascii_case(name) {
            Some(h.value.clone())
        } else {
            None
        }
    })
}

/// Parse a comma-separated list of email addresses
fn parse_address_list(s: &str) -> Vec<EmailAddress> {
    s.split(',')
        .map(|addr| EmailAddress::parse(addr.trim()))
        .collect()
}

/// Extract plain-text and HTML bodies from a message payload.
///
/// Walks the MIME part tree collecting the first `text/plain` and the
/// first `text/html` leaf. A single-part message contributes its own
/// body data under its own MIME type (defaulting to plain text).
fn extract_bodies(payload: &MessagePayload) -> (Option<String>, Option<String>) {
    let mut text = None;
    let mut html = None;

    if let Some(parts) = &payload.parts {
        collect_bodies(parts, &mut text, &mut html);
    } else if let Some(body) = &payload.body
        && let Some(data) = &body.data
    {
        let is_html = payload
            .mime_type
            .as_ref()
            .is_some_and(|m| m.starts_with("text/html"));
        let decoded = decode_base64_body(data);
        if is_html {
            html = decoded;
        } else {
            text = decoded;
        }
    }

    (text, html)
}

/// Recursively collect the first text/plain and first text/html parts
fn collect_bodies(parts: &[MessagePart], text: &mut Option<String>, html: &mut Option<String>) {
    for part in parts {
        if text.is_some() && html.is_some() {
            return;
        }

        let mime_type = part.mime_type.as_deref().unwrap_or("");
        if let Some(body) = &part.body
            && let Some(data) = &body.data
        {
            if text.is_none() && mime_type.starts_with("text/plain") {
                *text = decode_base64_body(data);
                continue;
            }
            if html.is_none() && mime_type.starts_with("text/html") {
                *html = decode_base64_body(data);
                continue;
            }
        }

        if let Some(nested) = &part.parts {
            collect_bodies(nested, text, html);
        }
    }
}

/// Decode base64-encoded body data.
///
/// Gmail uses URL-safe base64 but padding can vary, so multiple decoders
/// are tried.
fn decode_base64_body(data: &str) -> Option<String> {
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE};

    let decoders: &[&base64::engine::GeneralPurpose] =
        &[&BASE64_URL_SAFE_NO_PAD, &URL_SAFE, &STANDARD, &STANDARD_NO_PAD];

    for decoder in decoders {
        if let Ok(decoded) = decoder.decode(data)
            && let Ok(s) = String::from_utf8(decoded)
        {
            return Some(s);
        }
    }

    None
}

/// Decode HTML entities in snippet text
fn decode_html_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}
