//! Unified message model shared by all provider adapters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An email address with optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Display name (e.g., "John Doe")
    pub name: Option<String>,
    /// Email address (e.g., "john@example.com")
    pub email: String,
}

impl EmailAddress {
    /// Create a new email address with just the email
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// Create a new email address with a display name
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }

    /// Parse an email address from a header string.
    ///
    /// Handles `"Display Name" <addr@example.com>`,
    /// `Display Name <addr@example.com>`, and bare addresses.
    /// A bare address yields the whole trimmed string with no name.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();

        if let Some(angle_start) = s.rfind('<')
            && let Some(angle_end) = s.rfind('>')
            && angle_start < angle_end
        {
            let name = s[..angle_start].trim().trim_matches('"').trim();
            let email = s[angle_start + 1..angle_end].trim();
            return Self {
                name: if name.is_empty() {
                    None
                } else {
                    Some(name.to_string())
                },
                email: email.to_string(),
            };
        }

        Self {
            name: None,
            email: s.to_string(),
        }
    }

    /// Format the address for an RFC-822 header
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }
}

/// Metadata for a message attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAttachment {
    /// Provider-native attachment identifier
    pub id: String,
    /// Original filename
    pub filename: String,
    /// MIME type of the attachment content
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
}

/// A single email message in the unified model.
///
/// `id` is the provider-native identifier and is stable for the lifetime
/// of the message at the provider; read/starred/label state may change
/// between fetches of the same id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Provider-native message ID (opaque, unique per account+provider)
    pub id: String,
    /// Provider-native thread/conversation ID, if any
    pub thread_id: Option<String>,
    /// Subject line
    pub subject: String,
    /// Sender address
    pub from: EmailAddress,
    /// Recipients (To field), provider order preserved
    pub to: Vec<EmailAddress>,
    /// CC recipients
    pub cc: Vec<EmailAddress>,
    /// BCC recipients
    pub bcc: Vec<EmailAddress>,
    /// When the message was received
    pub date: DateTime<Utc>,
    /// Short preview of the body
    pub snippet: String,
    /// Plain-text body content, if available
    pub body: Option<String>,
    /// HTML body content, if available
    pub body_html: Option<String>,
    /// Provider-native label identifiers on this message
    pub labels: Vec<String>,
    /// Whether the message has been read
    pub is_read: bool,
    /// Whether the message is starred/flagged
    pub is_starred: bool,
    /// Whether the message carries at least one attachment
    pub has_attachments: bool,
    /// Attachment metadata, when populated
    pub attachments: Vec<EmailAttachment>,
}

impl EmailMessage {
    /// Create a new message builder
    pub fn builder(id: impl Into<String>) -> MessageBuilder {
        MessageBuilder::new(id)
    }
}

/// Builder for creating EmailMessage instances
pub struct MessageBuilder {
    message: EmailMessage,
}

impl MessageBuilder {
    fn new(id: impl Into<String>) -> Self {
        Self {
            message: EmailMessage {
                id: id.into(),
                thread_id: None,
                subject: String::new(),
                from: EmailAddress::new("unknown@unknown.invalid"),
                to: Vec::new(),
                cc: Vec::new(),
                bcc: Vec::new(),
                date: Utc::now(),
                snippet: String::new(),
                body: None,
                body_html: None,
                labels: Vec::new(),
                is_read: false,
                is_starred: false,
                has_attachments: false,
                attachments: Vec::new(),
            },
        }
    }

    pub fn thread_id(mut self, thread_id: Option<String>) -> Self {
        self.message.thread_id = thread_id;
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.message.subject = subject.into();
        self
    }

    pub fn from(mut self, from: EmailAddress) -> Self {
        self.message.from = from;
        self
    }

    pub fn to(mut self, to: Vec<EmailAddress>) -> Self {
        self.message.to = to;
        self
    }

    pub fn cc(mut self, cc: Vec<EmailAddress>) -> Self {
        self.message.cc = cc;
        self
    }

    pub fn bcc(mut self, bcc: Vec<EmailAddress>) -> Self {
        self.message.bcc = bcc;
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.message.date = date;
        self
    }

    pub fn snippet(mut self, snippet: impl Into<String>) -> Self {
        self.message.snippet = snippet.into();
        self
    }

    pub fn body(mut self, body: Option<String>) -> Self {
        self.message.body = body;
        self
    }

    pub fn body_html(mut self, body_html: Option<String>) -> Self {
        self.message.body_html = body_html;
        self
    }

    pub fn labels(mut self, labels: Vec<String>) -> Self {
        self.message.labels = labels;
        self
    }

    pub fn is_read(mut self, is_read: bool) -> Self {
        self.message.is_read = is_read;
        self
    }

    pub fn is_starred(mut self, is_starred: bool) -> Self {
        self.message.is_starred = is_starred;
        self
    }

    pub fn has_attachments(mut self, has_attachments: bool) -> Self {
        self.message.has_attachments = has_attachments;
        self
    }

    pub fn attachments(mut self, attachments: Vec<EmailAttachment>) -> Self {
        self.message.attachments = attachments;
        self
    }

    pub fn build(self) -> EmailMessage {
        self.message
    }
}
