//! Label model covering Gmail labels and Outlook categories

use serde::{Deserialize, Serialize};

/// Whether a label is provider-managed or user-created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    System,
    User,
}

/// A mail label or category in the unified model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailLabel {
    /// Provider-native label identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// System or user label
    pub kind: LabelKind,
    /// Display color, when the provider exposes one (Outlook categories)
    pub color: Option<String>,
}

impl EmailLabel {
    /// Create a user label
    pub fn user(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: LabelKind::User,
            color: None,
        }
    }

    /// Create a system label
    pub fn system(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: LabelKind::System,
            color: None,
        }
    }

    /// Builder method to set the color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Well-known Gmail system label IDs
pub mod system_labels {
    pub const INBOX: &str = "INBOX";
    pub const SENT: &str = "SENT";
    pub const TRASH: &str = "TRASH";
    pub const SPAM: &str = "SPAM";
    pub const STARRED: &str = "STARRED";
    pub const UNREAD: &str = "UNREAD";
}
