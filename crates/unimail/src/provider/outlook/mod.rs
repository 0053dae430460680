//! Outlook adapter
//!
//! This module provides:
//! - Microsoft Graph REST client implementing the provider capability set
//! - Response normalization into the unified message model
//!
//! Outlook has no native label concept; the adapter maps Graph message
//! categories to unified labels.

mod client;
mod normalize;

pub use client::OutlookProvider;
pub use normalize::normalize_message;

/// Microsoft Graph wire types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// One page of a Graph message listing
    #[derive(Debug, Deserialize)]
    pub struct GraphListResponse {
        pub value: Vec<GraphMessage>,
        /// Full URL of the next page; used verbatim as the page cursor
        #[serde(rename = "@odata.nextLink")]
        pub next_link: Option<String>,
    }

    /// A Graph mail message
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GraphMessage {
        pub id: String,
        pub conversation_id: Option<String>,
        pub subject: Option<String>,
        pub body_preview: Option<String>,
        pub body: Option<ItemBody>,
        pub from: Option<GraphRecipient>,
        pub to_recipients: Option<Vec<GraphRecipient>>,
        pub cc_recipients: Option<Vec<GraphRecipient>>,
        pub received_date_time: Option<String>,
        pub is_read: Option<bool>,
        pub flag: Option<GraphFlag>,
        pub categories: Option<Vec<String>>,
        pub has_attachments: Option<bool>,
    }

    /// A message body with its authoritative content type
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ItemBody {
        pub content_type: Option<String>,
        pub content: Option<String>,
    }

    /// A sender or recipient wrapper
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GraphRecipient {
        pub email_address: Option<GraphEmailAddress>,
    }

    /// The address inside a recipient wrapper
    #[derive(Debug, Deserialize)]
    pub struct GraphEmailAddress {
        pub address: Option<String>,
        pub name: Option<String>,
    }

    /// Follow-up flag state
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GraphFlag {
        pub flag_status: Option<String>,
    }

    /// Response from listing master categories
    #[derive(Debug, Deserialize)]
    pub struct CategoryListResponse {
        pub value: Vec<GraphCategory>,
    }

    /// A Graph master category
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GraphCategory {
        pub id: String,
        pub display_name: String,
        pub color: Option<String>,
    }

    /// Outbound message for send and reply calls
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OutgoingMessage {
        pub subject: String,
        pub body: OutgoingBody,
        pub to_recipients: Vec<OutgoingRecipient>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub cc_recipients: Vec<OutgoingRecipient>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub bcc_recipients: Vec<OutgoingRecipient>,
    }

    /// Outbound message body
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OutgoingBody {
        pub content_type: &'static str,
        pub content: String,
    }

    /// Outbound recipient wrapper
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct OutgoingRecipient {
        pub email_address: OutgoingEmailAddress,
    }

    /// Outbound address
    #[derive(Debug, Serialize)]
    pub struct OutgoingEmailAddress {
        pub address: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
    }

    /// Envelope for the sendMail and reply endpoints
    #[derive(Debug, Serialize)]
    pub struct SendMailRequest {
        pub message: OutgoingMessage,
    }

    /// Patch body for category updates
    #[derive(Debug, Serialize)]
    pub struct CategoriesPatch {
        pub categories: Vec<String>,
    }

    /// Partial message used when reading current categories
    #[derive(Debug, Deserialize)]
    pub struct CategoriesOnly {
        pub categories: Option<Vec<String>>,
    }
}
