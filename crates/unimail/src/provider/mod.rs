//! Provider adapters for remote mailbox APIs
//!
//! Each adapter translates between one provider's native message and
//! label representations and the unified models, behind the shared
//! [`EmailProvider`] capability set. New providers are added as new
//! adapter variants; [`resolve`] is the single branch point on provider
//! kind.

pub mod gmail;
pub mod outlook;

use crate::error::{Error, Result};
use crate::models::{Account, EmailLabel, EmailMessage, Provider};

pub use gmail::GmailProvider;
pub use outlook::OutlookProvider;

/// Default page size for listings when the caller does not specify one
pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// Options for listing messages
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Maximum messages per page; defaults to 50 when unset
    pub max_results: Option<u32>,
    /// Opaque cursor from a previous listing's `next_page_token`.
    /// Each adapter's cursor format is its own; cursors must never be
    /// interpreted or handed to a different adapter.
    pub page_token: Option<String>,
    /// Provider-native label IDs to filter by
    pub label_ids: Vec<String>,
    /// Provider-native search expression, forwarded without validation
    pub query: Option<String>,
}

impl ListOptions {
    /// Effective page size for this listing
    pub fn effective_max_results(&self) -> u32 {
        self.max_results.unwrap_or(DEFAULT_MAX_RESULTS)
    }
}

/// One page of a message listing
#[derive(Debug, Clone)]
pub struct ListResult {
    /// Messages in provider-native order
    pub messages: Vec<EmailMessage>,
    /// Cursor for the next page, absent on the last page
    pub next_page_token: Option<String>,
    /// Provider's estimate of the total result count, when given
    pub total_count: Option<u32>,
}

/// Options for sending a message
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Recipients; at least one is required
    pub to: Vec<crate::models::EmailAddress>,
    /// CC recipients
    pub cc: Vec<crate::models::EmailAddress>,
    /// BCC recipients
    pub bcc: Vec<crate::models::EmailAddress>,
    /// Subject line
    pub subject: String,
    /// Message body
    pub body: String,
    /// Whether `body` is HTML rather than plain text
    pub is_html: bool,
    /// Message ID being replied to, for providers with a reply action
    pub in_reply_to: Option<String>,
    /// Thread to attach the message to, for providers that thread by ID
    pub thread_id: Option<String>,
}

impl SendOptions {
    /// Reject requests with missing required fields before any provider
    /// call is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.to.is_empty() {
            return Err(Error::Validation(
                "at least one recipient is required".to_string(),
            ));
        }
        if self.to.iter().any(|addr| addr.email.trim().is_empty()) {
            return Err(Error::Validation(
                "recipient email must not be empty".to_string(),
            ));
        }
        if self.body.is_empty() {
            return Err(Error::Validation("message body is required".to_string()));
        }
        Ok(())
    }
}

/// Capability set shared by all provider adapters.
///
/// Every operation that reaches the remote provider is a blocking
/// network call and independently failable. Adapters hold a read-only
/// token snapshot taken at construction; callers reconstruct an adapter
/// via [`resolve`] per logical operation to observe token refreshes.
pub trait EmailProvider {
    /// Which provider this adapter talks to
    fn kind(&self) -> Provider;

    /// List messages, one page at a time.
    ///
    /// Fail-fast: an error while fetching any message's detail fails
    /// the whole listing rather than returning a partial page.
    fn list_messages(&self, options: &ListOptions) -> Result<ListResult>;

    /// Fetch one message with full body content.
    ///
    /// Fails with `Error::NotFound` when the provider reports the id
    /// does not exist.
    fn get_message(&self, id: &str) -> Result<EmailMessage>;

    /// Send a message, optionally as a reply
    fn send_message(&self, options: &SendOptions) -> Result<()>;

    /// Add and remove provider-native labels on a message
    fn modify_labels(&self, message_id: &str, add: &[String], remove: &[String]) -> Result<()>;

    /// List the account's labels (Gmail) or categories (Outlook)
    fn get_labels(&self) -> Result<Vec<EmailLabel>>;

    /// Search messages with a provider-native query.
    ///
    /// Sugar over [`list_messages`](Self::list_messages).
    fn search(&self, query: &str) -> Result<Vec<EmailMessage>> {
        let options = ListOptions {
            query: Some(query.to_string()),
            ..Default::default()
        };
        Ok(self.list_messages(&options)?.messages)
    }
}

/// Select the adapter matching an account's provider kind.
///
/// The returned adapter is constructed with a snapshot of the account's
/// current credentials.
pub fn resolve(account: &Account) -> Result<Box<dyn EmailProvider>> {
    match account.provider {
        Provider::Gmail => Ok(Box::new(GmailProvider::new(&account.access_token))),
        Provider::Outlook => Ok(Box::new(OutlookProvider::new(&account.access_token))),
    }
}
