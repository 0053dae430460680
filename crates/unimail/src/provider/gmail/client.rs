//! Gmail API HTTP client
//!
//! Implements the provider capability set against the Gmail REST API.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use base64::prelude::*;
use log::{debug, info};

use super::api::{
    GmailMessage, ListLabelsResponse, ListMessagesResponse, ModifyLabelsRequest,
    SendMessageRequest,
};
use super::normalize::normalize_message;
use crate::error::{Error, Result};
use crate::models::{EmailLabel, EmailMessage, Provider};
use crate::provider::{EmailProvider, ListOptions, ListResult, SendOptions};

/// Gmail adapter holding a read-only access-token snapshot.
///
/// The token is captured at construction; a refresh performed elsewhere
/// is only observed by constructing a new adapter.
pub struct GmailProvider {
    access_token: String,
}

impl GmailProvider {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Create a new Gmail adapter with the given bearer token
    pub fn new(access_token: &str) -> Self {
        Self {
            access_token: access_token.to_string(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// GET a JSON resource, mapping 404 to a not-found for `id`
    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        not_found: Option<(&'static str, &str)>,
    ) -> Result<T> {
        match ureq::get(url).header("Authorization", &self.bearer()).call() {
            Ok(mut response) => Ok(response.body_mut().read_json()?),
            Err(ureq::Error::StatusCode(404)) => {
                if let Some((kind, id)) = not_found {
                    Err(Error::not_found(kind, id))
                } else {
                    Err(ureq::Error::StatusCode(404).into())
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List one page of message references (IDs only)
    fn list_message_refs(&self, options: &ListOptions) -> Result<ListMessagesResponse> {
        let mut url = format!(
            "{}/users/me/messages?maxResults={}",
            Self::BASE_URL,
            options.effective_max_results().min(500)
        );

        if let Some(token) = &options.page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }
        for label in &options.label_ids {
            url.push_str(&format!("&labelIds={}", urlencoding::encode(label)));
        }
        if let Some(query) = &options.query {
            url.push_str(&format!("&q={}", urlencoding::encode(query)));
        }

        self.get_json(&url, None)
    }

    /// Fetch the raw Gmail message for an id
    fn fetch_message(&self, id: &str) -> Result<GmailMessage> {
        let url = format!("{}/users/me/messages/{}?format=full", Self::BASE_URL, id);
        self.get_json(&url, Some(("message", id)))
    }

    /// Compose an RFC-822 message from send options
    fn compose_rfc822(options: &SendOptions) -> String {
        let join = |addrs: &[crate::models::EmailAddress]| {
            addrs
                .iter()
                .map(|a| a.email.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut lines = vec![format!("To: {}", join(&options.to))];
        if !options.cc.is_empty() {
            lines.push(format!("Cc: {}", join(&options.cc)));
        }
        if !options.bcc.is_empty() {
            lines.push(format!("Bcc: {}", join(&options.bcc)));
        }
        lines.push(format!("Subject: {}", options.subject));
        lines.push(if options.is_html {
            "Content-Type: text/html; charset=utf-8".to_string()
        } else {
            "Content-Type: text/plain; charset=utf-8".to_string()
        });
        lines.push(String::new());
        lines.push(options.body.clone());

        lines.join("\r\n")
    }
}

impl EmailProvider for GmailProvider {
    fn kind(&self) -> Provider {
        Provider::Gmail
    }

    fn list_messages(&self, options: &ListOptions) -> Result<ListResult> {
        let list = self.list_message_refs(options)?;

        // Full content is fetched per id, sequentially, preserving the
        // provider's listing order. Any failure fails the whole page.
        let refs = list.messages.unwrap_or_default();
        debug!("Gmail listing returned {} message refs", refs.len());

        let mut messages = Vec::with_capacity(refs.len());
        for message_ref in &refs {
            messages.push(self.get_message(&message_ref.id)?);
        }

        Ok(ListResult {
            messages,
            next_page_token: list.next_page_token,
            total_count: list.result_size_estimate,
        })
    }

    fn get_message(&self, id: &str) -> Result<EmailMessage> {
        let raw = self.fetch_message(id)?;
        Ok(normalize_message(raw))
    }

    fn send_message(&self, options: &SendOptions) -> Result<()> {
        options.validate()?;

        let raw = BASE64_URL_SAFE_NO_PAD.encode(Self::compose_rfc822(options));
        let url = format!("{}/users/me/messages/send", Self::BASE_URL);

        info!(
            "Sending Gmail message to {} recipient(s)",
            options.to.len()
        );
        ureq::post(&url)
            .header("Authorization", &self.bearer())
            .send_json(&SendMessageRequest {
                raw,
                thread_id: options.thread_id.clone(),
            })?;

        Ok(())
    }

    fn modify_labels(&self, message_id: &str, add: &[String], remove: &[String]) -> Result<()> {
        let url = format!(
            "{}/users/me/messages/{}/modify",
            Self::BASE_URL,
            message_id
        );

        info!(
            "Modifying Gmail labels on {}: +{:?} -{:?}",
            message_id, add, remove
        );
        match ureq::post(&url)
            .header("Authorization", &self.bearer())
            .send_json(&ModifyLabelsRequest {
                add_label_ids: add.to_vec(),
                remove_label_ids: remove.to_vec(),
            }) {
            Ok(_) => Ok(()),
            Err(ureq::Error::StatusCode(404)) => Err(Error::not_found("message", message_id)),
            Err(e) => Err(e.into()),
        }
    }

    fn get_labels(&self) -> Result<Vec<EmailLabel>> {
        let url = format!("{}/users/me/labels", Self::BASE_URL);
        let response: ListLabelsResponse = self.get_json(&url, None)?;

        Ok(response
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(|label| {
                if label.label_type.as_deref() == Some("system") {
                    EmailLabel::system(label.id, label.name)
                } else {
                    EmailLabel::user(label.id, label.name)
                }
            })
            .collect())
    }
}
