//! Microsoft Graph HTTP client
//!
//! Implements the provider capability set against the Graph API.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use log::{debug, info};
use url::Url;

use super::api::{
    CategoriesOnly, CategoriesPatch, CategoryListResponse, GraphListResponse, GraphMessage,
    OutgoingBody, OutgoingEmailAddress, OutgoingMessage, OutgoingRecipient, SendMailRequest,
};
use super::normalize::normalize_message;
use crate::error::{Error, Result};
use crate::models::{EmailAddress, EmailLabel, EmailMessage, Provider};
use crate::provider::{EmailProvider, ListOptions, ListResult, SendOptions};

/// Outlook adapter holding a read-only access-token snapshot.
///
/// The token is captured at construction; a refresh performed elsewhere
/// is only observed by constructing a new adapter.
pub struct OutlookProvider {
    access_token: String,
}

impl OutlookProvider {
    /// Microsoft Graph base URL
    const BASE_URL: &'static str = "https://graph.microsoft.com/v1.0";

    /// Create a new Outlook adapter with the given bearer token
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

    /// URL for the first page of an inbox listing
    fn build_list_url(options: &ListOptions) -> String {
        // The Outlook cursor is the full @odata.nextLink URL; when
        // present it replaces the endpoint entirely.
        if let Some(token) = &options.page_token {
            return token.clone();
        }

        // BASE_URL is a constant; parsing it cannot fail.
        let mut url = Url::parse(Self::BASE_URL).unwrap();
        url.path_segments_mut()
            .unwrap()
            .extend(["me", "mailFolders", "inbox", "messages"]);
        url.query_pairs_mut()
            .append_pair("$top", &options.effective_max_results().to_string());
        if let Some(query) = &options.query {
            url.query_pairs_mut()
                .append_pair("$search", &format!("\"{}\"", query));
        }

        url.to_string()
    }

    fn build_outgoing(options: &SendOptions) -> OutgoingMessage {
        let to_outgoing = |addrs: &[EmailAddress]| {
            addrs
                .iter()
                .map(|a| OutgoingRecipient {
                    email_address: OutgoingEmailAddress {
                        address: a.email.clone(),
                        name: a.name.clone(),
                    },
                })
                .collect::<Vec<_>>()
        };

        OutgoingMessage {
            subject: options.subject.clone(),
            body: OutgoingBody {
                content_type: if options.is_html { "HTML" } else { "Text" },
                content: options.body.clone(),
            },
            to_recipients: to_outgoing(&options.to),
            cc_recipients: to_outgoing(&options.cc),
            bcc_recipients: to_outgoing(&options.bcc),
        }
    }
}

impl EmailProvider for OutlookProvider {
    fn kind(&self) -> Provider {
        Provider::Outlook
    }

    fn list_messages(&self, options: &ListOptions) -> Result<ListResult> {
        let url = Self::build_list_url(options);
        let response: GraphListResponse = self.get_json(&url, None)?;

        debug!("Graph listing returned {} messages", response.value.len());

        // Graph list responses carry full message bodies already; no
        // per-id refetch is needed.
        let messages = response
            .value
            .into_iter()
            .map(normalize_message)
            .collect();

        Ok(ListResult {
            messages,
            next_page_token: response.next_link,
            total_count: None,
        })
    }

    fn get_message(&self, id: &str) -> Result<EmailMessage> {
        let url = format!("{}/me/messages/{}", Self::BASE_URL, id);
        let raw: GraphMessage = self.get_json(&url, Some(("message", id)))?;
        Ok(normalize_message(raw))
    }

    fn send_message(&self, options: &SendOptions) -> Result<()> {
        options.validate()?;

        let request = SendMailRequest {
            message: Self::build_outgoing(options),
        };

        // Replies go through the reply action so the server fills in
        // quoting and threading; everything else is a direct send.
        let url = match &options.in_reply_to {
            Some(reply_to) => format!("{}/me/messages/{}/reply", Self::BASE_URL, reply_to),
            None => format!("{}/me/sendMail", Self::BASE_URL),
        };

        info!(
            "Sending Outlook message to {} recipient(s)",
            options.to.len()
        );
        ureq::post(&url)
            .header("Authorization", &self.bearer())
            .send_json(&request)?;

        Ok(())
    }

    fn modify_labels(&self, message_id: &str, add: &[String], remove: &[String]) -> Result<()> {
        // Outlook has no label modify action; categories are replaced
        // wholesale. This read-modify-write is not atomic: a concurrent
        // category change between the read and the patch is lost.
        let url = format!("{}/me/messages/{}", Self::BASE_URL, message_id);
        let current: CategoriesOnly = self.get_json(&url, Some(("message", message_id)))?;

        let mut categories = current.categories.unwrap_or_default();
        categories.retain(|c| !remove.contains(c));
        for label in add {
            if !categories.contains(label) {
                categories.push(label.clone());
            }
        }

        info!(
            "Patching Outlook categories on {}: +{:?} -{:?}",
            message_id, add, remove
        );
        match ureq::patch(&url)
            .header("Authorization", &self.bearer())
            .send_json(&CategoriesPatch { categories })
        {
            Ok(_) => Ok(()),
            Err(ureq::Error::StatusCode(404)) => Err(Error::not_found("message", message_id)),
            Err(e) => Err(e.into()),
        }
    }

    fn get_labels(&self) -> Result<Vec<EmailLabel>> {
        let url = format!("{}/me/outlook/masterCategories", Self::BASE_URL);
        let response: CategoryListResponse = self.get_json(&url, None)?;

        // Categories are always user-defined; Graph has no system kind.
        Ok(response
            .value
            .into_iter()
            .map(|category| {
                let mut label = EmailLabel::user(category.id, category.display_name);
                if let Some(color) = category.color {
                    label = label.with_color(color);
                }
                label
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_list_url_defaults() {
        let url = OutlookProvider::build_list_url(&ListOptions::default());
        assert!(url.starts_with("https://graph.microsoft.com/v1.0/me/mailFolders/inbox/messages"));
        assert!(url.contains("%24top=50") || url.contains("$top=50"));
    }

    #[test]
    fn test_build_list_url_with_search() {
        let options = ListOptions {
            query: Some("from:alice subject:report".to_string()),
            ..Default::default()
        };
        let url = OutlookProvider::build_list_url(&options);
        assert!(url.contains("search"));
        assert!(url.contains("alice"));
    }

    #[test]
    fn test_page_token_is_used_verbatim() {
        let next_link =
            "https://graph.microsoft.com/v1.0/me/mailFolders/inbox/messages?$skip=50".to_string();
        let options = ListOptions {
            page_token: Some(next_link.clone()),
            max_results: Some(10),
            ..Default::default()
        };
        assert_eq!(OutlookProvider::build_list_url(&options), next_link);
    }

    #[test]
    fn test_build_outgoing_omits_empty_recipient_lists() {
        let options = SendOptions {
            to: vec![EmailAddress::with_name("A", "a@example.com")],
            subject: "S".to_string(),
            body: "B".to_string(),
            ..Default::default()
        };

        let outgoing = OutlookProvider::build_outgoing(&options);
        let json = serde_json::to_value(&outgoing).unwrap();
        assert_eq!(json["body"]["contentType"], "Text");
        assert_eq!(
            json["toRecipients"][0]["emailAddress"]["address"],
            "a@example.com"
        );
        assert!(json.get("ccRecipients").is_none());
        assert!(json.get("bccRecipients").is_none());
    }

    #[test]
    fn test_kind() {
        assert_eq!(OutlookProvider::new("tok").kind(), Provider::Outlook);
    }
}
