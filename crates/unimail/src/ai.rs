//! Contracts for an optional AI collaborator
//!
//! The crate itself never talks to a model; it defines the data shapes
//! an assistant exchanges with the mail layer and routes around the
//! assistant when it is absent or fails. Implementations live with the
//! embedding application.

use std::collections::{BTreeMap, HashMap};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::categorize::{self, Category};
use crate::error::Result;
use crate::models::{EmailMessage, Provider};

/// Structured filters extracted from a natural-language search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_attachment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_unread: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_before: Option<String>,
}

/// A natural-language query turned into provider search syntax
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSearch {
    /// Query string in the target provider's search syntax
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
}

/// One message's assigned category with confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Categorization {
    pub email_id: String,
    pub category: Category,
    pub confidence: f32,
}

/// A proposed label for a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSuggestion {
    pub label: String,
    pub confidence: f32,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpKind {
    Reminder,
    Task,
    Calendar,
    Archive,
    Forward,
    Reply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowUpPriority {
    High,
    Medium,
    Low,
}

/// A proposed next step for a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpSuggestion {
    pub action: String,
    #[serde(rename = "type")]
    pub kind: FollowUpKind,
    pub priority: FollowUpPriority,
    #[serde(rename = "scheduledFor", skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<String>,
}

/// The operations an AI collaborator can provide.
///
/// Object-safe so the mail layer can hold a `Box<dyn Assistant>` (or
/// none at all) without knowing which model backs it.
pub trait Assistant {
    /// Turn a natural-language query into provider search syntax
    fn parse_search(&self, query: &str, provider: Provider) -> Result<ParsedSearch>;

    /// Categorize a batch of messages
    fn categorize(&self, messages: &[EmailMessage]) -> Result<Vec<Categorization>>;

    /// Suggest labels for a message
    fn suggest_labels(&self, message: &EmailMessage) -> Result<Vec<LabelSuggestion>>;

    /// Suggest follow-up actions for a message
    fn suggest_follow_ups(&self, message: &EmailMessage) -> Result<Vec<FollowUpSuggestion>>;

    /// Draft a reply to a message, optionally steered by extra context
    fn draft_reply(&self, message: &EmailMessage, context: Option<&str>) -> Result<String>;
}

/// Bucket messages with the assistant when one is available, falling
/// back to the keyword heuristics otherwise.
///
/// An assistant failure downgrades the whole batch to heuristics; an
/// assistant that answers but skips some ids only downgrades the
/// skipped messages.
pub fn categorize_with_fallback(
    assistant: Option<&dyn Assistant>,
    messages: Vec<EmailMessage>,
) -> BTreeMap<Category, Vec<EmailMessage>> {
    let assigned: HashMap<String, Category> = match assistant {
        Some(assistant) => match assistant.categorize(&messages) {
            Ok(categorizations) => categorizations
                .into_iter()
                .map(|c| (c.email_id, c.category))
                .collect(),
            Err(err) => {
                warn!("Assistant categorization failed, using heuristics: {err}");
                HashMap::new()
            }
        },
        None => HashMap::new(),
    };

    let mut buckets: BTreeMap<Category, Vec<EmailMessage>> =
        Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
    for message in messages {
        let category = assigned
            .get(&message.id)
            .copied()
            .unwrap_or_else(|| categorize::categorize(&message));
        buckets.entry(category).or_default().push(message);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::EmailAddress;

    struct FixedAssistant {
        categorizations: Vec<Categorization>,
    }

    impl Assistant for FixedAssistant {
        fn parse_search(&self, query: &str, _provider: Provider) -> Result<ParsedSearch> {
            Ok(ParsedSearch {
                query: query.to_string(),
                filters: None,
            })
        }

        fn categorize(&self, _messages: &[EmailMessage]) -> Result<Vec<Categorization>> {
            Ok(self.categorizations.clone())
        }

        fn suggest_labels(&self, _message: &EmailMessage) -> Result<Vec<LabelSuggestion>> {
            Ok(Vec::new())
        }

        fn suggest_follow_ups(
            &self,
            _message: &EmailMessage,
        ) -> Result<Vec<FollowUpSuggestion>> {
            Ok(Vec::new())
        }

        fn draft_reply(&self, _message: &EmailMessage, _context: Option<&str>) -> Result<String> {
            Ok(String::new())
        }
    }

    struct FailingAssistant;

    impl Assistant for FailingAssistant {
        fn parse_search(&self, _query: &str, _provider: Provider) -> Result<ParsedSearch> {
            Err(Error::Validation("down".to_string()))
        }

        fn categorize(&self, _messages: &[EmailMessage]) -> Result<Vec<Categorization>> {
            Err(Error::Validation("down".to_string()))
        }

        fn suggest_labels(&self, _message: &EmailMessage) -> Result<Vec<LabelSuggestion>> {
            Err(Error::Validation("down".to_string()))
        }

        fn suggest_follow_ups(
            &self,
            _message: &EmailMessage,
        ) -> Result<Vec<FollowUpSuggestion>> {
            Err(Error::Validation("down".to_string()))
        }

        fn draft_reply(&self, _message: &EmailMessage, _context: Option<&str>) -> Result<String> {
            Err(Error::Validation("down".to_string()))
        }
    }

    fn message(id: &str, subject: &str) -> EmailMessage {
        EmailMessage::builder(id)
            .subject(subject)
            .from(EmailAddress::new("someone@example.com"))
            .build()
    }

    #[test]
    fn test_assistant_assignment_wins_over_heuristics() {
        let assistant = FixedAssistant {
            categorizations: vec![Categorization {
                email_id: "m1".to_string(),
                category: Category::Important,
                confidence: 0.9,
            }],
        };
        // Heuristics alone would put this in promotions
        let buckets =
            categorize_with_fallback(Some(&assistant), vec![message("m1", "Huge sale today")]);
        assert_eq!(buckets[&Category::Important].len(), 1);
        assert!(buckets[&Category::Promotions].is_empty());
    }

    #[test]
    fn test_skipped_ids_fall_back_per_message() {
        let assistant = FixedAssistant {
            categorizations: vec![Categorization {
                email_id: "m1".to_string(),
                category: Category::Important,
                confidence: 0.8,
            }],
        };
        let buckets = categorize_with_fallback(
            Some(&assistant),
            vec![message("m1", "hello"), message("m2", "weekly digest")],
        );
        assert_eq!(buckets[&Category::Important].len(), 1);
        assert_eq!(buckets[&Category::Newsletters].len(), 1);
    }

    #[test]
    fn test_assistant_failure_downgrades_whole_batch() {
        let buckets = categorize_with_fallback(
            Some(&FailingAssistant),
            vec![message("m1", "50% off"), message("m2", "hello")],
        );
        assert_eq!(buckets[&Category::Promotions].len(), 1);
        assert_eq!(buckets[&Category::Other].len(), 1);
    }

    #[test]
    fn test_no_assistant_uses_heuristics() {
        let buckets = categorize_with_fallback(None, vec![message("m1", "unsubscribe")]);
        assert_eq!(buckets[&Category::Newsletters].len(), 1);
    }

    #[test]
    fn test_follow_up_serde_shape() {
        let suggestion = FollowUpSuggestion {
            action: "Reply by Friday".to_string(),
            kind: FollowUpKind::Reply,
            priority: FollowUpPriority::High,
            scheduled_for: None,
        };
        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json["type"], "reply");
        assert_eq!(json["priority"], "high");
        assert!(json.get("scheduledFor").is_none());
    }
}
