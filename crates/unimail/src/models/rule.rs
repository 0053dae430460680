//! Per-account email rules: stored configuration plus condition matching
//!
//! Rules are configuration data owned by an account. Matching a message
//! against a rule's conditions is implemented here as a pure function;
//! executing a rule's actions is left to callers composing the provider
//! adapter operations (archive and label changes via `modify_labels`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EmailMessage;

/// Structured predicate for matching incoming messages.
///
/// Every populated condition must hold for the rule to match; within a
/// list, any entry matching is sufficient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConditions {
    /// Sender address substrings (case-insensitive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Vec<String>>,
    /// Subject substrings (case-insensitive)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Vec<String>>,
    /// Required attachment presence
    #[serde(rename = "hasAttachment", skip_serializing_if = "Option::is_none")]
    pub has_attachment: Option<bool>,
}

/// Structured effect applied when a rule matches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleActions {
    /// Remove the message from the inbox
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<bool>,
    /// Label to add to the message
    #[serde(rename = "addLabel", skip_serializing_if = "Option::is_none")]
    pub add_label: Option<String>,
    /// Mark the message as read
    #[serde(rename = "markAsRead", skip_serializing_if = "Option::is_none")]
    pub mark_as_read: Option<bool>,
}

/// A stored email rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRule {
    /// Generated unique identifier (UUID)
    pub id: String,
    /// Owning account
    pub account_id: String,
    /// User-facing rule name
    pub name: String,
    /// Predicate checked against incoming messages
    pub conditions: RuleConditions,
    /// Effect applied on match
    pub actions: RuleActions,
    /// Disabled rules are stored but never match
    pub enabled: bool,
    /// When the rule was created
    pub created_at: DateTime<Utc>,
}

impl EmailRule {
    /// Check whether this rule's conditions hold for a message.
    ///
    /// A disabled rule never matches. A rule with no populated
    /// conditions matches nothing rather than everything.
    pub fn matches(&self, message: &EmailMessage) -> bool {
        if !self.enabled {
            return false;
        }

        let conditions = &self.conditions;
        if conditions.from.is_none()
            && conditions.subject.is_none()
            && conditions.has_attachment.is_none()
        {
            return false;
        }

        if let Some(from) = &conditions.from {
            let sender = message.from.email.to_lowercase();
            if !from.iter().any(|f| sender.contains(&f.to_lowercase())) {
                return false;
            }
        }

        if let Some(subjects) = &conditions.subject {
            let subject = message.subject.to_lowercase();
            if !subjects.iter().any(|s| subject.contains(&s.to_lowercase())) {
                return false;
            }
        }

        if let Some(wants_attachment) = conditions.has_attachment {
            if message.has_attachments != wants_attachment {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailAddress;

    fn make_rule(conditions: RuleConditions) -> EmailRule {
        EmailRule {
            id: "r1".to_string(),
            account_id: "a1".to_string(),
            name: "Test rule".to_string(),
            conditions,
            actions: RuleActions::default(),
            enabled: true,
            created_at: Utc::now(),
        }
    }

    fn make_message(from: &str, subject: &str, has_attachments: bool) -> EmailMessage {
        EmailMessage::builder("m1")
            .from(EmailAddress::new(from))
            .subject(subject)
            .has_attachments(has_attachments)
            .build()
    }

    #[test]
    fn test_matches_from_substring() {
        let rule = make_rule(RuleConditions {
            from: Some(vec!["@billing.example.com".to_string()]),
            ..Default::default()
        });

        assert!(rule.matches(&make_message("invoices@billing.example.com", "Invoice", false)));
        assert!(!rule.matches(&make_message("friend@example.com", "Invoice", false)));
    }

    #[test]
    fn test_matches_requires_all_condition_groups() {
        let rule = make_rule(RuleConditions {
            from: Some(vec!["example.com".to_string()]),
            subject: Some(vec!["invoice".to_string()]),
            has_attachment: Some(true),
        });

        assert!(rule.matches(&make_message("a@example.com", "Your Invoice", true)));
        assert!(!rule.matches(&make_message("a@example.com", "Your Invoice", false)));
        assert!(!rule.matches(&make_message("a@example.com", "Hello", true)));
    }

    #[test]
    fn test_disabled_rule_never_matches() {
        let mut rule = make_rule(RuleConditions {
            subject: Some(vec!["invoice".to_string()]),
            ..Default::default()
        });
        rule.enabled = false;

        assert!(!rule.matches(&make_message("a@example.com", "Invoice", false)));
    }

    #[test]
    fn test_empty_conditions_match_nothing() {
        let rule = make_rule(RuleConditions::default());
        assert!(!rule.matches(&make_message("a@example.com", "anything", false)));
    }

    #[test]
    fn test_conditions_serde_round_trip() {
        let conditions = RuleConditions {
            from: Some(vec!["news@".to_string()]),
            subject: None,
            has_attachment: Some(false),
        };
        let json = serde_json::to_string(&conditions).unwrap();
        assert!(json.contains("hasAttachment"));
        let back: RuleConditions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, conditions);
    }
}
