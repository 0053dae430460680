//! Heuristic inbox categorization
//!
//! Buckets a message into one of five categories using keyword and
//! sender-domain checks against the subject, snippet and from address.
//! Checks run in a fixed order and the first hit wins, so a starred
//! "unsubscribe" digest still lands in newsletters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::EmailMessage;

/// Inbox bucket assigned by [`categorize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Important,
    Newsletters,
    Social,
    Promotions,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Important,
        Category::Newsletters,
        Category::Social,
        Category::Promotions,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Important => "important",
            Category::Newsletters => "newsletters",
            Category::Social => "social",
            Category::Promotions => "promotions",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const NEWSLETTER_PATTERNS: &[&str] = &[
    "unsubscribe",
    "newsletter",
    "weekly digest",
    "daily digest",
    "mailing list",
    "view in browser",
];

const SOCIAL_DOMAINS: &[&str] = &[
    "facebook.com",
    "twitter.com",
    "linkedin.com",
    "instagram.com",
    "pinterest.com",
    "reddit.com",
];

const PROMOTION_WORDS: &[&str] = &[
    "sale",
    "discount",
    "offer",
    "deal",
    "coupon",
    "promo",
    "% off",
    "limited time",
    "free shipping",
];

const IMPORTANT_WORDS: &[&str] = &[
    "urgent",
    "important",
    "action required",
    "deadline",
    "asap",
    "critical",
    "alert",
    "verify",
    "confirm",
];

fn any_in(haystacks: &[&str], needles: &[&str]) -> bool {
    needles
        .iter()
        .any(|needle| haystacks.iter().any(|hay| hay.contains(needle)))
}

/// Assign an inbox bucket to a message
pub fn categorize(message: &EmailMessage) -> Category {
    let subject = message.subject.to_lowercase();
    let snippet = message.snippet.to_lowercase();
    let from = message.from.email.to_lowercase();
    let text = [subject.as_str(), snippet.as_str()];

    if any_in(&text, NEWSLETTER_PATTERNS) {
        return Category::Newsletters;
    }
    if SOCIAL_DOMAINS.iter().any(|domain| from.contains(domain)) {
        return Category::Social;
    }
    if any_in(&text, PROMOTION_WORDS) {
        return Category::Promotions;
    }
    if message.is_starred || any_in(&text, IMPORTANT_WORDS) {
        return Category::Important;
    }
    Category::Other
}

/// Bucket a batch of messages. Every category is present in the result,
/// empty buckets included.
pub fn categorize_all(messages: Vec<EmailMessage>) -> BTreeMap<Category, Vec<EmailMessage>> {
    let mut buckets: BTreeMap<Category, Vec<EmailMessage>> =
        Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
    for message in messages {
        let category = categorize(&message);
        buckets.entry(category).or_default().push(message);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailAddress;

    fn message(subject: &str, snippet: &str, from: &str) -> EmailMessage {
        EmailMessage::builder("m1")
            .subject(subject)
            .snippet(snippet)
            .from(EmailAddress::new(from))
            .build()
    }

    #[test]
    fn test_unsubscribe_snippet_is_newsletter() {
        let msg = message("Your week in review", "Click unsubscribe to stop", "a@b.com");
        assert_eq!(categorize(&msg), Category::Newsletters);
    }

    #[test]
    fn test_social_domain_sender() {
        let msg = message("You have a new follower", "", "notify@twitter.com");
        assert_eq!(categorize(&msg), Category::Social);
    }

    #[test]
    fn test_promotion_keyword_in_subject() {
        let msg = message("50% off everything", "", "shop@store.example");
        assert_eq!(categorize(&msg), Category::Promotions);
    }

    #[test]
    fn test_urgency_word_is_important() {
        let msg = message("Action required: confirm your address", "", "it@corp.example");
        assert_eq!(categorize(&msg), Category::Important);
    }

    #[test]
    fn test_starred_without_keywords_is_important() {
        let mut msg = message("Lunch tomorrow?", "See you at noon", "friend@example.com");
        msg.is_starred = true;
        assert_eq!(categorize(&msg), Category::Important);
    }

    #[test]
    fn test_plain_message_is_other() {
        let msg = message("Lunch tomorrow?", "See you at noon", "friend@example.com");
        assert_eq!(categorize(&msg), Category::Other);
    }

    #[test]
    fn test_newsletter_check_precedes_urgency() {
        // "URGENT" would match important, but the unsubscribe hit runs first
        let msg = message("URGENT: unsubscribe now", "", "spam@example.com");
        assert_eq!(categorize(&msg), Category::Newsletters);
    }

    #[test]
    fn test_starred_newsletter_stays_newsletter() {
        let mut msg = message("Weekly digest", "", "news@example.com");
        msg.is_starred = true;
        assert_eq!(categorize(&msg), Category::Newsletters);
    }

    #[test]
    fn test_categorize_all_seeds_empty_buckets() {
        let buckets = categorize_all(vec![message("50% off", "", "shop@x.com")]);
        assert_eq!(buckets.len(), Category::ALL.len());
        assert_eq!(buckets[&Category::Promotions].len(), 1);
        assert!(buckets[&Category::Other].is_empty());
    }
}
