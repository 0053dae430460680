//! Unimail - multi-provider email abstraction
//!
//! This crate provides a single surface over Gmail and Outlook/Graph:
//! - Unified domain models (EmailMessage, EmailLabel, Account)
//! - Provider adapters behind one trait, picked by a resolver
//! - SQLite-backed account records, snooze and send-later queues, and
//!   filtering rules
//! - Heuristic inbox categorization with an optional AI collaborator
//! - OAuth2 code exchange and token refresh for both providers
//!
//! This crate has zero UI dependencies; the embedding application owns
//! scheduling (queue polling) and any assistant implementation.

pub mod ai;
pub mod categorize;
pub mod error;
pub mod models;
pub mod oauth;
pub mod provider;
pub mod store;

pub use ai::{Assistant, Categorization, FollowUpSuggestion, LabelSuggestion, ParsedSearch, SearchFilters, categorize_with_fallback};
pub use categorize::{Category, categorize, categorize_all};
pub use error::{Error, Result};
pub use models::{Account, EmailAddress, EmailAttachment, EmailLabel, EmailMessage, EmailRule, LabelKind, Provider, RuleActions, RuleConditions, system_labels};
pub use oauth::{OauthCredentials, TokenPayload, authorization_url, exchange_code, refresh_access_token};
pub use provider::{
    EmailProvider, ListOptions, ListResult, SendOptions, resolve,
    gmail::GmailProvider, outlook::OutlookProvider,
};
pub use store::{Database, NewAccount, SendLaterEntry, SnoozeEntry, UpdateRule};
