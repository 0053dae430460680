//! Connected mailbox account and provider identification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The remote provider backing an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gmail,
    Outlook,
}

impl Provider {
    /// Parse a provider name as stored in account records.
    ///
    /// Any value outside the known set fails with `UnsupportedProvider`;
    /// this is the single point where unknown providers are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "gmail" => Ok(Self::Gmail),
            "outlook" => Ok(Self::Outlook),
            other => Err(Error::UnsupportedProvider(other.to_string())),
        }
    }

    /// The stable name used in storage and wire formats
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gmail => "gmail",
            Self::Outlook => "outlook",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connected mailbox: provider kind, identity, and current OAuth
/// token material.
///
/// At most one account exists per mailbox email; reconnecting the same
/// email updates the existing record's tokens. The same email connected
/// through two different providers yields two accounts.
///
/// Token fields are mutated only by the OAuth handshake path; adapters
/// take a read-only snapshot at construction and never observe a later
/// refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Generated unique identifier (UUID)
    pub id: String,
    /// Which provider backs this mailbox
    pub provider: Provider,
    /// Mailbox email address (natural key for upsert-on-reconnect)
    pub email: String,
    /// Display name, if known
    pub name: Option<String>,
    /// Current bearer credential
    pub access_token: String,
    /// Refresh token, when the provider granted one
    pub refresh_token: Option<String>,
    /// When the access token expires
    pub token_expiry: Option<DateTime<Utc>>,
    /// When the account was first connected
    pub created_at: DateTime<Utc>,
    /// When the account record was last modified
    pub updated_at: DateTime<Utc>,
}
