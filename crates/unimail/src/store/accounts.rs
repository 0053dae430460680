//! Account record operations
//!
//! An account is created on the first successful OAuth handshake for a
//! mailbox and its token material is overwritten on every later
//! handshake or refresh. Deleting an account cascades to its snooze,
//! send-later, and rule records.

use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{OptionalExtension, Row, params};

use super::{Database, from_millis, new_id, now_millis};
use crate::error::Result;
use crate::models::{Account, Provider};
use crate::oauth::TokenPayload;

/// Fields for creating a new account record
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub provider: Provider,
    pub email: String,
    pub name: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
}

/// An account row before the provider string has been validated
struct RawAccount {
    id: String,
    provider: String,
    email: String,
    name: Option<String>,
    access_token: String,
    refresh_token: Option<String>,
    token_expiry: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl RawAccount {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            provider: row.get(1)?,
            email: row.get(2)?,
            name: row.get(3)?,
            access_token: row.get(4)?,
            refresh_token: row.get(5)?,
            token_expiry: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn into_account(self) -> Result<Account> {
        Ok(Account {
            provider: Provider::parse(&self.provider)?,
            id: self.id,
            email: self.email,
            name: self.name,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_expiry: self.token_expiry.map(from_millis),
            created_at: from_millis(self.created_at),
            updated_at: from_millis(self.updated_at),
        })
    }
}

const ACCOUNT_COLUMNS: &str = "id, provider, email, name, access_token, refresh_token, \
     token_expiry, created_at, updated_at";

impl Database {
    /// Insert a new account record
    pub fn create_account(&self, new: NewAccount) -> Result<Account> {
        let id = new_id();
        let now = now_millis();

        self.conn().execute(
            "INSERT INTO accounts \
             (id, provider, email, name, access_token, refresh_token, token_expiry, \
              created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                new.provider.as_str(),
                new.email,
                new.name,
                new.access_token,
                new.refresh_token,
                new.token_expiry.map(|t| t.timestamp_millis()),
                now,
                now,
            ],
        )?;

        info!("Created {} account for {}", new.provider, new.email);

        Ok(Account {
            id,
            provider: new.provider,
            email: new.email,
            name: new.name,
            access_token: new.access_token,
            refresh_token: new.refresh_token,
            token_expiry: new.token_expiry,
            created_at: from_millis(now),
            updated_at: from_millis(now),
        })
    }

    /// Get an account by id
    pub fn account(&self, id: &str) -> Result<Option<Account>> {
        let conn = self.conn();
        let raw = conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
                [id],
                RawAccount::from_row,
            )
            .optional()?;
        raw.map(RawAccount::into_account).transpose()
    }

    /// Get the first account matching an email address
    pub fn account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let conn = self.conn();
        let raw = conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1"),
                [email],
                RawAccount::from_row,
            )
            .optional()?;
        raw.map(RawAccount::into_account).transpose()
    }

    /// Get the account for a (provider, email) pair — the dedup key
    /// for reconnects
    pub fn account_for_mailbox(&self, provider: Provider, email: &str) -> Result<Option<Account>> {
        let conn = self.conn();
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts \
                     WHERE provider = ?1 AND email = ?2"
                ),
                params![provider.as_str(), email],
                RawAccount::from_row,
            )
            .optional()?;
        raw.map(RawAccount::into_account).transpose()
    }

    /// List all accounts, newest first
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY created_at DESC"
        ))?;

        let raws: Vec<RawAccount> = stmt
            .query_map([], RawAccount::from_row)?
            .collect::<rusqlite::Result<_>>()?;

        raws.into_iter().map(RawAccount::into_account).collect()
    }

    /// Overwrite an account's token material
    pub fn update_tokens(
        &self,
        id: &str,
        access_token: &str,
        refresh_token: Option<&str>,
        expires_in: Option<i64>,
    ) -> Result<()> {
        let now = now_millis();
        let token_expiry = expires_in.map(|secs| now + secs * 1000);

        self.conn().execute(
            "UPDATE accounts \
             SET access_token = ?1, refresh_token = ?2, token_expiry = ?3, updated_at = ?4 \
             WHERE id = ?5",
            params![access_token, refresh_token, token_expiry, now, id],
        )?;

        Ok(())
    }

    /// Apply a completed OAuth handshake: update the existing account's
    /// tokens if this mailbox is already connected through this
    /// provider, otherwise create a new account.
    ///
    /// The same email connected through two different providers yields
    /// two accounts.
    pub fn upsert_account_from_token(
        &self,
        provider: Provider,
        payload: &TokenPayload,
    ) -> Result<Account> {
        if let Some(existing) = self.account_for_mailbox(provider, &payload.email)? {
            info!("Reconnected {} account for {}", provider, payload.email);
            self.update_tokens(
                &existing.id,
                &payload.access_token,
                payload.refresh_token.as_deref(),
                payload.expires_in,
            )?;
            // Re-read for the refreshed token material and updated_at
            return self
                .account(&existing.id)
                .map(|account| account.unwrap_or(existing));
        }

        self.create_account(NewAccount {
            provider,
            email: payload.email.clone(),
            name: payload.name.clone(),
            access_token: payload.access_token.clone(),
            refresh_token: payload.refresh_token.clone(),
            token_expiry: payload
                .expires_in
                .map(|secs| from_millis(now_millis() + secs * 1000)),
        })
    }

    /// Delete an account and, via cascade, all of its snooze,
    /// send-later, and rule records
    pub fn delete_account(&self, id: &str) -> Result<()> {
        let deleted = self
            .conn()
            .execute("DELETE FROM accounts WHERE id = ?1", [id])?;
        if deleted > 0 {
            info!("Deleted account {}", id);
        }
        Ok(())
    }
}
