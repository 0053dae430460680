//! Snooze queue: hide a message from the active view until a time
//!
//! Entries are promoted by an external poller calling [`Database::ready_snoozes`]
//! periodically; the poller acts on each returned entry and then deletes
//! it. The queue never self-cleans.

use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use super::{Database, from_millis, new_id, now_millis};
use crate::error::Result;

/// A scheduled message reappearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnoozeEntry {
    pub id: String,
    /// Owning account
    pub account_id: String,
    /// Provider-native message ID being hidden
    pub message_id: String,
    /// When the message should surface again
    pub snooze_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SnoozeEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            account_id: row.get(1)?,
            message_id: row.get(2)?,
            snooze_until: from_millis(row.get(3)?),
            created_at: from_millis(row.get(4)?),
        })
    }
}

const SNOOZE_COLUMNS: &str = "id, account_id, message_id, snooze_until, created_at";

impl Database {
    /// Insert a snooze entry.
    ///
    /// No dedup: snoozing the same message twice yields two independent
    /// entries, and both surface when due.
    pub fn create_snooze(
        &self,
        account_id: &str,
        message_id: &str,
        snooze_until: DateTime<Utc>,
    ) -> Result<SnoozeEntry> {
        let id = new_id();
        let now = now_millis();

        self.conn().execute(
            "INSERT INTO snooze_entries (id, account_id, message_id, snooze_until, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                account_id,
                message_id,
                snooze_until.timestamp_millis(),
                now
            ],
        )?;

        info!(
            "Snoozed message {} on account {} until {}",
            message_id, account_id, snooze_until
        );

        Ok(SnoozeEntry {
            id,
            account_id: account_id.to_string(),
            message_id: message_id.to_string(),
            snooze_until,
            created_at: from_millis(now),
        })
    }

    /// Get a snooze entry by id
    pub fn snooze(&self, id: &str) -> Result<Option<SnoozeEntry>> {
        let conn = self.conn();
        let entry = conn
            .query_row(
                &format!("SELECT {SNOOZE_COLUMNS} FROM snooze_entries WHERE id = ?1"),
                [id],
                SnoozeEntry::from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// List an account's snooze entries, soonest first
    pub fn snoozes_for_account(&self, account_id: &str) -> Result<Vec<SnoozeEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SNOOZE_COLUMNS} FROM snooze_entries \
             WHERE account_id = ?1 ORDER BY snooze_until ASC"
        ))?;
        let entries = stmt
            .query_map([account_id], SnoozeEntry::from_row)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(entries)
    }

    /// List every entry due at or before `now`, soonest first.
    ///
    /// The caller is responsible for acting on each returned entry and
    /// then deleting it.
    pub fn ready_snoozes(&self, now: DateTime<Utc>) -> Result<Vec<SnoozeEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SNOOZE_COLUMNS} FROM snooze_entries \
             WHERE snooze_until <= ?1 ORDER BY snooze_until ASC"
        ))?;
        let entries = stmt
            .query_map([now.timestamp_millis()], SnoozeEntry::from_row)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(entries)
    }

    /// Delete a snooze entry; deleting an absent id is a no-op
    pub fn delete_snooze(&self, id: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM snooze_entries WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Delete every snooze entry for a message; absent rows are a no-op
    pub fn delete_snoozes_for_message(&self, account_id: &str, message_id: &str) -> Result<()> {
        self.conn().execute(
            "DELETE FROM snooze_entries WHERE account_id = ?1 AND message_id = ?2",
            params![account_id, message_id],
        )?;
        Ok(())
    }
}
