//! Send-later queue: outgoing messages scheduled for a future time
//!
//! Rows carry a single recipient address. Entries whose scheduled time
//! has already passed are the caller's responsibility: the composing
//! layer sends those immediately instead of queueing them, so the queue
//! only ever holds genuinely future sends (plus any the poller has not
//! picked up yet).

use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use super::{Database, from_millis, new_id, now_millis};
use crate::error::Result;

/// A queued outgoing message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendLaterEntry {
    pub id: String,
    /// Sending account
    pub account_id: String,
    /// Single recipient address
    pub to_email: String,
    pub subject: Option<String>,
    pub body: String,
    /// When the message should go out
    pub scheduled_time: DateTime<Utc>,
    /// Set once the poller has dispatched the message
    pub sent: bool,
    pub created_at: DateTime<Utc>,
}

impl SendLaterEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            account_id: row.get(1)?,
            to_email: row.get(2)?,
            subject: row.get(3)?,
            body: row.get(4)?,
            scheduled_time: from_millis(row.get(5)?),
            sent: row.get::<_, i64>(6)? != 0,
            created_at: from_millis(row.get(7)?),
        })
    }
}

const SEND_LATER_COLUMNS: &str =
    "id, account_id, to_email, subject, body, scheduled_time, sent, created_at";

impl Database {
    /// Queue a message for a future send.
    ///
    /// Only the first recipient is persisted; additional To/Cc/Bcc
    /// addresses are dropped at compose time before this call.
    pub fn create_send_later(
        &self,
        account_id: &str,
        to_email: &str,
        subject: Option<&str>,
        body: &str,
        scheduled_time: DateTime<Utc>,
    ) -> Result<SendLaterEntry> {
        let id = new_id();
        let now = now_millis();

        self.conn().execute(
            "INSERT INTO send_later_queue \
             (id, account_id, to_email, subject, body, scheduled_time, sent, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
            params![
                id,
                account_id,
                to_email,
                subject,
                body,
                scheduled_time.timestamp_millis(),
                now
            ],
        )?;

        info!(
            "Queued send to {} from account {} for {}",
            to_email, account_id, scheduled_time
        );

        Ok(SendLaterEntry {
            id,
            account_id: account_id.to_string(),
            to_email: to_email.to_string(),
            subject: subject.map(str::to_string),
            body: body.to_string(),
            scheduled_time,
            sent: false,
            created_at: from_millis(now),
        })
    }

    /// Get a queued send by id
    pub fn send_later_entry(&self, id: &str) -> Result<Option<SendLaterEntry>> {
        let conn = self.conn();
        let entry = conn
            .query_row(
                &format!("SELECT {SEND_LATER_COLUMNS} FROM send_later_queue WHERE id = ?1"),
                [id],
                SendLaterEntry::from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// List an account's queued sends (sent and unsent), earliest first
    pub fn sends_for_account(&self, account_id: &str) -> Result<Vec<SendLaterEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SEND_LATER_COLUMNS} FROM send_later_queue \
             WHERE account_id = ?1 ORDER BY scheduled_time ASC"
        ))?;
        let entries = stmt
            .query_map([account_id], SendLaterEntry::from_row)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(entries)
    }

    /// List every unsent entry due at or before `now`, earliest first
    pub fn ready_sends(&self, now: DateTime<Utc>) -> Result<Vec<SendLaterEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SEND_LATER_COLUMNS} FROM send_later_queue \
             WHERE scheduled_time <= ?1 AND sent = 0 ORDER BY scheduled_time ASC"
        ))?;
        let entries = stmt
            .query_map([now.timestamp_millis()], SendLaterEntry::from_row)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(entries)
    }

    /// Mark a queued send as dispatched. One-way: there is no unsend,
    /// and marking an already-sent or absent entry is a no-op.
    pub fn mark_sent(&self, id: &str) -> Result<()> {
        self.conn()
            .execute("UPDATE send_later_queue SET sent = 1 WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Delete a queued send; deleting an absent id is a no-op
    pub fn delete_send_later(&self, id: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM send_later_queue WHERE id = ?1", [id])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;
    use crate::store::NewAccount;
    use chrono::Duration;

    fn db_with_account() -> (Database, String) {
        let db = Database::open_in_memory().unwrap();
        let account = db
            .create_account(NewAccount {
                provider: Provider::Outlook,
                email: "user@example.com".to_string(),
                name: None,
                access_token: "tok".to_string(),
                refresh_token: None,
                token_expiry: None,
            })
            .unwrap();
        (db, account.id)
    }

    #[test]
    fn test_create_and_fetch() {
        let (db, account_id) = db_with_account();
        let when = Utc::now() + Duration::hours(1);

        let entry = db
            .create_send_later(&account_id, "dest@example.com", Some("Hi"), "body", when)
            .unwrap();
        assert!(!entry.sent);

        let fetched = db.send_later_entry(&entry.id).unwrap().unwrap();
        assert_eq!(fetched.to_email, "dest@example.com");
        assert_eq!(fetched.subject.as_deref(), Some("Hi"));
        assert_eq!(fetched.body, "body");
        assert!(!fetched.sent);
    }

    #[test]
    fn test_ready_sends_excludes_future_and_sent() {
        let (db, account_id) = db_with_account();
        let now = Utc::now();

        let due = db
            .create_send_later(&account_id, "a@example.com", None, "b", now - Duration::minutes(1))
            .unwrap();
        let dispatched = db
            .create_send_later(&account_id, "b@example.com", None, "b", now - Duration::hours(1))
            .unwrap();
        db.create_send_later(&account_id, "c@example.com", None, "b", now + Duration::hours(1))
            .unwrap();

        db.mark_sent(&dispatched.id).unwrap();

        let ready = db.ready_sends(now).unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id, due.id);
    }

    #[test]
    fn test_ready_sends_ordered_ascending() {
        let (db, account_id) = db_with_account();
        let now = Utc::now();

        db.create_send_later(&account_id, "b@example.com", None, "b", now - Duration::minutes(5))
            .unwrap();
        db.create_send_later(&account_id, "a@example.com", None, "b", now - Duration::minutes(30))
            .unwrap();

        let ready = db.ready_sends(now).unwrap();
        let tos: Vec<&str> = ready.iter().map(|e| e.to_email.as_str()).collect();
        assert_eq!(tos, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn test_mark_sent_is_idempotent() {
        let (db, account_id) = db_with_account();
        let entry = db
            .create_send_later(&account_id, "a@example.com", None, "b", Utc::now())
            .unwrap();

        db.mark_sent(&entry.id).unwrap();
        db.mark_sent(&entry.id).unwrap();
        db.mark_sent("never-existed").unwrap();

        assert!(db.send_later_entry(&entry.id).unwrap().unwrap().sent);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (db, account_id) = db_with_account();
        let entry = db
            .create_send_later(&account_id, "a@example.com", None, "b", Utc::now())
            .unwrap();

        db.delete_send_later(&entry.id).unwrap();
        db.delete_send_later(&entry.id).unwrap();

        assert!(db.send_later_entry(&entry.id).unwrap().is_none());
    }
}
