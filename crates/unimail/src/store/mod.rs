//! Durable record store for accounts, deferred-action queues, and rules
//!
//! A single SQLite database holds account records, the snooze and
//! send-later queues, and email rules. Deleting an account cascades to
//! every record it owns.

mod accounts;
mod rules;
mod send_later;
mod snooze;

pub use accounts::NewAccount;
pub use rules::UpdateRule;
pub use send_later::SendLaterEntry;
pub use snooze::SnoozeEntry;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

use crate::error::Result;

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks
/// which migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            -- Connected mailbox accounts
            CREATE TABLE accounts (
                id TEXT PRIMARY KEY,
                provider TEXT NOT NULL,
                email TEXT NOT NULL,
                name TEXT,
                access_token TEXT NOT NULL,
                refresh_token TEXT,
                token_expiry INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX idx_accounts_email ON accounts(email);

            -- Snooze queue
            CREATE TABLE snooze_entries (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                message_id TEXT NOT NULL,
                snooze_until INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
            );

            CREATE INDEX idx_snooze_account ON snooze_entries(account_id);
            CREATE INDEX idx_snooze_until ON snooze_entries(snooze_until);

            -- Send-later queue
            CREATE TABLE send_later_queue (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                to_email TEXT NOT NULL,
                subject TEXT,
                body TEXT NOT NULL,
                scheduled_time INTEGER NOT NULL,
                sent INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
            );

            CREATE INDEX idx_send_later_account ON send_later_queue(account_id);
            CREATE INDEX idx_send_later_scheduled ON send_later_queue(scheduled_time, sent);

            -- Email rules (conditions and actions stored as JSON)
            CREATE TABLE email_rules (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                name TEXT NOT NULL,
                conditions TEXT NOT NULL,
                actions TEXT NOT NULL,
                enabled INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
            );

            CREATE INDEX idx_rules_account ON email_rules(account_id);
            "#,
        ),
    ])
}

/// SQLite-backed record store
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (used by tests)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        // WAL for concurrent readers during writes; foreign_keys so
        // ON DELETE CASCADE is enforced.
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            "#,
        )?;

        migrations().to_latest(&mut conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock means another thread panicked mid-statement;
        // rusqlite connections stay usable, so recover the guard.
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Generate a new record identifier
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current time as epoch milliseconds (the stored representation)
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert stored epoch milliseconds back to a DateTime
pub(crate) fn from_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now)
}
