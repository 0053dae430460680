//! Integration tests for the unimail crate
//!
//! These tests exercise the account store, queues and resolver together
//! against a file-backed database.

use chrono::{Duration, Utc};
use tempfile::TempDir;
use unimail::models::Provider;
use unimail::provider::resolve;
use unimail::store::{Database, NewAccount, UpdateRule};
use unimail::{Error, RuleActions, RuleConditions};

fn new_account(provider: Provider, email: &str) -> NewAccount {
    NewAccount {
        provider,
        email: email.to_string(),
        name: Some("Test User".to_string()),
        access_token: "access-token".to_string(),
        refresh_token: Some("refresh-token".to_string()),
        token_expiry: None,
    }
}

#[test]
fn test_open_creates_database_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("unimail.db");

    let db = Database::open(&path).unwrap();
    db.create_account(new_account(Provider::Gmail, "a@example.com"))
        .unwrap();
    drop(db);

    assert!(path.exists());

    // Reopen and read back
    let db = Database::open(&path).unwrap();
    let accounts = db.list_accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].email, "a@example.com");
}

#[test]
fn test_resolver_maps_provider_to_adapter() {
    let db = Database::open_in_memory().unwrap();
    let gmail = db
        .create_account(new_account(Provider::Gmail, "g@example.com"))
        .unwrap();
    let outlook = db
        .create_account(new_account(Provider::Outlook, "o@example.com"))
        .unwrap();

    assert_eq!(resolve(&gmail).unwrap().kind(), Provider::Gmail);
    assert_eq!(resolve(&outlook).unwrap().kind(), Provider::Outlook);
}

#[test]
fn test_unknown_provider_string_is_rejected_before_resolve() {
    let err = Provider::parse("yahoo").unwrap_err();
    assert!(matches!(err, Error::UnsupportedProvider(_)));
}

#[test]
fn test_reconnect_updates_rather_than_duplicates() {
    let db = Database::open_in_memory().unwrap();
    let first = db
        .create_account(new_account(Provider::Gmail, "user@example.com"))
        .unwrap();

    // Second connect of the same mailbox refreshes tokens in place
    db.update_tokens(&first.id, "new-access", Some("new-refresh"), Some(3600))
        .unwrap();

    let accounts = db.list_accounts().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].access_token, "new-access");
    assert!(accounts[0].token_expiry.is_some());
}

#[test]
fn test_same_email_on_both_providers_coexists() {
    let db = Database::open_in_memory().unwrap();
    db.create_account(new_account(Provider::Gmail, "user@example.com"))
        .unwrap();
    db.create_account(new_account(Provider::Outlook, "user@example.com"))
        .unwrap();

    assert_eq!(db.list_accounts().unwrap().len(), 2);
    assert!(
        db.account_for_mailbox(Provider::Gmail, "user@example.com")
            .unwrap()
            .is_some()
    );
    assert!(
        db.account_for_mailbox(Provider::Outlook, "user@example.com")
            .unwrap()
            .is_some()
    );
}

#[test]
fn test_ready_queues_cross_accounts() {
    let db = Database::open_in_memory().unwrap();
    let a = db
        .create_account(new_account(Provider::Gmail, "a@example.com"))
        .unwrap();
    let b = db
        .create_account(new_account(Provider::Outlook, "b@example.com"))
        .unwrap();
    let now = Utc::now();

    db.create_snooze(&a.id, "m-a", now - Duration::minutes(10))
        .unwrap();
    db.create_snooze(&b.id, "m-b", now - Duration::minutes(5))
        .unwrap();
    db.create_snooze(&b.id, "m-future", now + Duration::hours(1))
        .unwrap();

    // ready_snoozes is global: one poll surfaces entries for every account
    let ready = db.ready_snoozes(now).unwrap();
    assert_eq!(ready.len(), 2);
    assert_eq!(ready[0].message_id, "m-a");
    assert_eq!(ready[1].message_id, "m-b");
}

#[test]
fn test_send_later_dispatch_cycle() {
    let db = Database::open_in_memory().unwrap();
    let account = db
        .create_account(new_account(Provider::Outlook, "o@example.com"))
        .unwrap();
    let now = Utc::now();

    let entry = db
        .create_send_later(
            &account.id,
            "dest@example.com",
            Some("Later"),
            "body",
            now - Duration::minutes(1),
        )
        .unwrap();

    let ready = db.ready_sends(now).unwrap();
    assert_eq!(ready.len(), 1);

    db.mark_sent(&entry.id).unwrap();
    assert!(db.ready_sends(now).unwrap().is_empty());

    // Dispatched entries remain visible in the account listing
    let all = db.sends_for_account(&account.id).unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].sent);
}

#[test]
fn test_deleting_account_cascades_to_its_rows_only() {
    let db = Database::open_in_memory().unwrap();
    let doomed = db
        .create_account(new_account(Provider::Gmail, "doomed@example.com"))
        .unwrap();
    let kept = db
        .create_account(new_account(Provider::Gmail, "kept@example.com"))
        .unwrap();
    let now = Utc::now();

    db.create_snooze(&doomed.id, "m1", now).unwrap();
    db.create_send_later(&doomed.id, "x@example.com", None, "b", now)
        .unwrap();
    db.create_rule(
        &doomed.id,
        "r",
        RuleConditions::default(),
        RuleActions::default(),
    )
    .unwrap();

    let survivor_snooze = db.create_snooze(&kept.id, "m2", now).unwrap();

    db.delete_account(&doomed.id).unwrap();

    assert!(db.account(&doomed.id).unwrap().is_none());
    assert!(db.snoozes_for_account(&doomed.id).unwrap().is_empty());
    assert!(db.sends_for_account(&doomed.id).unwrap().is_empty());
    assert!(db.rules_for_account(&doomed.id).unwrap().is_empty());

    let remaining = db.snoozes_for_account(&kept.id).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, survivor_snooze.id);
}

#[test]
fn test_rule_lifecycle() {
    let db = Database::open_in_memory().unwrap();
    let account = db
        .create_account(new_account(Provider::Gmail, "g@example.com"))
        .unwrap();

    let conditions = RuleConditions {
        from: Some(vec!["billing@vendor.example".to_string()]),
        subject: None,
        has_attachment: None,
    };
    let actions = RuleActions {
        archive: None,
        add_label: Some("Receipts".to_string()),
        mark_as_read: Some(true),
    };

    let rule = db
        .create_rule(&account.id, "File receipts", conditions, actions)
        .unwrap();
    assert!(rule.enabled);

    db.update_rule(
        &rule.id,
        UpdateRule {
            enabled: Some(false),
            ..Default::default()
        },
    )
    .unwrap();

    assert!(db.enabled_rules_for_account(&account.id).unwrap().is_empty());
    assert_eq!(db.rules_for_account(&account.id).unwrap().len(), 1);

    db.delete_rule(&rule.id).unwrap();
    assert!(db.rule(&rule.id).unwrap().is_none());
}
