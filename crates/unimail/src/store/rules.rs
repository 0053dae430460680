//! Persistence for filtering rules
//!
//! Conditions and actions are stored as JSON text columns so the rule
//! shape can grow without a migration.

use log::info;
use rusqlite::{OptionalExtension, Row, params};

use super::{Database, from_millis, new_id, now_millis};
use crate::error::Result;
use crate::models::{EmailRule, RuleActions, RuleConditions};

/// Partial update for a rule; `None` fields are left untouched
#[derive(Debug, Default, Clone)]
pub struct UpdateRule {
    pub name: Option<String>,
    pub conditions: Option<RuleConditions>,
    pub actions: Option<RuleActions>,
    pub enabled: Option<bool>,
}

fn from_row(row: &Row) -> rusqlite::Result<EmailRule> {
    let conditions_json: String = row.get(3)?;
    let actions_json: String = row.get(4)?;
    let conditions = serde_json::from_str(&conditions_json).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(err))
    })?;
    let actions = serde_json::from_str(&actions_json).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(err))
    })?;
    Ok(EmailRule {
        id: row.get(0)?,
        account_id: row.get(1)?,
        name: row.get(2)?,
        conditions,
        actions,
        enabled: row.get::<_, i64>(5)? != 0,
        created_at: from_millis(row.get(6)?),
    })
}

const RULE_COLUMNS: &str = "id, account_id, name, conditions, actions, enabled, created_at";

impl Database {
    /// Create a rule; new rules start enabled
    pub fn create_rule(
        &self,
        account_id: &str,
        name: &str,
        conditions: RuleConditions,
        actions: RuleActions,
    ) -> Result<EmailRule> {
        let id = new_id();
        let now = now_millis();
        let conditions_json = serde_json::to_string(&conditions)?;
        let actions_json = serde_json::to_string(&actions)?;

        self.conn().execute(
            "INSERT INTO email_rules (id, account_id, name, conditions, actions, enabled, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
            params![id, account_id, name, conditions_json, actions_json, now],
        )?;

        info!("Created rule '{}' for account {}", name, account_id);

        Ok(EmailRule {
            id,
            account_id: account_id.to_string(),
            name: name.to_string(),
            conditions,
            actions,
            enabled: true,
            created_at: from_millis(now),
        })
    }

    /// Get a rule by id
    pub fn rule(&self, id: &str) -> Result<Option<EmailRule>> {
        let conn = self.conn();
        let rule = conn
            .query_row(
                &format!("SELECT {RULE_COLUMNS} FROM email_rules WHERE id = ?1"),
                [id],
                from_row,
            )
            .optional()?;
        Ok(rule)
    }

    /// List an account's rules, newest first
    pub fn rules_for_account(&self, account_id: &str) -> Result<Vec<EmailRule>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RULE_COLUMNS} FROM email_rules \
             WHERE account_id = ?1 ORDER BY created_at DESC"
        ))?;
        let rules = stmt
            .query_map([account_id], from_row)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(rules)
    }

    /// List only the rules that should run against incoming mail
    pub fn enabled_rules_for_account(&self, account_id: &str) -> Result<Vec<EmailRule>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {RULE_COLUMNS} FROM email_rules \
             WHERE account_id = ?1 AND enabled = 1 ORDER BY created_at DESC"
        ))?;
        let rules = stmt
            .query_map([account_id], from_row)?
            .collect::<rusqlite::Result<_>>()?;
        Ok(rules)
    }

    /// Apply a partial update and return the updated rule
    pub fn update_rule(&self, id: &str, update: UpdateRule) -> Result<EmailRule> {
        let Some(mut rule) = self.rule(id)? else {
            return Err(crate::error::Error::not_found("rule", id));
        };

        if let Some(name) = update.name {
            rule.name = name;
        }
        if let Some(conditions) = update.conditions {
            rule.conditions = conditions;
        }
        if let Some(actions) = update.actions {
            rule.actions = actions;
        }
        if let Some(enabled) = update.enabled {
            rule.enabled = enabled;
        }

        let conditions_json = serde_json::to_string(&rule.conditions)?;
        let actions_json = serde_json::to_string(&rule.actions)?;

        self.conn().execute(
            "UPDATE email_rules SET name = ?1, conditions = ?2, actions = ?3, enabled = ?4 \
             WHERE id = ?5",
            params![rule.name, conditions_json, actions_json, rule.enabled as i64, id],
        )?;

        Ok(rule)
    }

    /// Delete a rule; deleting an absent id is a no-op
    pub fn delete_rule(&self, id: &str) -> Result<()> {
        self.conn()
            .execute("DELETE FROM email_rules WHERE id = ?1", [id])?;
        Ok(())
    }
}
