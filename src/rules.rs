//! Rule store and rule ingestion
//!
//! Rules and keywords are append-only. A keyword belongs to exactly one rule;
//! lookups are exact string matches on the keyword primary key.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::{constraint_violation, ClassifierError, Constraint, Result};
use crate::metrics;
use crate::models::{ClassificationRule, RuleCreateRequest, RuleDetails, RuleKeyword};
use crate::schema::{classification_rules as rules, rule_keywords as keywords};
use crate::validation::InputValidator;

/// Durable storage and lookup of rules and keyword mappings
#[derive(Clone)]
pub struct RuleStore {
    db: Database,
}

impl RuleStore {
    /// Create a rule store over an existing database handle
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a rule record.
    ///
    /// Fails with [`ClassifierError::DuplicateKey`] if the id is taken.
    pub fn add_rule(&self, rule: &ClassificationRule) -> Result<()> {
        let conn = self.db.get_connection()?;
        insert_rule(&conn, rule)
    }

    /// Insert a keyword mapping.
    ///
    /// Fails with [`ClassifierError::DuplicateKey`] if the keyword is already
    /// owned, or [`ClassifierError::ForeignKey`] if `rule_id` is unknown.
    pub fn add_keyword(&self, keyword: &str, rule_id: &str) -> Result<()> {
        let conn = self.db.get_connection()?;
        insert_keyword(
            &conn,
            &RuleKeyword {
                keyword: keyword.to_string(),
                rule_id: rule_id.to_string(),
            },
        )
    }

    /// Find the rule owning `keyword`.
    ///
    /// Should several rows ever share a keyword, the earliest inserted wins.
    pub fn find_rule_by_keyword(&self, keyword: &str) -> Result<Option<ClassificationRule>> {
        let conn = self.db.get_connection()?;

        let rule = conn
            .query_row(
                &format!(
                    "SELECT r.* FROM {rules} r \
                     JOIN {keywords} k ON k.{rule_id} = r.{id} \
                     WHERE k.{keyword} = ? ORDER BY k.rowid ASC LIMIT 1",
                    id = rules::ID,
                    rules = rules::TABLE,
                    keywords = keywords::TABLE,
                    rule_id = keywords::RULE_ID,
                    keyword = keywords::KEYWORD,
                ),
                params![keyword],
                map_rule,
            )
            .optional()?;

        Ok(rule)
    }

    /// Get a rule by id
    pub fn get_rule(&self, rule_id: &str) -> Result<Option<ClassificationRule>> {
        let conn = self.db.get_connection()?;

        let rule = conn
            .query_row(
                &format!("SELECT * FROM {} WHERE {} = ?", rules::TABLE, rules::ID),
                params![rule_id],
                map_rule,
            )
            .optional()?;

        Ok(rule)
    }

    /// Keywords owned by a rule, in insertion order
    pub fn keywords_for_rule(&self, rule_id: &str) -> Result<Vec<String>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} WHERE {} = ? ORDER BY rowid ASC",
            keywords::KEYWORD,
            keywords::TABLE,
            keywords::RULE_ID
        ))?;
        let keyword_iter = stmt.query_map(params![rule_id], |row| row.get::<_, String>(0))?;

        let mut results = Vec::new();
        for keyword in keyword_iter {
            results.push(keyword?);
        }

        Ok(results)
    }

    /// A rule together with its keywords
    pub fn rule_details(&self, rule_id: &str) -> Result<RuleDetails> {
        let rule = self.get_rule(rule_id)?.ok_or(ClassifierError::NotFound("rule"))?;
        let keywords_any = self.keywords_for_rule(rule_id)?;
        Ok(RuleDetails { rule, keywords_any })
    }

    /// Number of stored rules
    pub fn rule_count(&self) -> Result<usize> {
        let conn = self.db.get_connection()?;
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", rules::TABLE), [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Create a rule and its keyword fan-out as one unit of work.
    ///
    /// Either the rule and every keyword are committed, or nothing is.
    /// Returns the stored rule without its keywords.
    pub fn ingest_rule(&self, request: RuleCreateRequest) -> Result<ClassificationRule> {
        if let Err(e) = InputValidator::validate_rule_request(&request) {
            metrics::record_error("ingest_rule", e.kind());
            return Err(e);
        }

        let (rule, rule_keywords) = request.into_records();
        if rule_keywords.is_empty() {
            warn!(rule_id = %rule.id, "Rule has no keywords and can never match");
        }

        let mut conn = self.db.get_connection()?;
        match write_rule(&mut conn, &rule, &rule_keywords) {
            Ok(()) => {
                info!(rule_id = %rule.id, keywords = rule_keywords.len(), "Rule ingested");
                metrics::record_ingestion(rule_keywords.len());
                Ok(rule)
            }
            Err(e) => {
                warn!(rule_id = %rule.id, error = %e, "Rule ingestion rolled back");
                metrics::record_error("ingest_rule", e.kind());
                Err(e)
            }
        }
    }

    /// Ingest rules one by one, each in its own transaction.
    ///
    /// Stops at the first failure; rules ingested before it stay committed.
    pub fn ingest_rules(&self, requests: impl IntoIterator<Item = RuleCreateRequest>) -> Result<usize> {
        let mut count = 0;
        for request in requests {
            self.ingest_rule(request)?;
            count += 1;
        }
        Ok(count)
    }
}

fn write_rule(conn: &mut Connection, rule: &ClassificationRule, rule_keywords: &[RuleKeyword]) -> Result<()> {
    // Dropping the transaction on an early return rolls it back
    let tx = conn.transaction()?;

    insert_rule(&tx, rule)?;
    for keyword in rule_keywords {
        insert_keyword(&tx, keyword)?;
    }

    tx.commit()?;
    Ok(())
}

fn insert_rule(conn: &Connection, rule: &ClassificationRule) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} ({}, {}, {}, {}) VALUES (?, ?, ?, ?)",
            rules::TABLE,
            rules::ID,
            rules::NAME,
            rules::ACTION,
            rules::REQUIRES_APPEND
        ),
        params![rule.id, rule.name, rule.action, rule.requires_append],
    )
    .map_err(|e| match constraint_violation(&e) {
        Some(Constraint::Duplicate) => ClassifierError::DuplicateKey(format!("rule '{}' already exists", rule.id)),
        _ => e.into(),
    })?;

    debug!(rule_id = %rule.id, "Rule row inserted");
    Ok(())
}

fn insert_keyword(conn: &Connection, keyword: &RuleKeyword) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} ({}, {}) VALUES (?, ?)",
            keywords::TABLE,
            keywords::KEYWORD,
            keywords::RULE_ID
        ),
        params![keyword.keyword, keyword.rule_id],
    )
    .map_err(|e| match constraint_violation(&e) {
        Some(Constraint::Duplicate) => {
            ClassifierError::DuplicateKey(format!("keyword '{}' already exists", keyword.keyword))
        }
        Some(Constraint::ForeignKey) => ClassifierError::ForeignKey(format!(
            "rule '{}' does not exist for keyword '{}'",
            keyword.rule_id, keyword.keyword
        )),
        None => e.into(),
    })?;

    Ok(())
}

/// Map a database row to a ClassificationRule
fn map_rule(row: &Row) -> rusqlite::Result<ClassificationRule> {
    Ok(ClassificationRule {
        id: row.get(rules::ID)?,
        name: row.get(rules::NAME)?,
        action: row.get(rules::ACTION)?,
        requires_append: row.get(rules::REQUIRES_APPEND)?,
    })
}
