//! Bulk loading of rule files and collaborator CSV exports.
//!
//! Rule files use the `{"rules": [...]}` layout. Physician and message CSVs
//! carry one record per row with a header line; unknown columns are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use tracing::info;

use crate::db::Database;
use crate::error::{ClassifierError, Result};
use crate::models::{NewMessage, NewPhysician, RuleSet};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Deserialize)]
struct PhysicianRow {
    physician_id: i64,
    npi: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    specialty: String,
    state: String,
    consent_opt_in: Option<String>,
    preferred_channel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRow {
    message_id: i64,
    physician_id: i64,
    channel: Option<String>,
    direction: Option<String>,
    timestamp: Option<String>,
    message_text: String,
    campaign_id: Option<String>,
    topic: String,
    compliance_tag: Option<String>,
    sentiment: Option<String>,
    delivery_status: Option<String>,
    response_latency_sec: Option<f64>,
}

/// Read a rule file from disk
pub fn load_rule_file(path: &Path) -> Result<RuleSet> {
    parse_rule_set(File::open(path)?)
}

/// Parse a rule file
pub fn parse_rule_set(reader: impl Read) -> Result<RuleSet> {
    let rule_set: RuleSet = serde_json::from_reader(reader)?;
    info!(rules = rule_set.rules.len(), "Rule file parsed");
    Ok(rule_set)
}

/// Import physicians from a CSV file in one transaction
pub fn import_physicians(db: &Database, path: &Path) -> Result<usize> {
    let physicians = read_physicians(File::open(path)?)?;
    db.add_physicians(physicians)
}

/// Import messages from a CSV file in one transaction
pub fn import_messages(db: &Database, path: &Path) -> Result<usize> {
    let messages = read_messages(File::open(path)?)?;
    db.add_messages(messages)
}

/// Parse physician rows from CSV
pub fn read_physicians(reader: impl Read) -> Result<Vec<NewPhysician>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut physicians = Vec::new();

    for (index, row) in csv_reader.deserialize::<PhysicianRow>().enumerate() {
        let row = row?;
        let line = index + 2;
        physicians.push(NewPhysician {
            physician_id: Some(row.physician_id),
            npi: row.npi,
            first_name: row.first_name,
            last_name: row.last_name,
            specialty: row.specialty,
            state: row.state,
            consent_opt_in: row.consent_opt_in.as_deref().map(|v| parse_flag(v, line)).transpose()?.flatten(),
            preferred_channel: row.preferred_channel,
        });
    }

    Ok(physicians)
}

/// Parse message rows from CSV
pub fn read_messages(reader: impl Read) -> Result<Vec<NewMessage>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut messages = Vec::new();

    for (index, row) in csv_reader.deserialize::<MessageRow>().enumerate() {
        let row = row?;
        let line = index + 2;
        messages.push(NewMessage {
            message_id: Some(row.message_id),
            physician_id: row.physician_id,
            channel: row.channel,
            direction: row.direction,
            timestamp: row.timestamp.as_deref().map(|v| parse_timestamp(v, line)).transpose()?,
            message_text: row.message_text,
            campaign_id: row.campaign_id,
            topic: row.topic,
            compliance_tag: row.compliance_tag,
            sentiment: row.sentiment,
            delivery_status: row.delivery_status,
            response_latency_sec: row.response_latency_sec,
        });
    }

    Ok(messages)
}

/// Parse a boolean-ish CSV cell; blank cells mean "unknown"
fn parse_flag(value: &str, line: usize) -> Result<Option<bool>> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" | "t" | "yes" | "y" | "1" => Ok(Some(true)),
        "false" | "f" | "no" | "n" | "0" => Ok(Some(false)),
        other => Err(ClassifierError::Validation(format!(
            "line {line}: '{other}' is not a boolean"
        ))),
    }
}

/// Parse an ISO-8601 timestamp, with or without offset (offsets are normalized to UTC)
fn parse_timestamp(value: &str, line: usize) -> Result<NaiveDateTime> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.naive_utc());
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| ClassifierError::Validation(format!("line {line}: invalid timestamp '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("True", 2).unwrap(), Some(true));
        assert_eq!(parse_flag("false", 2).unwrap(), Some(false));
        assert_eq!(parse_flag(" ", 2).unwrap(), None);
        assert!(parse_flag("maybe", 2).is_err());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDateTime::parse_from_str("2025-07-25 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(parse_timestamp("2025-07-25T09:30:00", 2).unwrap(), expected);
        assert_eq!(parse_timestamp("2025-07-25 09:30:00", 2).unwrap(), expected);
        assert_eq!(parse_timestamp("2025-07-25T11:30:00+02:00", 2).unwrap(), expected);
        assert!(parse_timestamp("yesterday", 2).is_err());
    }
}
