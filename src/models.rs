//! Data models for rules, messages and physicians
//!
//! Storage records (`ClassificationRule`, `RuleKeyword`, `Message`, `Physician`)
//! are kept separate from the wire types (`RuleCreateRequest`, `ClassMessage`).
//! [`RuleCreateRequest::into_records`] is the only path from one to the other.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Result text returned when no keyword matches a message topic
pub const NO_RULE_FOUND: &str = "No classification rule found";

/// A named classification outcome with optional action and append text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationRule {
    /// Unique rule identifier
    pub id: String,
    /// Human-readable label, always the first part of a classification
    pub name: String,
    /// Instruction appended after the name when non-empty
    #[serde(default)]
    pub action: Option<String>,
    /// Clause appended after the action when non-empty
    #[serde(default, alias = "requires_append")]
    pub requires_append: Option<String>,
}

/// Mapping of a single keyword to the rule that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleKeyword {
    /// Keyword, unique across all rules
    pub keyword: String,
    /// Owning rule identifier
    #[serde(alias = "rule_id")]
    pub rule_id: String,
}

/// Payload for creating a rule together with its keyword set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCreateRequest {
    /// Rule identifier
    pub id: String,
    /// Rule label
    pub name: String,
    /// Keywords that select this rule when equal to a message topic
    #[serde(alias = "keywords_any")]
    pub keywords_any: Vec<String>,
    /// Optional action text
    #[serde(default)]
    pub action: Option<String>,
    /// Optional appended clause
    #[serde(default, alias = "requires_append")]
    pub requires_append: Option<String>,
}

impl RuleCreateRequest {
    /// Split the request into the rule record and one keyword record per entry.
    #[must_use]
    pub fn into_records(self) -> (ClassificationRule, Vec<RuleKeyword>) {
        let keywords = self
            .keywords_any
            .into_iter()
            .map(|keyword| RuleKeyword {
                keyword,
                rule_id: self.id.clone(),
            })
            .collect();

        let rule = ClassificationRule {
            id: self.id,
            name: self.name,
            action: self.action,
            requires_append: self.requires_append,
        };

        (rule, keywords)
    }
}

/// A file of rule definitions, as in `compliance_policies.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rules in file order
    pub rules: Vec<RuleCreateRequest>,
}

/// Classification result returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMessage {
    /// Rendered classification text
    pub message: String,
}

/// A rule together with its keywords, in insertion order
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDetails {
    /// The stored rule
    #[serde(flatten)]
    pub rule: ClassificationRule,
    /// Keywords owned by the rule
    pub keywords_any: Vec<String>,
}

/// Database representation of a physician
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Physician {
    /// Database primary key
    pub physician_id: i64,
    /// National provider identifier
    pub npi: Option<String>,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Medical specialty
    pub specialty: String,
    /// Two-letter state code
    pub state: String,
    /// Whether the physician opted in to contact
    pub consent_opt_in: Option<bool>,
    /// Preferred contact channel
    pub preferred_channel: Option<String>,
}

/// Data for creating a new physician
#[derive(Debug, Clone, Default)]
pub struct NewPhysician {
    /// Explicit primary key (assigned by the database when `None`)
    pub physician_id: Option<i64>,
    /// National provider identifier
    pub npi: Option<String>,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Medical specialty
    pub specialty: String,
    /// Two-letter state code
    pub state: String,
    /// Whether the physician opted in to contact
    pub consent_opt_in: Option<bool>,
    /// Preferred contact channel
    pub preferred_channel: Option<String>,
}

/// Database representation of a message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// Database primary key
    pub message_id: i64,
    /// Foreign key to physicians table
    pub physician_id: i64,
    /// Delivery channel (sms, email, ...)
    pub channel: Option<String>,
    /// Inbound or outbound
    pub direction: Option<String>,
    /// When the message was sent
    pub timestamp: NaiveDateTime,
    /// Message text content
    pub message_text: String,
    /// Campaign identifier
    pub campaign_id: Option<String>,
    /// Topic, matched exactly against rule keywords
    pub topic: String,
    /// Compliance tag recorded at the source
    pub compliance_tag: Option<String>,
    /// Sentiment label
    pub sentiment: Option<String>,
    /// Delivery status
    pub delivery_status: Option<String>,
    /// Seconds until the physician responded
    pub response_latency_sec: Option<f64>,
}

/// Data for creating a new message
#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    /// Explicit primary key (assigned by the database when `None`)
    pub message_id: Option<i64>,
    /// Foreign key to physicians table
    pub physician_id: i64,
    /// Delivery channel
    pub channel: Option<String>,
    /// Inbound or outbound
    pub direction: Option<String>,
    /// Timestamp (optional, defaults to now)
    pub timestamp: Option<NaiveDateTime>,
    /// Message text content
    pub message_text: String,
    /// Campaign identifier
    pub campaign_id: Option<String>,
    /// Topic
    pub topic: String,
    /// Compliance tag
    pub compliance_tag: Option<String>,
    /// Sentiment label
    pub sentiment: Option<String>,
    /// Delivery status
    pub delivery_status: Option<String>,
    /// Seconds until the physician responded
    pub response_latency_sec: Option<f64>,
}
