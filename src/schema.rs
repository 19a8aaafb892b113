//! Database schema definitions
//!
//! Table and column names used with rusqlite. The DDL itself lives under
//! `migrations/` and is embedded by [`crate::db::Database`].

/// Physicians table schema
pub mod physicians {
    /// Table name
    pub const TABLE: &str = "physicians";
    /// Primary key column
    pub const ID: &str = "physician_id";
    /// National provider identifier column
    pub const NPI: &str = "npi";
    /// First name column
    pub const FIRST_NAME: &str = "first_name";
    /// Last name column
    pub const LAST_NAME: &str = "last_name";
    /// Specialty column
    pub const SPECIALTY: &str = "specialty";
    /// Two-letter state code column
    pub const STATE: &str = "state";
    /// Consent flag column
    pub const CONSENT_OPT_IN: &str = "consent_opt_in";
    /// Preferred contact channel column
    pub const PREFERRED_CHANNEL: &str = "preferred_channel";
}

/// Messages table schema
pub mod messages {
    /// Table name
    pub const TABLE: &str = "messages";
    /// Primary key column
    pub const ID: &str = "message_id";
    /// Foreign key to physicians table
    pub const PHYSICIAN_ID: &str = "physician_id";
    /// Delivery channel column
    pub const CHANNEL: &str = "channel";
    /// Inbound/outbound column
    pub const DIRECTION: &str = "direction";
    /// Message timestamp column
    pub const TIMESTAMP: &str = "timestamp";
    /// Message text content column
    pub const MESSAGE_TEXT: &str = "message_text";
    /// Campaign identifier column
    pub const CAMPAIGN_ID: &str = "campaign_id";
    /// Topic column, the classification key
    pub const TOPIC: &str = "topic";
    /// Compliance tag column
    pub const COMPLIANCE_TAG: &str = "compliance_tag";
    /// Sentiment column
    pub const SENTIMENT: &str = "sentiment";
    /// Delivery status column
    pub const DELIVERY_STATUS: &str = "delivery_status";
    /// Response latency column
    pub const RESPONSE_LATENCY_SEC: &str = "response_latency_sec";
}

/// Classification rules table schema
pub mod classification_rules {
    /// Table name
    pub const TABLE: &str = "classification_rules";
    /// Primary key column
    pub const ID: &str = "id";
    /// Rule label column
    pub const NAME: &str = "name";
    /// Optional action text column
    pub const ACTION: &str = "action";
    /// Optional appended clause column
    pub const REQUIRES_APPEND: &str = "requires_append";
}

/// Rule keywords table schema
pub mod rule_keywords {
    /// Table name
    pub const TABLE: &str = "rule_keywords";
    /// Primary key column
    pub const KEYWORD: &str = "keyword";
    /// Foreign key to classification rules table
    pub const RULE_ID: &str = "rule_id";
}
