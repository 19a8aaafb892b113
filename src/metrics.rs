//! Metrics collection
//!
//! Thin wrappers over the `metrics` facade. Nothing is exported unless the
//! binary embedding this crate installs a recorder; without one every call is
//! a no-op.

use std::time::Duration;

/// Classifications performed, labelled by outcome
pub const CLASSIFICATIONS_TOTAL: &str = "compliance_classifications_total";
/// Classification latency
pub const CLASSIFICATION_DURATION: &str = "compliance_classification_duration_seconds";
/// Rules successfully ingested
pub const RULES_INGESTED_TOTAL: &str = "compliance_rules_ingested_total";
/// Keywords successfully ingested
pub const KEYWORDS_INGESTED_TOTAL: &str = "compliance_keywords_ingested_total";
/// Failures, labelled by operation and error kind
pub const ERRORS_TOTAL: &str = "compliance_errors_total";

/// How a classification request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A rule matched the topic
    Matched,
    /// No keyword equals the topic
    Unmatched,
    /// The message does not exist
    NotFound,
}

impl Outcome {
    /// Label value for this outcome
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Unmatched => "unmatched",
            Self::NotFound => "not_found",
        }
    }
}

/// Record one classification
pub fn record_classification(outcome: Outcome, duration: Duration) {
    ::metrics::counter!(CLASSIFICATIONS_TOTAL, "outcome" => outcome.as_str()).increment(1);
    ::metrics::histogram!(CLASSIFICATION_DURATION).record(duration.as_secs_f64());
}

/// Record one committed rule ingestion
pub fn record_ingestion(keyword_count: usize) {
    ::metrics::counter!(RULES_INGESTED_TOTAL).increment(1);
    ::metrics::counter!(KEYWORDS_INGESTED_TOTAL).increment(keyword_count as u64);
}

/// Record a failed operation
pub fn record_error(operation: &'static str, kind: &'static str) {
    ::metrics::counter!(ERRORS_TOTAL, "operation" => operation, "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Matched.as_str(), "matched");
        assert_eq!(Outcome::Unmatched.as_str(), "unmatched");
        assert_eq!(Outcome::NotFound.as_str(), "not_found");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_classification(Outcome::Matched, Duration::from_millis(3));
        record_ingestion(5);
        record_error("ingest_rule", "duplicate_key");
    }
}
