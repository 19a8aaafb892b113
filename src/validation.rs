use crate::error::{ClassifierError, Result};
use crate::models::{NewMessage, NewPhysician, RuleCreateRequest};

/// Longest value accepted for any stored text field
pub const MAX_FIELD_LENGTH: usize = 255;

/// Validation utilities for rule, message and physician input
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a rule creation request before it touches the store
    pub fn validate_rule_request(request: &RuleCreateRequest) -> Result<()> {
        Self::validate_rule_id(&request.id)?;
        Self::check_length("Rule name", &request.name)?;

        for keyword in &request.keywords_any {
            Self::validate_keyword(keyword)?;
        }

        if let Some(action) = &request.action {
            Self::check_length("Rule action", action)?;
        }
        if let Some(append) = &request.requires_append {
            Self::check_length("Rule append text", append)?;
        }

        Ok(())
    }

    /// Validate a rule identifier
    pub fn validate_rule_id(id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(invalid("Rule id cannot be empty"));
        }

        if id.contains('\0') || id.contains('\r') || id.contains('\n') {
            return Err(invalid("Rule id contains invalid characters"));
        }

        Self::check_length("Rule id", id)
    }

    /// Validate a single keyword.
    ///
    /// Keywords are compared verbatim against topics, so surrounding
    /// whitespace is kept; only the empty string is rejected since no
    /// message may carry an empty topic.
    pub fn validate_keyword(keyword: &str) -> Result<()> {
        if keyword.is_empty() {
            return Err(invalid("Keyword cannot be empty"));
        }

        Self::check_length("Keyword", keyword)
    }

    /// Validate a message before insert
    pub fn validate_new_message(message: &NewMessage) -> Result<()> {
        Self::check_required("Message topic", &message.topic)?;
        Self::check_required("Message text", &message.message_text)?;

        for (label, value) in [
            ("Channel", &message.channel),
            ("Direction", &message.direction),
            ("Campaign id", &message.campaign_id),
            ("Compliance tag", &message.compliance_tag),
            ("Sentiment", &message.sentiment),
            ("Delivery status", &message.delivery_status),
        ] {
            if let Some(value) = value {
                Self::check_length(label, value)?;
            }
        }

        if let Some(latency) = message.response_latency_sec {
            if latency.is_sign_negative() || latency.is_nan() {
                return Err(invalid("Response latency must be a non-negative number"));
            }
        }

        Ok(())
    }

    /// Validate a physician before insert
    pub fn validate_new_physician(physician: &NewPhysician) -> Result<()> {
        Self::check_required("Specialty", &physician.specialty)?;

        if physician.state.chars().count() != 2 {
            return Err(invalid("State must be a two-letter code"));
        }

        for (label, value) in [
            ("NPI", &physician.npi),
            ("First name", &physician.first_name),
            ("Last name", &physician.last_name),
        ] {
            if let Some(value) = value {
                Self::check_length(label, value)?;
            }
        }

        Ok(())
    }

    fn check_required(label: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            return Err(invalid(format!("{label} cannot be empty")));
        }
        Self::check_length(label, value)
    }

    fn check_length(label: &str, value: &str) -> Result<()> {
        if value.chars().count() > MAX_FIELD_LENGTH {
            return Err(invalid(format!("{label} too long (max {MAX_FIELD_LENGTH} characters)")));
        }
        Ok(())
    }
}

fn invalid(detail: impl Into<String>) -> ClassifierError {
    ClassifierError::Validation(detail.into())
}
