//! Unit tests for validation.rs module

use compliance_classifier::models::{NewMessage, NewPhysician, RuleCreateRequest};
use compliance_classifier::validation::{InputValidator, MAX_FIELD_LENGTH};

fn rule_request() -> RuleCreateRequest {
    RuleCreateRequest {
        id: "R1".to_string(),
        name: "Include safety statement".to_string(),
        keywords_any: vec!["dosing".to_string()],
        action: Some("when mentioning dosing".to_string()),
        requires_append: Some("See PI for full safety info.".to_string()),
    }
}

fn new_message() -> NewMessage {
    NewMessage {
        physician_id: 116,
        message_text: "Schedule a rep connect call next week.".to_string(),
        topic: "scheduling".to_string(),
        ..NewMessage::default()
    }
}

#[test]
fn test_validate_rule_request_valid() {
    assert!(InputValidator::validate_rule_request(&rule_request()).is_ok());
}

#[test]
fn test_validate_rule_request_without_keywords() {
    let mut request = rule_request();
    request.keywords_any.clear();
    assert!(InputValidator::validate_rule_request(&request).is_ok());
}

#[test]
fn test_validate_rule_id_empty() {
    assert!(InputValidator::validate_rule_id("").is_err());
    assert!(InputValidator::validate_rule_id("   ").is_err());
}

#[test]
fn test_validate_rule_id_with_newline() {
    assert!(InputValidator::validate_rule_id("R\n1").is_err());
}

#[test]
fn test_validate_rule_id_length_limit() {
    assert!(InputValidator::validate_rule_id(&"r".repeat(MAX_FIELD_LENGTH)).is_ok());
    assert!(InputValidator::validate_rule_id(&"r".repeat(MAX_FIELD_LENGTH + 1)).is_err());
}

#[test]
fn test_validate_keyword() {
    assert!(InputValidator::validate_keyword("dosing").is_ok());
    assert!(InputValidator::validate_keyword("rep connect").is_ok());
    assert!(InputValidator::validate_keyword("").is_err());
    assert!(InputValidator::validate_keyword(&"k".repeat(MAX_FIELD_LENGTH + 1)).is_err());
}

#[test]
fn test_validate_rule_request_long_action() {
    let mut request = rule_request();
    request.action = Some("a".repeat(MAX_FIELD_LENGTH + 1));
    assert!(InputValidator::validate_rule_request(&request).is_err());
}

#[test]
fn test_validate_rule_request_long_name_counts_chars() {
    let mut request = rule_request();
    request.name = "é".repeat(MAX_FIELD_LENGTH);
    assert!(InputValidator::validate_rule_request(&request).is_ok());
}

#[test]
fn test_validate_message_valid() {
    assert!(InputValidator::validate_new_message(&new_message()).is_ok());
}

#[test]
fn test_validate_message_empty_text() {
    let mut message = new_message();
    message.message_text.clear();
    assert!(InputValidator::validate_new_message(&message).is_err());
}

#[test]
fn test_validate_message_long_topic() {
    let mut message = new_message();
    message.topic = "t".repeat(MAX_FIELD_LENGTH + 1);
    assert!(InputValidator::validate_new_message(&message).is_err());
}

#[test]
fn test_validate_message_negative_latency() {
    let mut message = new_message();
    message.response_latency_sec = Some(-1.0);
    assert!(InputValidator::validate_new_message(&message).is_err());
}

#[test]
fn test_validate_physician_state() {
    let mut physician = NewPhysician {
        specialty: "Cardiology".to_string(),
        state: "NJ".to_string(),
        ..NewPhysician::default()
    };
    assert!(InputValidator::validate_new_physician(&physician).is_ok());

    physician.state = "NJY".to_string();
    assert!(InputValidator::validate_new_physician(&physician).is_err());

    physician.state = "N".to_string();
    assert!(InputValidator::validate_new_physician(&physician).is_err());
}

#[test]
fn test_validate_physician_empty_specialty() {
    let physician = NewPhysician {
        specialty: String::new(),
        state: "NY".to_string(),
        ..NewPhysician::default()
    };
    assert!(InputValidator::validate_new_physician(&physician).is_err());
}
