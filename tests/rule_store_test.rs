//! Rule store and ingestion tests

use std::io::Write;

use tempfile::{tempdir, NamedTempFile};

use compliance_classifier::import::{load_rule_file, parse_rule_set};
use compliance_classifier::models::ClassificationRule;
use compliance_classifier::{ClassifierError, Database, RuleCreateRequest, RuleStore};

fn store() -> RuleStore {
    RuleStore::new(Database::in_memory().expect("Failed to create database"))
}

fn request(id: &str, keywords: &[&str]) -> RuleCreateRequest {
    RuleCreateRequest {
        id: id.to_string(),
        name: format!("Rule {id}"),
        keywords_any: keywords.iter().map(|k| (*k).to_string()).collect(),
        action: None,
        requires_append: None,
    }
}

fn rule(id: &str) -> ClassificationRule {
    ClassificationRule {
        id: id.to_string(),
        name: format!("Rule {id}"),
        action: Some("act".to_string()),
        requires_append: None,
    }
}

#[test]
fn test_add_rule_and_keyword() {
    let store = store();
    store.add_rule(&rule("R1")).unwrap();
    store.add_keyword("dosing", "R1").unwrap();

    let found = store.find_rule_by_keyword("dosing").unwrap();
    assert_eq!(found, Some(rule("R1")));
    assert_eq!(store.find_rule_by_keyword("pricing").unwrap(), None);
}

#[test]
fn test_duplicate_rule_id_rejected() {
    let store = store();
    store.add_rule(&rule("R1")).unwrap();

    let err = store.add_rule(&rule("R1")).unwrap_err();
    assert!(matches!(err, ClassifierError::DuplicateKey(_)), "got {err:?}");
    assert_eq!(err.status_code(), 409);
}

#[test]
fn test_duplicate_keyword_rejected() {
    let store = store();
    store.add_rule(&rule("R1")).unwrap();
    store.add_rule(&rule("R2")).unwrap();
    store.add_keyword("dosing", "R1").unwrap();

    let err = store.add_keyword("dosing", "R2").unwrap_err();
    assert!(matches!(err, ClassifierError::DuplicateKey(_)), "got {err:?}");

    // First owner keeps the keyword
    assert_eq!(store.find_rule_by_keyword("dosing").unwrap().unwrap().id, "R1");
}

#[test]
fn test_keyword_for_unknown_rule_rejected() {
    let store = store();

    let err = store.add_keyword("dosing", "missing").unwrap_err();
    assert!(matches!(err, ClassifierError::ForeignKey(_)), "got {err:?}");
    assert_eq!(store.find_rule_by_keyword("dosing").unwrap(), None);
}

#[test]
fn test_ingest_returns_rule_and_stores_keywords() {
    let store = store();
    let created = store.ingest_rule(request("R1", &["dosing", "dose", "titration"])).unwrap();

    assert_eq!(created.id, "R1");
    assert_eq!(created.name, "Rule R1");
    assert_eq!(store.keywords_for_rule("R1").unwrap(), vec!["dosing", "dose", "titration"]);
    for keyword in ["dosing", "dose", "titration"] {
        assert_eq!(store.find_rule_by_keyword(keyword).unwrap().unwrap().id, "R1");
    }
}

#[test]
fn test_failed_ingestion_leaves_nothing_behind() {
    let store = store();
    store.ingest_rule(request("R0", &["c"])).unwrap();

    // Third of five keywords collides with R0
    let err = store.ingest_rule(request("R1", &["a", "b", "c", "d", "e"])).unwrap_err();
    assert!(matches!(err, ClassifierError::DuplicateKey(_)), "got {err:?}");

    assert_eq!(store.get_rule("R1").unwrap(), None);
    assert!(store.keywords_for_rule("R1").unwrap().is_empty());
    for keyword in ["a", "b", "d", "e"] {
        assert_eq!(store.find_rule_by_keyword(keyword).unwrap(), None, "keyword {keyword}");
    }
    assert_eq!(store.find_rule_by_keyword("c").unwrap().unwrap().id, "R0");
    assert_eq!(store.rule_count().unwrap(), 1);
}

#[test]
fn test_keyword_repeated_within_request_rolls_back() {
    let store = store();

    let err = store.ingest_rule(request("R1", &["dosing", "dosing"])).unwrap_err();
    assert!(matches!(err, ClassifierError::DuplicateKey(_)));
    assert_eq!(store.get_rule("R1").unwrap(), None);
    assert_eq!(store.find_rule_by_keyword("dosing").unwrap(), None);
}

#[test]
fn test_duplicate_rule_id_on_ingest_keeps_original() {
    let store = store();
    store.ingest_rule(request("R1", &["dosing"])).unwrap();

    let err = store.ingest_rule(request("R1", &["pricing"])).unwrap_err();
    assert!(matches!(err, ClassifierError::DuplicateKey(_)));
    assert_eq!(store.find_rule_by_keyword("pricing").unwrap(), None);
    assert_eq!(store.keywords_for_rule("R1").unwrap(), vec!["dosing"]);
}

#[test]
fn test_invalid_request_rejected_before_write() {
    let store = store();

    let err = store.ingest_rule(request("  ", &["dosing"])).unwrap_err();
    assert!(matches!(err, ClassifierError::Validation(_)));
    assert_eq!(err.status_code(), 422);

    let err = store.ingest_rule(request("R1", &["dosing", ""])).unwrap_err();
    assert!(matches!(err, ClassifierError::Validation(_)));
    assert_eq!(store.rule_count().unwrap(), 0);
}

#[test]
fn test_rule_without_keywords_is_stored() {
    let store = store();
    store.ingest_rule(request("R1", &[])).unwrap();

    let details = store.rule_details("R1").unwrap();
    assert_eq!(details.rule.id, "R1");
    assert!(details.keywords_any.is_empty());
}

#[test]
fn test_rule_details_for_unknown_rule() {
    let err = store().rule_details("nope").unwrap_err();
    assert!(matches!(err, ClassifierError::NotFound("rule")));
}

#[test]
fn test_rule_file_ingestion_stops_at_first_failure() {
    let json = r#"{
        "rules": [
            {"id": "R1", "name": "Include safety statement", "keywords_any": ["dosing"],
             "action": "when mentioning dosing", "requires_append": "See PI for full safety info."},
            {"id": "R2", "name": "Escalate", "keywords_any": ["adverse-event"]},
            {"id": "R3", "name": "Clash", "keywords_any": ["pricing", "dosing"]},
            {"id": "R4", "name": "Never reached", "keywords_any": ["samples"]}
        ]
    }"#;
    let rule_set = parse_rule_set(json.as_bytes()).unwrap();
    assert_eq!(rule_set.rules.len(), 4);
    assert_eq!(rule_set.rules[0].requires_append.as_deref(), Some("See PI for full safety info."));

    let store = store();
    let err = store.ingest_rules(rule_set.rules).unwrap_err();
    assert!(matches!(err, ClassifierError::DuplicateKey(_)));

    assert!(store.get_rule("R1").unwrap().is_some());
    assert!(store.get_rule("R2").unwrap().is_some());
    assert!(store.get_rule("R3").unwrap().is_none());
    assert!(store.get_rule("R4").unwrap().is_none());
    assert_eq!(store.find_rule_by_keyword("pricing").unwrap(), None);
}

#[test]
fn test_load_rule_file_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"rules": [{{"id": "R1", "name": "N", "keywordsAny": ["a", "b"], "requiresAppend": "X"}}]}}"#
    )
    .unwrap();

    let rule_set = load_rule_file(file.path()).unwrap();
    let store = store();
    assert_eq!(store.ingest_rules(rule_set.rules).unwrap(), 1);
    assert_eq!(store.keywords_for_rule("R1").unwrap(), vec!["a", "b"]);
}

#[test]
fn test_rules_persist_across_reopen() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let db_url = format!("sqlite://{}", temp_dir.path().join("nested/rules.db").display());

    {
        let store = RuleStore::new(Database::new(&db_url).unwrap());
        store.ingest_rule(request("R1", &["dosing"])).unwrap();
    }

    let store = RuleStore::new(Database::new(&db_url).unwrap());
    assert_eq!(store.find_rule_by_keyword("dosing").unwrap().unwrap().id, "R1");
    assert_eq!(store.rule_count().unwrap(), 1);
}
