//! Data Validation Tests
//!
//! Validates instance documents from `tests/fixtures/data` against the
//! fixture schemas.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use schema_compliance::data::{CONSTRAINT_SCHEMA_LOAD, CUSTOM_CONSTRAINT_PREFIX};
use schema_compliance::{ComplianceConfig, DataValidationRequest, ValidatorFactory};
use serde_json::{json, Value};

fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn data(name: &str) -> Value {
    let text = std::fs::read_to_string(fixtures_path().join("data").join(name)).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn factory() -> ValidatorFactory {
    ValidatorFactory::new(ComplianceConfig::with_schemas_dir(fixtures_path().join("schemas")))
}

#[test]
fn test_valid_document() {
    let factory = factory();
    let request = DataValidationRequest::new("mplp-context", data("context-valid.json"));
    let result = factory.data().validate_data(&request);

    assert!(result.is_valid, "{:#?}", result.errors);
    assert!(result.warnings.is_empty());
    assert_eq!(result.metadata.rules_applied, vec!["schema-validation"]);
}

#[test]
fn test_invalid_document_reports_each_violation() {
    let factory = factory();
    let request = DataValidationRequest::new("context", data("context-invalid.json"));
    let result = factory.data().validate_data(&request);

    assert!(!result.is_valid);
    let found: BTreeSet<(String, String)> = result
        .errors
        .iter()
        .map(|e| (e.error_path.clone(), e.constraint.clone()))
        .collect();
    for expected in [("status", "enum"), ("name", "minLength"), ("root", "required")] {
        assert!(
            found.contains(&(expected.0.to_string(), expected.1.to_string())),
            "missing {:?} in {:?}",
            expected,
            found
        );
    }

    let status = result.errors.iter().find(|e| e.constraint == "enum").unwrap();
    assert_eq!(status.value, json!("paused"));
    assert_eq!(status.actual_type, "string");
}

#[test]
fn test_ref_typed_field_reports_expected_type() {
    let factory = factory();
    let mut document = data("context-valid.json");
    document["context_id"] = json!("not-a-uuid");
    let result = factory
        .data()
        .validate_data(&DataValidationRequest::new("mplp-context", document));

    assert!(!result.is_valid);
    let error = result
        .errors
        .iter()
        .find(|e| e.error_path == "context_id")
        .expect("context_id error");
    assert_eq!(error.constraint, "pattern");
    assert_eq!(error.expected_type, "string");
}

#[test]
fn test_unknown_schema_is_a_load_error() {
    let factory = factory();
    let result = factory
        .data()
        .validate_data(&DataValidationRequest::new("mplp-ghost", json!({})));

    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].constraint, CONSTRAINT_SCHEMA_LOAD);
}

#[test]
fn test_custom_validator_failure() {
    let factory = factory();
    let request = DataValidationRequest::new("mplp-context", data("context-valid.json"))
        .with_validator("has_tags", |v| v.get("tags").map_or(false, |t| t.is_array()))
        .with_validator("name_is_short", |v| {
            v.get("name").and_then(Value::as_str).map_or(false, |n| n.len() < 5)
        });
    let result = factory.data().validate_data(&request);

    assert!(!result.is_valid);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(
        result.errors[0].constraint,
        format!("{}name_is_short", CUSTOM_CONSTRAINT_PREFIX)
    );
    assert_eq!(result.errors[0].error_path, "root");
}

#[test]
fn test_strict_mode_warnings_do_not_invalidate() {
    let factory = factory();
    let mut document = data("context-valid.json");
    document["tags"] = json!(["a"]);
    let request = DataValidationRequest::new("mplp-context", document).strict();
    let result = factory.data().validate_data(&request);

    assert!(result.is_valid);
    assert!(result.metadata.strict_mode);
    assert_eq!(result.metadata.rules_applied, vec!["schema-validation", "strict-mode"]);
}

#[test]
fn test_batch_preserves_order() {
    let factory = factory();
    let requests = vec![
        DataValidationRequest::new("mplp-context", data("context-valid.json")),
        DataValidationRequest::new("mplp-context", data("context-invalid.json")),
        DataValidationRequest::new("mplp-ghost", json!({})),
        DataValidationRequest::new("mplp-context", data("context-valid.json")),
    ];
    let results = factory.data().validate_batch(&requests);

    let validity: Vec<bool> = results.iter().map(|r| r.is_valid).collect();
    assert_eq!(validity, vec![true, false, false, true]);
    let names: Vec<&str> = results.iter().map(|r| r.metadata.schema_name.as_str()).collect();
    assert_eq!(names, vec!["mplp-context", "mplp-context", "mplp-ghost", "mplp-context"]);
    assert_eq!(factory.data().cached_validators(), 1);

    factory.clear_caches();
    assert_eq!(factory.data().cached_validators(), 0);
}
