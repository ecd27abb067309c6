//! Schema Validation Pipeline Tests
//!
//! Runs the syntax, compatibility and report layers over the fixture schemas
//! in `tests/fixtures/schemas`, and over scratch copies that break them.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use schema_compliance::syntax::{
    RULE_BEST_PRACTICES, RULE_DRAFT_07, RULE_ENTERPRISE_FEATURES, RULE_JSON_SYNTAX,
    RULE_NAMING_CONVENTION, RULE_NAMING_DETAILED, RULE_ORG_SPECIFIC, RULE_SCHEMA_STRUCTURE,
};
use schema_compliance::{
    CompatibilityStatus, ComplianceConfig, DiagnosticCode, ReportFormat, ValidationResult,
    ValidatorFactory,
};
use serde_json::Value;
use tempfile::TempDir;

fn fixtures_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/schemas")
}

fn fixture(name: &str) -> Value {
    let text = std::fs::read_to_string(fixtures_path().join(name)).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Scratch schema directory holding copies of the fixture schemas
fn scratch() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in ["mplp-context.json", "mplp-plan.json"] {
        std::fs::copy(fixtures_path().join(name), dir.path().join(name)).unwrap();
    }
    dir
}

fn write_json(dir: &Path, name: &str, value: &Value) {
    std::fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn factory_for(dir: &Path) -> ValidatorFactory {
    ValidatorFactory::new(ComplianceConfig::with_schemas_dir(dir))
}

fn codes(result: &ValidationResult) -> Vec<DiagnosticCode> {
    result.diagnostics().map(|d| d.code).collect()
}

// =============================================================================
// Syntax Pipeline
// =============================================================================

#[test]
fn test_fixture_schemas_are_compliant() {
    let factory = factory_for(&fixtures_path());
    let results = factory.syntax().validate_all_schemas();

    assert_eq!(results.len(), 2);
    for result in &results {
        assert!(result.is_valid, "{} errors: {:#?}", result.schema_name(), result.errors);
        assert!(result.warnings.is_empty(), "{} warnings: {:#?}", result.schema_name(), result.warnings);
        assert_eq!(
            result.metadata.rules_applied,
            vec![
                RULE_JSON_SYNTAX,
                RULE_SCHEMA_STRUCTURE,
                RULE_NAMING_CONVENTION,
                RULE_DRAFT_07,
                RULE_ORG_SPECIFIC,
                RULE_ENTERPRISE_FEATURES,
                RULE_NAMING_DETAILED,
                RULE_BEST_PRACTICES,
            ]
        );
    }
    let names: Vec<_> = results.iter().map(|r| r.schema_name()).collect();
    assert_eq!(names, vec!["mplp-context", "mplp-plan"]);
}

#[test]
fn test_malformed_json_yields_single_error() {
    let dir = scratch();
    std::fs::write(dir.path().join("mplp-broken.json"), "{\"type\": ").unwrap();

    let result = factory_for(dir.path())
        .syntax()
        .validate_schema(dir.path().join("mplp-broken.json"));

    assert!(!result.is_valid);
    assert_eq!(codes(&result), vec![DiagnosticCode::JsonSyntaxError]);
    assert_eq!(result.metadata.rules_applied, vec![RULE_JSON_SYNTAX]);
}

#[test]
fn test_missing_uuid_definition_is_reported() {
    let dir = scratch();
    let mut schema = fixture("mplp-context.json");
    schema["$defs"].as_object_mut().unwrap().remove("uuid");
    write_json(dir.path(), "mplp-context.json", &schema);

    let result = factory_for(dir.path())
        .syntax()
        .validate_schema(dir.path().join("mplp-context.json"));

    assert!(!result.is_valid);
    let org = result
        .errors
        .iter()
        .find(|e| e.code == DiagnosticCode::OrgRuleError)
        .expect("org rule error");
    assert_eq!(org.location.json_path, "$defs.uuid");
}

#[test]
fn test_missing_enterprise_feature() {
    let dir = scratch();
    let mut schema = fixture("mplp-plan.json");
    schema["properties"].as_object_mut().unwrap().remove("version_history");
    write_json(dir.path(), "mplp-plan.json", &schema);

    let result = factory_for(dir.path())
        .syntax()
        .validate_schema(dir.path().join("mplp-plan.json"));

    assert!(!result.is_valid);
    assert_eq!(codes(&result), vec![DiagnosticCode::MissingEnterpriseFeature]);
    assert_eq!(result.errors[0].location.json_path, "properties.version_history");
}

#[test]
fn test_camel_case_field_is_flagged_twice() {
    let dir = scratch();
    let mut schema = fixture("mplp-context.json");
    schema["properties"]["createdBy"] = serde_json::json!({"type": "string"});
    write_json(dir.path(), "mplp-context.json", &schema);

    let result = factory_for(dir.path())
        .syntax()
        .validate_schema(dir.path().join("mplp-context.json"));

    assert!(!result.is_valid);
    assert!(result.has_diagnostic(DiagnosticCode::NamingConventionViolation));
    assert!(result.has_diagnostic(DiagnosticCode::NamingConventionWarning));
    let violation = result
        .errors
        .iter()
        .find(|e| e.code == DiagnosticCode::NamingConventionViolation)
        .unwrap();
    assert_eq!(violation.suggestions[0], "Rename 'createdBy' to 'created_by'");
}

#[test]
fn test_validation_is_idempotent() {
    let dir = scratch();
    let mut schema = fixture("mplp-plan.json");
    schema.as_object_mut().unwrap().remove("description");
    write_json(dir.path(), "mplp-plan.json", &schema);

    let syntax = factory_for(dir.path()).syntax();
    let path = dir.path().join("mplp-plan.json");
    let first = syntax.validate_schema(&path);
    let second = syntax.validate_schema(&path);

    let shape = |r: &ValidationResult| {
        r.diagnostics()
            .map(|d| (d.code, d.location.json_path.clone(), d.message.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&first), shape(&second));
    assert_eq!(first.is_valid, second.is_valid);
    assert_eq!(first.metadata.rules_applied, second.metadata.rules_applied);
}

#[test]
fn test_batch_with_one_invalid_schema() {
    let dir = scratch();
    std::fs::write(dir.path().join("mplp-broken.json"), "not json").unwrap();
    std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

    let results = factory_for(dir.path()).syntax().validate_all_schemas();

    assert_eq!(results.len(), 3);
    let invalid: Vec<_> = results.iter().filter(|r| !r.is_valid).map(|r| r.schema_name()).collect();
    assert_eq!(invalid, vec!["mplp-broken"]);
}

#[test]
fn test_missing_directory_yields_single_result() {
    let dir = tempfile::tempdir().unwrap();
    let results = factory_for(&dir.path().join("absent")).syntax().validate_all_schemas();

    assert_eq!(results.len(), 1);
    assert_eq!(codes(&results[0]), vec![DiagnosticCode::DirectoryAccessError]);
}

#[test]
fn test_file_as_schema_directory_yields_single_result() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("schemas");
    std::fs::write(&file, "{}").unwrap();

    let results = factory_for(&file).syntax().validate_all_schemas();

    assert_eq!(results.len(), 1);
    assert!(!results[0].is_valid);
    assert_eq!(codes(&results[0]), vec![DiagnosticCode::DirectoryAccessError]);
}

#[test]
fn test_matrix_suggests_closest_name_for_transposed_letters() {
    let dir = scratch();
    write_json(
        dir.path(),
        "compatibility-matrix.json",
        &serde_json::json!({
            "matrixVersion": "1.0.0",
            "compatibilityRules": [
                {"sourceSchema": "mplp-contxet", "targetSchema": "mplp-plan"}
            ]
        }),
    );

    let result = factory_for(dir.path()).compatibility().validate_compatibility_matrix();

    assert_eq!(codes(&result), vec![DiagnosticCode::SchemaNotFound]);
    assert_eq!(result.errors[0].suggestions[0], "Did you mean 'mplp-context'?");
}

// =============================================================================
// Compatibility
// =============================================================================

#[test]
fn test_fixture_matrix_is_valid() {
    let factory = factory_for(&fixtures_path());
    let result = factory.compatibility().validate_compatibility_matrix();
    assert!(result.is_valid, "{:#?}", result.errors);
    assert!(result.warnings.is_empty(), "{:#?}", result.warnings);
    assert_eq!(result.metadata.total_schemas_checked, 2);
}

#[test]
fn test_matrix_naming_missing_schema() {
    let dir = scratch();
    write_json(
        dir.path(),
        "compatibility-matrix.json",
        &serde_json::json!({
            "matrixVersion": "1.0.0",
            "compatibilityRules": [
                {"sourceSchema": "mplp-context", "targetSchema": "mplp-planner"}
            ]
        }),
    );

    let result = factory_for(dir.path()).compatibility().validate_compatibility_matrix();

    assert!(!result.is_valid);
    assert_eq!(codes(&result), vec![DiagnosticCode::SchemaNotFound]);
    let error = &result.errors[0];
    assert_eq!(error.location.json_path, "compatibilityRules[0].targetSchema");
    assert!(error.suggestions[0].starts_with("Did you mean"));
}

#[test]
fn test_pairwise_report_over_fixtures() {
    let report = factory_for(&fixtures_path())
        .compatibility()
        .generate_compatibility_report();

    assert_eq!(report.summary.total_pairs, 1);
    assert_eq!(report.details[0].source_schema, "mplp-context");
    assert_eq!(report.details[0].target_schema, "mplp-plan");
    assert_eq!(report.details[0].status, CompatibilityStatus::Compatible);
}

#[test]
fn test_missing_definition_makes_pair_incompatible() {
    let dir = scratch();
    let mut plan = fixture("mplp-plan.json");
    plan["$defs"].as_object_mut().unwrap().remove("timestamp");
    write_json(dir.path(), "mplp-plan.json", &plan);

    let compatibility = factory_for(dir.path()).compatibility();
    let result = compatibility.check_compatibility("context", "plan");
    assert!(!result.is_valid);
    assert_eq!(codes(&result), vec![DiagnosticCode::MissingDefinition]);
    assert_eq!(result.errors[0].location.json_path, "$defs.timestamp");

    let report = compatibility.generate_compatibility_report();
    assert_eq!(report.summary.incompatible, 1);
}

// =============================================================================
// Reports
// =============================================================================

#[test]
fn test_summary_totals_agree_across_formats() {
    let dir = scratch();
    std::fs::write(dir.path().join("mplp-broken.json"), "{").unwrap();
    let mut plan = fixture("mplp-plan.json");
    plan["properties"]["dueDate"] = serde_json::json!({"type": "string"});
    write_json(dir.path(), "mplp-plan.json", &plan);

    let factory = factory_for(dir.path());
    let results = factory.syntax().validate_all_schemas();
    let generator = factory.report_generator();
    let report = generator.build_report(&results);
    let errors = report.summary.total_errors;
    let warnings = report.summary.total_warnings;
    assert!(errors >= 2);

    let text = generator.generate(ReportFormat::Text, &results);
    assert!(text.contains(&format!("Total Errors: {}", errors)));
    assert!(text.contains(&format!("Total Warnings: {}", warnings)));

    let json: Value = serde_json::from_str(&generator.generate(ReportFormat::Json, &results)).unwrap();
    assert_eq!(json["summary"]["totalErrors"], errors);
    assert_eq!(json["summary"]["totalWarnings"], warnings);
    assert_eq!(json["summary"]["invalidSchemas"], 2);

    let html = generator.generate(ReportFormat::Html, &results);
    assert!(html.contains(&format!(
        "<div class=\"label\">Total Errors</div><div class=\"value\">{}</div>",
        errors
    )));

    let junit = generator.generate(ReportFormat::Junit, &results);
    assert!(junit.contains(&format!("failures=\"{}\" skipped=\"{}\"", errors, warnings)));
    assert_eq!(junit.matches("<failure ").count(), errors);
    assert_eq!(junit.matches("<skipped ").count(), warnings);
}

#[test]
fn test_empty_input_renders_success_in_every_format() {
    let factory = factory_for(&fixtures_path());
    let generator = factory.report_generator();
    for format in [ReportFormat::Text, ReportFormat::Json, ReportFormat::Html, ReportFormat::Junit] {
        let rendered = generator.generate(format, &[]);
        assert!(!rendered.is_empty(), "{} report is empty", format);
    }
    let text = generator.generate_text_report(&[]);
    assert!(text.contains("All schemas passed validation - no action required"));
}
