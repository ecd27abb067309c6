//! Syntax and semantic validation of schema documents
//!
//! ## Stages (fixed order)
//! 1. `json-syntax`: parse; a failure ends validation
//! 2. `schema-structure`: required top-level fields, `$schema` and `$id` values
//! 3. `naming-convention`: quick style pass, warnings only
//! 4. `draft-07-compliance`: compile against the Draft-07 meta-schema
//! 5. `org-specific-rules`: `$defs` and `$defs.uuid`
//! 6. `enterprise-features`: catalog completeness and specialization
//! 7. `naming-convention-detailed`: full snake_case pass
//! 8. `best-practices`: advisory info diagnostics
//!
//! Later stages run even when earlier ones found errors. A failure escaping
//! stages 2-8 becomes a single `UNEXPECTED_ERROR`.

use jsonschema::{Draft, JSONSchema};
use rayon::prelude::*;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ComplianceConfig;
use crate::diagnostic::{
    panic_message, Diagnostic, DiagnosticCode, DiagnosticType, ErrorLocation, Findings,
    Severity, ValidationResult,
};
use crate::enterprise::{EnterpriseCatalog, EnterpriseChecker};
use crate::error::Result;
use crate::naming::NamingChecker;
use crate::schema::schema_name_from_path;
use crate::store::SchemaStore;

pub const RULE_FILE_ACCESS: &str = "file-access";
pub const RULE_DIRECTORY_ACCESS: &str = "directory-access";
pub const RULE_JSON_SYNTAX: &str = "json-syntax";
pub const RULE_SCHEMA_STRUCTURE: &str = "schema-structure";
pub const RULE_NAMING_CONVENTION: &str = "naming-convention";
pub const RULE_DRAFT_07: &str = "draft-07-compliance";
pub const RULE_ORG_SPECIFIC: &str = "org-specific-rules";
pub const RULE_ENTERPRISE_FEATURES: &str = "enterprise-features";
pub const RULE_NAMING_DETAILED: &str = "naming-convention-detailed";
pub const RULE_BEST_PRACTICES: &str = "best-practices";

const REQUIRED_FIELDS: [&str; 5] = ["$schema", "$id", "title", "description", "type"];

/// JSON Schema keywords that are camelCase by definition
const SCHEMA_KEYWORDS: &[&str] = &[
    "additionalItems",
    "additionalProperties",
    "allOf",
    "anyOf",
    "oneOf",
    "contentEncoding",
    "contentMediaType",
    "dependentRequired",
    "dependentSchemas",
    "exclusiveMaximum",
    "exclusiveMinimum",
    "maxContains",
    "maxItems",
    "maxLength",
    "maxProperties",
    "minContains",
    "minItems",
    "minLength",
    "minProperties",
    "multipleOf",
    "patternProperties",
    "propertyNames",
    "readOnly",
    "unevaluatedItems",
    "unevaluatedProperties",
    "uniqueItems",
    "writeOnly",
];

/// Keys whose values are data, not schema
const VALUE_KEYWORDS: &[&str] = &["enum", "const", "default", "examples"];

/// Validates schema documents through the staged pipeline
pub struct SyntaxValidator {
    config: ComplianceConfig,
    store: Arc<SchemaStore>,
    naming: NamingChecker,
    enterprise: EnterpriseChecker,
    camel_case: Regex,
    keywords: HashSet<&'static str>,
}

impl SyntaxValidator {
    pub fn new(config: ComplianceConfig, store: Arc<SchemaStore>) -> Self {
        let enterprise = EnterpriseChecker::new(config.schemas.file_prefix.clone());
        Self {
            config,
            store,
            naming: NamingChecker::new(),
            enterprise,
            camel_case: Regex::new(r"^[a-z][a-z0-9]*[A-Z][A-Za-z0-9]*$").unwrap(),
            keywords: SCHEMA_KEYWORDS.iter().copied().collect(),
        }
    }

    /// Replace the enterprise feature catalog
    pub fn with_enterprise_catalog(mut self, catalog: EnterpriseCatalog) -> Self {
        self.enterprise = EnterpriseChecker::with_catalog(catalog, self.config.schemas.file_prefix.clone());
        self
    }

    pub fn naming_checker(&self) -> &NamingChecker {
        &self.naming
    }

    pub fn enterprise_checker(&self) -> &EnterpriseChecker {
        &self.enterprise
    }

    /// Validate a schema file. The schema name is the file stem.
    pub fn validate_schema(&self, path: impl AsRef<Path>) -> ValidationResult {
        let path = path.as_ref();
        let name = schema_name_from_path(path);
        match std::fs::read_to_string(path) {
            Ok(content) => self.validate_schema_content(&content, &name),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "schema file unreadable");
                let mut findings = Findings::new();
                findings.rule(RULE_FILE_ACCESS);
                findings.push(
                    Diagnostic::new(
                        DiagnosticCode::FileAccessError,
                        DiagnosticType::Syntax,
                        Severity::Critical,
                        format!("Cannot read schema file: {}", path.display()),
                        ErrorLocation::new(path.display().to_string(), "", RULE_FILE_ACCESS),
                        "Check that the file exists and is readable",
                    )
                    .with_details(e.to_string()),
                );
                findings.into_result(Some(name.as_str()), 1)
            }
        }
    }

    /// Validate every `<prefix>*.json` file in the configured directory
    pub fn validate_all_schemas(&self) -> Vec<ValidationResult> {
        let files = match self.store.list_schema_files() {
            Ok(files) => files,
            Err(e) => {
                warn!(dir = %self.store.root().display(), error = %e, "schema directory unreadable");
                let mut findings = Findings::new();
                findings.rule(RULE_DIRECTORY_ACCESS);
                findings.push(
                    Diagnostic::new(
                        DiagnosticCode::DirectoryAccessError,
                        DiagnosticType::Syntax,
                        Severity::Critical,
                        format!("Cannot list schema directory: {}", self.store.root().display()),
                        ErrorLocation::new(self.store.root().display().to_string(), "", RULE_DIRECTORY_ACCESS),
                        "Check the configured schema directory exists and is readable",
                    )
                    .with_details(e.to_string()),
                );
                return vec![findings.into_result(None, 0)];
            }
        };

        let results: Vec<ValidationResult> = files.par_iter().map(|p| self.validate_schema(p)).collect();
        info!(
            schemas = results.len(),
            invalid = results.iter().filter(|r| !r.is_valid).count(),
            "validated schema directory"
        );
        results
    }

    /// Run all stages over raw schema text
    pub fn validate_schema_content(&self, content: &str, name: &str) -> ValidationResult {
        let mut findings = Findings::new();

        findings.rule(RULE_JSON_SYNTAX);
        let schema: Value = match serde_json::from_str(content) {
            Ok(schema) => schema,
            Err(e) => {
                findings.push(
                    Diagnostic::new(
                        DiagnosticCode::JsonSyntaxError,
                        DiagnosticType::Syntax,
                        Severity::Critical,
                        format!("Invalid JSON syntax: {}", e),
                        ErrorLocation::new(name, "", RULE_JSON_SYNTAX),
                        "Fix the JSON syntax error",
                    )
                    .with_details(format!("line {}, column {}", e.line(), e.column()))
                    .with_suggestions(["Validate the document with a JSON linter"]),
                );
                return findings.into_result(Some(name), 1);
            }
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| self.run_stages(&schema, name, &mut findings)));
        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(payload) => Some(panic_message(&*payload)),
        };
        if let Some(reason) = failure {
            warn!(schema = name, %reason, "validation stage failed");
            findings.push(
                Diagnostic::new(
                    DiagnosticCode::UnexpectedError,
                    DiagnosticType::Syntax,
                    Severity::Critical,
                    "Unexpected error during schema validation",
                    ErrorLocation::new(name, "", "validation-pipeline"),
                    "Check the schema structure and report the failure",
                )
                .with_details(reason),
            );
        }

        findings.into_result(Some(name), 1)
    }

    fn run_stages(&self, schema: &Value, name: &str, findings: &mut Findings) -> Result<()> {
        findings.rule(RULE_SCHEMA_STRUCTURE);
        self.check_structure(schema, name, findings);

        findings.rule(RULE_NAMING_CONVENTION);
        self.check_quick_naming(schema, name, findings);

        findings.rule(RULE_DRAFT_07);
        self.check_draft07(schema, name, findings);

        findings.rule(RULE_ORG_SPECIFIC);
        self.check_org_rules(schema, name, findings);

        if self.config.validation.enterprise_features {
            findings.rule(RULE_ENTERPRISE_FEATURES);
            self.check_enterprise(schema, name, findings);
        }

        if self.config.validation.naming_convention {
            findings.rule(RULE_NAMING_DETAILED);
            self.check_detailed_naming(schema, name, findings);
        }

        findings.rule(RULE_BEST_PRACTICES);
        self.check_best_practices(schema, name, findings);

        debug!(schema = name, errors = findings.error_count(), "schema stages complete");
        Ok(())
    }

    fn check_structure(&self, schema: &Value, name: &str, findings: &mut Findings) {
        let structure_error = |path: &str, message: String, suggestion: String| {
            Diagnostic::new(
                DiagnosticCode::SchemaStructureError,
                DiagnosticType::Semantic,
                Severity::Error,
                message,
                ErrorLocation::new(name, path, RULE_SCHEMA_STRUCTURE),
                suggestion,
            )
        };

        let Some(obj) = schema.as_object() else {
            findings.push(structure_error(
                "",
                "Schema root must be a JSON object".to_string(),
                "Wrap the schema definition in a top-level object".to_string(),
            ));
            return;
        };

        for field in REQUIRED_FIELDS {
            if !obj.contains_key(field) {
                findings.push(structure_error(
                    field,
                    format!("Missing required field: {}", field),
                    format!("Add the '{}' field to the schema root", field),
                ));
            }
        }

        match obj.get("properties") {
            None => findings.push(structure_error(
                "properties",
                "Missing required field: properties".to_string(),
                "Add a 'properties' object describing the schema fields".to_string(),
            )),
            Some(props) if props.get("protocol_version").is_none() => {
                findings.push(structure_error(
                    "properties.protocol_version",
                    "Missing required property: protocol_version".to_string(),
                    "Add a 'protocol_version' property with a const version string".to_string(),
                ))
            }
            Some(_) => {}
        }

        let draft_uri = &self.config.schemas.draft_uri;
        if let Some(declared) = obj.get("$schema") {
            if declared.as_str() != Some(draft_uri.as_str()) {
                findings.push(
                    structure_error(
                        "$schema",
                        format!("$schema must be {}", draft_uri),
                        format!("Set \"$schema\": \"{}\"", draft_uri),
                    )
                    .with_details(format!("found {}", declared)),
                );
            }
        }

        let id_prefix = &self.config.schemas.id_prefix;
        if let Some(id) = obj.get("$id") {
            let matches = id.as_str().map_or(false, |s| s.starts_with(id_prefix.as_str()));
            if !matches {
                findings.push(
                    structure_error(
                        "$id",
                        format!("$id must start with {}", id_prefix),
                        format!("Use an $id of the form {}{}.json", id_prefix, name),
                    )
                    .with_details(format!("found {}", id)),
                );
            }
        }
    }

    fn check_quick_naming(&self, schema: &Value, name: &str, findings: &mut Findings) {
        let prefix = &self.config.schemas.file_prefix;
        if !name.starts_with(prefix.as_str()) {
            findings.push(Diagnostic::new(
                DiagnosticCode::NamingConventionWarning,
                DiagnosticType::Style,
                Severity::Warning,
                format!("Schema file name '{}' does not start with '{}'", name, prefix),
                ErrorLocation::new(name, "", RULE_NAMING_CONVENTION),
                format!("Rename the file to {}<module>.json", prefix),
            ));
        }
        self.walk_keys(schema, "", name, findings);
    }

    fn walk_keys(&self, value: &Value, path: &str, name: &str, findings: &mut Findings) {
        match value {
            Value::Object(obj) => {
                for (key, sub) in obj {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    if VALUE_KEYWORDS.contains(&key.as_str()) {
                        continue;
                    }
                    if !key.starts_with('$')
                        && !self.keywords.contains(key.as_str())
                        && self.camel_case.is_match(key)
                    {
                        findings.push(Diagnostic::new(
                            DiagnosticCode::NamingConventionWarning,
                            DiagnosticType::Style,
                            Severity::Warning,
                            format!("Field '{}' uses camelCase", key),
                            ErrorLocation::new(name, child_path.as_str(), RULE_NAMING_CONVENTION),
                            format!("Rename to '{}'", crate::naming::to_snake_case(key)),
                        ));
                    }
                    self.walk_keys(sub, &child_path, name, findings);
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.walk_keys(item, &format!("{}[{}]", path, i), name, findings);
                }
            }
            _ => {}
        }
    }

    fn check_draft07(&self, schema: &Value, name: &str, findings: &mut Findings) {
        let compiled = JSONSchema::options().with_draft(Draft::Draft7).compile(schema);
        if let Err(e) = compiled {
            let path = pointer_to_dotted(&e.instance_path.to_string());
            findings.push(
                Diagnostic::new(
                    DiagnosticCode::Draft07ComplianceError,
                    DiagnosticType::Semantic,
                    Severity::Error,
                    "Schema is not a valid Draft-07 JSON Schema",
                    ErrorLocation::new(name, path, RULE_DRAFT_07),
                    "Fix the schema so it validates against the Draft-07 meta-schema",
                )
                .with_details(e.to_string()),
            );
        }
    }

    fn check_org_rules(&self, schema: &Value, name: &str, findings: &mut Findings) {
        let org_error = |path: &str, message: &str, suggestion: &str| {
            Diagnostic::new(
                DiagnosticCode::OrgRuleError,
                DiagnosticType::Semantic,
                Severity::Error,
                message,
                ErrorLocation::new(name, path, RULE_ORG_SPECIFIC),
                suggestion,
            )
        };

        match schema.get("$defs").and_then(Value::as_object) {
            None => {
                findings.push(org_error(
                    "$defs",
                    "Missing $defs section",
                    "Add a $defs section with the shared type definitions",
                ));
                findings.push(org_error(
                    "$defs.uuid",
                    "Missing uuid definition in $defs",
                    "Add a uuid definition to $defs",
                ));
            }
            Some(defs) if !defs.contains_key("uuid") => {
                findings.push(org_error(
                    "$defs.uuid",
                    "Missing uuid definition in $defs",
                    "Add a uuid definition to $defs",
                ));
            }
            Some(_) => {}
        }
    }

    fn check_enterprise(&self, schema: &Value, name: &str, findings: &mut Findings) {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.enterprise.check_document(name, schema)));
        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => return push_checker_failure(findings, name, DiagnosticCode::EnterpriseValidationError, DiagnosticType::Enterprise, e.to_string()),
            Err(payload) => return push_checker_failure(findings, name, DiagnosticCode::EnterpriseValidationError, DiagnosticType::Enterprise, panic_message(&*payload)),
        };

        for feature in &result.missing_features {
            findings.push(Diagnostic::new(
                DiagnosticCode::MissingEnterpriseFeature,
                DiagnosticType::Enterprise,
                Severity::Error,
                format!("Missing enterprise feature: {}", feature),
                ErrorLocation::new(name, format!("properties.{}", feature), RULE_ENTERPRISE_FEATURES),
                format!("Add the '{}' property with its required fields", feature),
            ));
        }

        for issue in result.feature_issues {
            findings.push(Diagnostic::new(
                DiagnosticCode::IncompleteEnterpriseFeature,
                DiagnosticType::Enterprise,
                issue.severity,
                issue.message,
                ErrorLocation::new(name, issue.field_path, RULE_ENTERPRISE_FEATURES),
                issue.suggestion,
            ));
        }

        for issue in result.specialization_issues {
            findings.push(
                Diagnostic::new(
                    DiagnosticCode::MissingSpecialization,
                    DiagnosticType::Specialization,
                    issue.severity,
                    issue.message,
                    ErrorLocation::new(name, format!("properties.{}", issue.feature), RULE_ENTERPRISE_FEATURES),
                    issue.suggestion,
                )
                .with_details(format!("pattern {}", issue.pattern)),
            );
        }
    }

    fn check_detailed_naming(&self, schema: &Value, name: &str, findings: &mut Findings) {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.naming.check_document(name, schema)));
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                return push_checker_failure(
                    findings,
                    name,
                    DiagnosticCode::NamingValidationError,
                    DiagnosticType::Naming,
                    panic_message(&*payload),
                )
            }
        };

        for violation in result.violations {
            findings.push(
                Diagnostic::new(
                    DiagnosticCode::NamingConventionViolation,
                    DiagnosticType::Naming,
                    violation.severity,
                    format!(
                        "'{}' violates snake_case naming ({:?})",
                        violation.field_name, violation.violation_type
                    ),
                    ErrorLocation::new(name, violation.field_path, RULE_NAMING_DETAILED),
                    violation.suggestion,
                )
                .with_details(format!(
                    "expected '{}', found '{}' in {} layer",
                    violation.expected_naming, violation.actual_naming, violation.layer
                )),
            );
        }
    }

    fn check_best_practices(&self, schema: &Value, name: &str, findings: &mut Findings) {
        let described = schema
            .get("description")
            .and_then(Value::as_str)
            .map_or(false, |d| !d.trim().is_empty());
        if !described {
            findings.push(Diagnostic::new(
                DiagnosticCode::BestPracticeWarning,
                DiagnosticType::BestPractice,
                Severity::Info,
                "Schema should have a meaningful description",
                ErrorLocation::new(name, "description", RULE_BEST_PRACTICES),
                "Add a description explaining the purpose of the schema",
            ));
        }

        if let Some(props) = schema.get("properties") {
            if props.get("protocol_version").is_none() {
                findings.push(Diagnostic::new(
                    DiagnosticCode::BestPracticeWarning,
                    DiagnosticType::BestPractice,
                    Severity::Info,
                    "Schema properties should include protocol_version",
                    ErrorLocation::new(name, "properties.protocol_version", RULE_BEST_PRACTICES),
                    "Add protocol_version for version tracking",
                ));
            }
        }
    }
}

fn push_checker_failure(
    findings: &mut Findings,
    name: &str,
    code: DiagnosticCode,
    diagnostic_type: DiagnosticType,
    reason: String,
) {
    warn!(schema = name, code = %code, %reason, "checker failed");
    findings.push(
        Diagnostic::new(
            code,
            diagnostic_type,
            Severity::Warning,
            format!("{} check could not complete", diagnostic_type),
            ErrorLocation::new(name, "", "checker"),
            "Review the schema structure; the check will run once it can be parsed",
        )
        .with_details(reason),
    );
}

/// `/a/b/0` -> `a.b.0`
fn pointer_to_dotted(pointer: &str) -> String {
    pointer
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}
