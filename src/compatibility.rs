//! Cross-schema compatibility checking
//!
//! Compares pairs of named schemas (version ordering, shared definitions,
//! root type, pluggable constraint rules) and validates the declared
//! compatibility matrix.

use chrono::{DateTime, Utc};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ComplianceConfig;
use crate::diagnostic::{
    panic_message, Diagnostic, DiagnosticCode, DiagnosticType, ErrorLocation, Findings,
    Severity, ValidationResult,
};
use crate::error::Result;
use crate::schema::SchemaDocument;
use crate::store::SchemaStore;
use crate::version;

pub const RULE_COMPATIBILITY: &str = "compatibility-check";
pub const RULE_VERSION: &str = "version-check";
pub const RULE_FIELDS: &str = "field-compatibility";
pub const RULE_TYPES: &str = "type-compatibility";
pub const RULE_CONSTRAINTS: &str = "constraint-compatibility";
pub const RULE_MATRIX_LOAD: &str = "matrix-load";
pub const RULE_MATRIX_VALIDATION: &str = "matrix-validation";

/// Extension point for constraint-level compatibility checks
pub trait ConstraintRule: Send + Sync {
    /// Rule name, used in logs
    fn name(&self) -> &str;

    /// Diagnostics for `source -> target`; empty when compatible
    fn check(&self, source: &SchemaDocument, target: &SchemaDocument) -> Vec<Diagnostic>;
}

/// One declared source -> target expectation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRule {
    pub source_schema: String,
    pub target_schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_version: Option<String>,
}

/// The compatibility matrix document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaCompatibilityMatrix {
    pub matrix_version: String,
    #[serde(default)]
    pub compatibility_rules: Vec<CompatibilityRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Default for SchemaCompatibilityMatrix {
    fn default() -> Self {
        Self {
            matrix_version: "1.0.0".to_string(),
            compatibility_rules: Vec::new(),
            last_updated: None,
        }
    }
}

impl SchemaCompatibilityMatrix {
    /// Read a matrix document
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write the matrix as pretty JSON, stamping `lastUpdated`
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.last_updated = Some(Utc::now().to_rfc3339());
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Classification of a schema pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityStatus {
    Compatible,
    Incompatible,
    /// Compatible, with a deprecation warning
    Deprecated,
    /// Could not be evaluated
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityDetail {
    pub source_schema: String,
    pub target_schema: String,
    pub status: CompatibilityStatus,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilitySummary {
    pub total_pairs: usize,
    pub compatible: usize,
    pub incompatible: usize,
    pub deprecated: usize,
    pub unknown: usize,
}

/// Pairwise compatibility across every listed schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReport {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub summary: CompatibilitySummary,
    pub details: Vec<CompatibilityDetail>,
}

impl CompatibilityReport {
    fn new(details: Vec<CompatibilityDetail>) -> Self {
        let mut summary = CompatibilitySummary {
            total_pairs: details.len(),
            ..Default::default()
        };
        for detail in &details {
            match detail.status {
                CompatibilityStatus::Compatible => summary.compatible += 1,
                CompatibilityStatus::Incompatible => summary.incompatible += 1,
                CompatibilityStatus::Deprecated => summary.deprecated += 1,
                CompatibilityStatus::Unknown => summary.unknown += 1,
            }
        }
        let generated_at = Utc::now();
        Self {
            report_id: format!("compat_report_{}", generated_at.timestamp_millis()),
            generated_at,
            summary,
            details,
        }
    }
}

/// Cross-schema compatibility validator
pub struct CompatibilityValidator {
    config: ComplianceConfig,
    store: Arc<SchemaStore>,
    constraint_rules: Vec<Box<dyn ConstraintRule>>,
}

impl CompatibilityValidator {
    pub fn new(config: ComplianceConfig, store: Arc<SchemaStore>) -> Self {
        Self {
            config,
            store,
            constraint_rules: Vec::new(),
        }
    }

    /// Register a constraint rule
    pub fn with_constraint_rule(mut self, rule: impl ConstraintRule + 'static) -> Self {
        self.constraint_rules.push(Box::new(rule));
        self
    }

    /// Check that `target` can accept documents written against `source`
    pub fn check_compatibility(&self, source: &str, target: &str) -> ValidationResult {
        let pair = format!("{} -> {}", source, target);
        let mut findings = Findings::new();
        findings.rule(RULE_COMPATIBILITY);

        let loaded = self.load(source).and_then(|s| Ok((s, self.load(target)?)));
        let (src, tgt) = match loaded {
            Ok(docs) => docs,
            Err(e) => {
                warn!(pair = %pair, error = %e, "compatibility check could not load schemas");
                findings.push(
                    Diagnostic::new(
                        DiagnosticCode::SchemaLoadError,
                        DiagnosticType::Compatibility,
                        Severity::Error,
                        format!("Failed to load schemas for compatibility check: {}", pair),
                        ErrorLocation::new(pair.as_str(), "", RULE_COMPATIBILITY),
                        "Check both schema files exist and contain valid JSON",
                    )
                    .with_details(e.to_string()),
                );
                return findings.into_result(Some(pair.as_str()), 2);
            }
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| self.run_checks(&src, &tgt, &pair, &mut findings)));
        if let Err(payload) = outcome {
            findings.push(
                Diagnostic::new(
                    DiagnosticCode::UnexpectedError,
                    DiagnosticType::Compatibility,
                    Severity::Critical,
                    "Unexpected error during compatibility check",
                    ErrorLocation::new(pair.as_str(), "", RULE_COMPATIBILITY),
                    "Review registered constraint rules",
                )
                .with_details(panic_message(&*payload)),
            );
        }

        debug!(pair = %pair, errors = findings.error_count(), "compatibility checked");
        findings.into_result(Some(pair.as_str()), 2)
    }

    fn run_checks(&self, src: &SchemaDocument, tgt: &SchemaDocument, pair: &str, findings: &mut Findings) {
        findings.rule(RULE_VERSION);
        if let (Some(sv), Some(tv)) = (src.version(), tgt.version()) {
            if version::is_newer(sv, tv) {
                findings.push(
                    Diagnostic::new(
                        DiagnosticCode::VersionMismatch,
                        DiagnosticType::Deprecation,
                        Severity::Warning,
                        format!("Source version {} is newer than target version {}", sv, tv),
                        ErrorLocation::new(pair, "version", RULE_VERSION),
                        "Consider version migration strategy",
                    )
                    .with_suggestions(["Update the target schema to the newer version"]),
                );
            }
        }

        findings.rule(RULE_FIELDS);
        if let Some(src_defs) = src.defs() {
            let tgt_defs = tgt.defs();
            for key in src_defs.keys() {
                if !tgt_defs.map_or(false, |d| d.contains_key(key)) {
                    findings.push(Diagnostic::new(
                        DiagnosticCode::MissingDefinition,
                        DiagnosticType::Compatibility,
                        Severity::Error,
                        format!("Definition '{}' is missing in {}", key, tgt.name),
                        ErrorLocation::new(pair, format!("$defs.{}", key), RULE_FIELDS),
                        format!("Add the '{}' definition to {}", key, tgt.name),
                    ));
                }
            }
        }

        findings.rule(RULE_TYPES);
        if src.root_type() != tgt.root_type() {
            let show = |t: Option<&serde_json::Value>| t.map_or("none".to_string(), |v| v.to_string());
            findings.push(
                Diagnostic::new(
                    DiagnosticCode::TypeMismatch,
                    DiagnosticType::Compatibility,
                    Severity::Error,
                    "Root type mismatch",
                    ErrorLocation::new(pair, "type", RULE_TYPES),
                    "Validate type changes for compatibility",
                )
                .with_details(format!("{} vs {}", show(src.root_type()), show(tgt.root_type()))),
            );
        }

        findings.rule(RULE_CONSTRAINTS);
        for rule in &self.constraint_rules {
            let found = rule.check(src, tgt);
            debug!(rule = rule.name(), found = found.len(), "constraint rule applied");
            findings.extend(found);
        }
    }

    /// Validate the configured compatibility matrix
    pub fn validate_compatibility_matrix(&self) -> ValidationResult {
        let matrix_file = self.config.schemas.matrix_file.clone();
        let mut findings = Findings::new();

        findings.rule(RULE_MATRIX_LOAD);
        let matrix = self.load_matrix(&mut findings);

        findings.rule(RULE_MATRIX_VALIDATION);
        for (i, rule) in matrix.compatibility_rules.iter().enumerate() {
            let base = format!("compatibilityRules[{}]", i);
            let mut source_doc = None;

            for (field, name) in [("sourceSchema", &rule.source_schema), ("targetSchema", &rule.target_schema)] {
                let path = format!("{}.{}", base, field);
                if name.trim().is_empty() {
                    findings.push(Diagnostic::new(
                        DiagnosticCode::MatrixValidationError,
                        DiagnosticType::Reference,
                        Severity::Error,
                        format!("Compatibility rule {} has an empty {}", i, field),
                        ErrorLocation::new(matrix_file.as_str(), path, RULE_MATRIX_VALIDATION),
                        "Name an existing schema in every compatibility rule",
                    ));
                    continue;
                }
                match self.resolve_name(name) {
                    Some(resolved) => {
                        if field == "sourceSchema" {
                            source_doc = self.store.load(&resolved).ok();
                        }
                    }
                    None => findings.push(
                        Diagnostic::new(
                            DiagnosticCode::SchemaNotFound,
                            DiagnosticType::Reference,
                            Severity::Error,
                            format!("Schema not found: {}", name),
                            ErrorLocation::new(matrix_file.as_str(), path, RULE_MATRIX_VALIDATION),
                            self.did_you_mean(name),
                        )
                        .with_suggestions(["Check referenced schema files exist"]),
                    ),
                }
            }

            let Some(required) = &rule.required_version else { continue };
            if !version::is_valid_format(required) {
                findings.push(Diagnostic::new(
                    DiagnosticCode::InvalidVersionFormat,
                    DiagnosticType::BestPractice,
                    Severity::Warning,
                    format!("Invalid version format: {}", required),
                    ErrorLocation::new(matrix_file.as_str(), format!("{}.requiredVersion", base), RULE_MATRIX_VALIDATION),
                    "Use semantic versioning format (x.y.z)",
                ));
                continue;
            }
            let declared = source_doc.as_ref().and_then(|d| d.version().map(str::to_string));
            if let Some(declared) = declared {
                if version::compare(&declared, required).is_lt() {
                    findings.push(Diagnostic::new(
                        DiagnosticCode::VersionMismatch,
                        DiagnosticType::Deprecation,
                        Severity::Warning,
                        format!(
                            "{} declares version {} but the matrix requires {}",
                            rule.source_schema, declared, required
                        ),
                        ErrorLocation::new(matrix_file.as_str(), format!("{}.requiredVersion", base), RULE_MATRIX_VALIDATION),
                        "Plan migration to newer version",
                    ));
                }
            }
        }

        findings.into_result(Some(matrix_file.as_str()), matrix.compatibility_rules.len())
    }

    /// Pairwise compatibility across all listed schemas
    pub fn generate_compatibility_report(&self) -> CompatibilityReport {
        let names = match self.store.schema_names() {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "cannot list schemas for compatibility report");
                return CompatibilityReport::new(vec![CompatibilityDetail {
                    source_schema: "*".to_string(),
                    target_schema: "*".to_string(),
                    status: CompatibilityStatus::Unknown,
                    issues: vec![format!("Cannot list schema directory: {}", e)],
                    recommendations: vec!["Check the configured schema directory".to_string()],
                }]);
            }
        };

        let pairs: Vec<(&String, &String)> = names
            .iter()
            .enumerate()
            .flat_map(|(i, a)| names[i + 1..].iter().map(move |b| (a, b)))
            .collect();

        let details: Vec<CompatibilityDetail> = pairs
            .par_iter()
            .map(|(a, b)| classify(a, b, &self.check_compatibility(a, b)))
            .collect();

        let report = CompatibilityReport::new(details);
        info!(
            pairs = report.summary.total_pairs,
            incompatible = report.summary.incompatible,
            "compatibility report generated"
        );
        report
    }

    /// Matrix from disk; absent means empty, malformed adds a warning
    fn load_matrix(&self, findings: &mut Findings) -> SchemaCompatibilityMatrix {
        let path = self.config.matrix_path();
        if !path.exists() {
            debug!(path = %path.display(), "no compatibility matrix, using empty matrix");
            return SchemaCompatibilityMatrix::default();
        }
        match SchemaCompatibilityMatrix::load(&path) {
            Ok(matrix) => matrix,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "compatibility matrix unreadable");
                findings.push(
                    Diagnostic::new(
                        DiagnosticCode::MatrixParseError,
                        DiagnosticType::Reference,
                        Severity::Warning,
                        "Compatibility matrix could not be parsed, using an empty matrix",
                        ErrorLocation::new(self.config.schemas.matrix_file.as_str(), "", RULE_MATRIX_LOAD),
                        "Fix the JSON in the compatibility matrix file",
                    )
                    .with_details(e.to_string()),
                );
                SchemaCompatibilityMatrix::default()
            }
        }
    }

    fn load(&self, name: &str) -> Result<Arc<SchemaDocument>> {
        let resolved = self.resolve_name(name).unwrap_or_else(|| name.to_string());
        self.store.load(&resolved)
    }

    fn resolve_name(&self, name: &str) -> Option<String> {
        self.store.resolve(name)
    }

    fn did_you_mean(&self, name: &str) -> String {
        let candidates = self.store.schema_names().unwrap_or_default();
        match closest_name(name, &candidates) {
            Some(candidate) => format!("Did you mean '{}'?", candidate),
            None if candidates.is_empty() => "Add the schema file to the schema directory".to_string(),
            None => format!("Available schemas: {}", candidates.join(", ")),
        }
    }
}

/// Minimum normalized Levenshtein similarity for a typo suggestion
const SUGGESTION_SIMILARITY: f64 = 0.7;

/// Closest known schema name to `name`
///
/// Subsequence matches in either direction win (`plan` vs `mplp-plan`);
/// otherwise the most similar name by edit distance above the threshold.
fn closest_name<'a>(name: &str, candidates: &'a [String]) -> Option<&'a String> {
    let matcher = SkimMatcherV2::default();
    let fuzzy = candidates
        .iter()
        .filter_map(|c| {
            let forward = matcher.fuzzy_match(c, name);
            let backward = matcher.fuzzy_match(name, c);
            forward.max(backward).map(|score| (score, c))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, c)| c);
    if fuzzy.is_some() {
        return fuzzy;
    }

    candidates
        .iter()
        .map(|c| (strsim::normalized_levenshtein(name, c), c))
        .filter(|(similarity, _)| *similarity >= SUGGESTION_SIMILARITY)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c)
}

fn classify(source: &str, target: &str, result: &ValidationResult) -> CompatibilityDetail {
    let status = if result.has_diagnostic(DiagnosticCode::SchemaLoadError) {
        CompatibilityStatus::Unknown
    } else if !result.is_valid {
        CompatibilityStatus::Incompatible
    } else if result.has_diagnostic(DiagnosticCode::VersionMismatch) {
        CompatibilityStatus::Deprecated
    } else {
        CompatibilityStatus::Compatible
    };

    let recommendations: &[&str] = match status {
        CompatibilityStatus::Incompatible => &[
            "Review breaking changes between schemas",
            "Consider version migration strategy",
        ],
        CompatibilityStatus::Deprecated => &["Plan migration to newer version", "Update deprecated field usage"],
        CompatibilityStatus::Unknown => &["Fix schema loading errors and rerun the report"],
        CompatibilityStatus::Compatible => &[],
    };

    CompatibilityDetail {
        source_schema: source.to_string(),
        target_schema: target.to_string(),
        status,
        issues: result.diagnostics().map(|d| d.message.clone()).collect(),
        recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup(schemas: &[(&str, serde_json::Value)]) -> (TempDir, CompatibilityValidator) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in schemas {
            std::fs::write(dir.path().join(format!("{}.json", name)), body.to_string()).unwrap();
        }
        let config = ComplianceConfig::with_schemas_dir(dir.path());
        let store = Arc::new(SchemaStore::new(dir.path(), "mplp-"));
        (dir, CompatibilityValidator::new(config, store))
    }

    fn schema(version: &str, ty: &str, defs: &[&str]) -> serde_json::Value {
        let defs: serde_json::Map<String, serde_json::Value> =
            defs.iter().map(|d| (d.to_string(), json!({"type": "string"}))).collect();
        json!({"type": ty, "version": version, "$defs": defs})
    }

    #[test]
    fn test_closest_name_handles_typos() {
        let names = vec!["mplp-context".to_string(), "mplp-plan".to_string()];
        assert_eq!(closest_name("mplp-planner", &names), Some(&names[1]));
        assert_eq!(closest_name("plan", &names), Some(&names[1]));
        assert_eq!(closest_name("mplp-contxet", &names), Some(&names[0]));
        assert_eq!(closest_name("zzzz", &names), None);
    }

    #[test]
    fn test_compatible_pair() {
        let (_dir, validator) = setup(&[
            ("mplp-a", schema("1.0.0", "object", &["uuid"])),
            ("mplp-b", schema("1.0.0", "object", &["uuid", "timestamp"])),
        ]);
        let result = validator.check_compatibility("mplp-a", "mplp-b");
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
        assert_eq!(
            result.metadata.rules_applied,
            vec![RULE_COMPATIBILITY, RULE_VERSION, RULE_FIELDS, RULE_TYPES, RULE_CONSTRAINTS]
        );
        assert_eq!(result.schema_name(), "mplp-a -> mplp-b");
    }

    #[test]
    fn test_newer_source_is_warning_only() {
        let (_dir, validator) = setup(&[
            ("mplp-a", schema("1.1.0", "object", &["uuid"])),
            ("mplp-b", schema("1.0.0", "object", &["uuid"])),
        ]);
        let result = validator.check_compatibility("mplp-a", "mplp-b");
        assert!(result.is_valid);
        assert_eq!(result.warnings[0].code, DiagnosticCode::VersionMismatch);
        assert_eq!(result.warnings[0].location.schema_file, "mplp-a -> mplp-b");
    }

    #[test]
    fn test_missing_definition_and_type_mismatch() {
        let (_dir, validator) = setup(&[
            ("mplp-a", schema("1.0.0", "object", &["uuid", "timestamp"])),
            ("mplp-b", schema("1.0.0", "array", &["uuid"])),
        ]);
        let result = validator.check_compatibility("mplp-a", "mplp-b");
        assert!(!result.is_valid);
        let codes: Vec<_> = result.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::MissingDefinition, DiagnosticCode::TypeMismatch]);
        assert_eq!(result.errors[0].location.json_path, "$defs.timestamp");
    }

    #[test]
    fn test_unknown_schema_is_load_error() {
        let (_dir, validator) = setup(&[("mplp-a", schema("1.0.0", "object", &[]))]);
        let result = validator.check_compatibility("mplp-a", "mplp-ghost");
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].code, DiagnosticCode::SchemaLoadError);
    }

    struct ForbidAdditional;

    impl ConstraintRule for ForbidAdditional {
        fn name(&self) -> &str {
            "forbid-additional"
        }

        fn check(&self, _source: &SchemaDocument, target: &SchemaDocument) -> Vec<Diagnostic> {
            if target.content.get("additionalProperties") == Some(&json!(false)) {
                vec![Diagnostic::new(
                    DiagnosticCode::ConstraintViolation,
                    DiagnosticType::Compatibility,
                    Severity::Error,
                    "Target forbids additional properties",
                    ErrorLocation::new(&target.name, "additionalProperties", RULE_CONSTRAINTS),
                    "Allow additional properties in the target",
                )]
            } else {
                vec![]
            }
        }
    }

    #[test]
    fn test_constraint_rule_hook() {
        let mut strict = schema("1.0.0", "object", &[]);
        strict["additionalProperties"] = json!(false);
        let (_dir, validator) = setup(&[("mplp-a", schema("1.0.0", "object", &[])), ("mplp-b", strict)]);
        let validator = validator.with_constraint_rule(ForbidAdditional);
        let result = validator.check_compatibility("mplp-a", "mplp-b");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, DiagnosticCode::ConstraintViolation);
    }

    #[test]
    fn test_absent_matrix_is_empty() {
        let (_dir, validator) = setup(&[]);
        let result = validator.validate_compatibility_matrix();
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
        assert_eq!(result.metadata.rules_applied, vec![RULE_MATRIX_LOAD, RULE_MATRIX_VALIDATION]);
    }

    #[test]
    fn test_malformed_matrix_is_warning() {
        let (dir, validator) = setup(&[]);
        std::fs::write(dir.path().join("compatibility-matrix.json"), "{ not json").unwrap();
        let result = validator.validate_compatibility_matrix();
        assert!(result.is_valid);
        assert_eq!(result.warnings[0].code, DiagnosticCode::MatrixParseError);
    }

    #[test]
    fn test_matrix_references() {
        let (dir, validator) = setup(&[
            ("mplp-context", schema("1.0.0", "object", &[])),
            ("mplp-plan", schema("1.0.0", "object", &[])),
        ]);
        let mut matrix = SchemaCompatibilityMatrix {
            compatibility_rules: vec![
                CompatibilityRule {
                    source_schema: "context".to_string(),
                    target_schema: "mplp-plan".to_string(),
                    required_version: Some("1.0".to_string()),
                },
                CompatibilityRule {
                    source_schema: "mplp-contxt".to_string(),
                    target_schema: "mplp-plan".to_string(),
                    required_version: Some("2.0.0".to_string()),
                },
            ],
            ..Default::default()
        };
        matrix.save(dir.path().join("compatibility-matrix.json")).unwrap();

        let result = validator.validate_compatibility_matrix();
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        let missing = &result.errors[0];
        assert_eq!(missing.code, DiagnosticCode::SchemaNotFound);
        assert_eq!(missing.diagnostic_type, DiagnosticType::Reference);
        assert_eq!(missing.location.json_path, "compatibilityRules[1].sourceSchema");
        assert_eq!(missing.suggestions[0], "Did you mean 'mplp-context'?");
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, DiagnosticCode::InvalidVersionFormat);
    }

    #[test]
    fn test_matrix_serializes_camel_case() {
        let matrix = SchemaCompatibilityMatrix {
            compatibility_rules: vec![CompatibilityRule {
                source_schema: "mplp-a".to_string(),
                target_schema: "mplp-b".to_string(),
                required_version: None,
            }],
            ..Default::default()
        };
        let json = serde_json::to_value(&matrix).unwrap();
        assert_eq!(json["matrixVersion"], "1.0.0");
        assert_eq!(json["compatibilityRules"][0]["sourceSchema"], "mplp-a");
    }

    #[test]
    fn test_report_classifies_pairs() {
        let (_dir, validator) = setup(&[
            ("mplp-a", schema("1.0.0", "object", &["uuid"])),
            ("mplp-b", schema("1.0.0", "object", &["uuid"])),
            ("mplp-c", schema("0.9.0", "array", &["uuid"])),
        ]);
        let report = validator.generate_compatibility_report();
        assert_eq!(report.summary.total_pairs, 3);
        let statuses: Vec<_> = report
            .details
            .iter()
            .map(|d| (d.source_schema.as_str(), d.target_schema.as_str(), d.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("mplp-a", "mplp-b", CompatibilityStatus::Compatible),
                ("mplp-a", "mplp-c", CompatibilityStatus::Incompatible),
                ("mplp-b", "mplp-c", CompatibilityStatus::Incompatible),
            ]
        );
        assert_eq!(report.summary.incompatible, 2);
        assert!(report.report_id.starts_with("compat_report_"));
    }

    #[test]
    fn test_report_on_missing_directory() {
        let store = Arc::new(SchemaStore::new("/definitely/not/here", "mplp-"));
        let validator = CompatibilityValidator::new(ComplianceConfig::default(), store);
        let report = validator.generate_compatibility_report();
        assert_eq!(report.details.len(), 1);
        assert_eq!(report.details[0].status, CompatibilityStatus::Unknown);
    }
}
