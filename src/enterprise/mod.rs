//! Enterprise Feature Checking
//!
//! Verifies that a schema declares every catalog feature as a top-level
//! property, that each present feature is structurally complete, and that
//! module-specific specialization fields exist.
//!
//! Completeness and specialization are independent: a feature with missing
//! required fields can still satisfy its specialization patterns and the
//! other way round.

pub mod catalog;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

use crate::diagnostic::Severity;
use crate::error::Result;
use crate::schema::{module_name, SchemaDocument};

pub use catalog::{EnterpriseCatalog, EnterpriseFeatureDefinition, EnterpriseValidationRule};

/// What went wrong with a present feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// The feature sub-schema declares no `properties`
    MissingProperties,
    MissingField,
    TypeMismatch,
    RuleViolation,
}

/// A completeness problem in a present feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterpriseFeatureIssue {
    pub feature: String,
    /// Dotted path from the schema root
    pub field_path: String,
    pub issue_type: IssueType,
    pub message: String,
    pub severity: Severity,
    pub suggestion: String,
}

/// A missing module-specific field; always warning level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecializationIssue {
    pub feature: String,
    pub pattern: String,
    /// Pattern with the module name filled in
    pub expected_field: String,
    pub message: String,
    pub severity: Severity,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterpriseSummary {
    pub total_features: usize,
    pub present_features: usize,
    pub complete_features: usize,
    pub compliance_percentage: f64,
    pub issue_count: usize,
    pub specialization_issue_count: usize,
    pub specialization_score: u32,
}

/// Result of checking one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterpriseFeatureValidationResult {
    pub schema_name: String,
    pub module_name: String,
    /// No missing features and no blocking issues
    pub is_compliant: bool,
    pub present_features: Vec<String>,
    pub missing_features: Vec<String>,
    pub complete_features: Vec<String>,
    pub feature_issues: Vec<EnterpriseFeatureIssue>,
    pub specialization_issues: Vec<SpecializationIssue>,
    pub summary: EnterpriseSummary,
}

/// The enterprise feature checker
pub struct EnterpriseChecker {
    catalog: EnterpriseCatalog,
    /// Schema name prefix stripped to get the module name
    prefix: String,
}

impl EnterpriseChecker {
    /// Checker over the built-in catalog
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_catalog(EnterpriseCatalog::builtin(), prefix)
    }

    pub fn with_catalog(catalog: EnterpriseCatalog, prefix: impl Into<String>) -> Self {
        Self {
            catalog,
            prefix: prefix.into(),
        }
    }

    pub fn catalog(&self) -> &EnterpriseCatalog {
        &self.catalog
    }

    /// Check a schema file
    pub fn validate_enterprise_features(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<EnterpriseFeatureValidationResult> {
        let doc = SchemaDocument::from_file(path)?;
        self.check_document(&doc.name, &doc.content)
    }

    /// Check an already parsed schema
    pub fn check_document(&self, schema_name: &str, schema: &Value) -> Result<EnterpriseFeatureValidationResult> {
        let module = module_name(schema_name, &self.prefix);
        let mut present = Vec::new();
        let mut missing = Vec::new();
        let mut complete = Vec::new();
        let mut issues = Vec::new();
        let mut specialization_issues = Vec::new();

        for definition in &self.catalog.features {
            let Some(raw) = schema.pointer(&format!("/properties/{}", definition.name)) else {
                missing.push(definition.name.clone());
                continue;
            };
            present.push(definition.name.clone());
            let feature = resolve(schema, raw);

            let before = issues.len();
            self.check_completeness(schema, definition, feature, &mut issues);
            if issues.len() == before {
                complete.push(definition.name.clone());
            }

            self.check_specialization(definition, feature, &module, &mut specialization_issues)?;
        }

        let total = self.catalog.len();
        let compliance_percentage = if total == 0 {
            100.0
        } else {
            complete.len() as f64 / total as f64 * 100.0
        };
        let specialization_score =
            100u32.saturating_sub(10u32.saturating_mul(specialization_issues.len() as u32));

        let is_compliant = missing.is_empty() && !issues.iter().any(|i| i.severity.is_blocking());

        Ok(EnterpriseFeatureValidationResult {
            schema_name: schema_name.to_string(),
            module_name: module,
            is_compliant,
            summary: EnterpriseSummary {
                total_features: total,
                present_features: present.len(),
                complete_features: complete.len(),
                compliance_percentage,
                issue_count: issues.len(),
                specialization_issue_count: specialization_issues.len(),
                specialization_score,
            },
            present_features: present,
            missing_features: missing,
            complete_features: complete,
            feature_issues: issues,
            specialization_issues,
        })
    }

    fn check_completeness(
        &self,
        root: &Value,
        definition: &EnterpriseFeatureDefinition,
        feature: &Value,
        issues: &mut Vec<EnterpriseFeatureIssue>,
    ) {
        let base = format!("properties.{}", definition.name);
        let Some(props) = feature.get("properties").and_then(Value::as_object) else {
            issues.push(EnterpriseFeatureIssue {
                feature: definition.name.clone(),
                field_path: base.clone(),
                issue_type: IssueType::MissingProperties,
                message: format!("Enterprise feature '{}' declares no properties", definition.name),
                severity: Severity::Error,
                suggestion: format!("Define the {} fields under {}.properties", definition.name, base),
            });
            return;
        };
        let field_path = |field: &str| format!("{}.properties.{}", base, field);

        for field in &definition.required_fields {
            if !props.contains_key(field) {
                issues.push(EnterpriseFeatureIssue {
                    feature: definition.name.clone(),
                    field_path: field_path(field),
                    issue_type: IssueType::MissingField,
                    message: format!("Enterprise feature '{}' is missing required field '{}'", definition.name, field),
                    severity: Severity::Error,
                    suggestion: format!("Add '{}' to {}.properties", field, base),
                });
            }
        }

        // Fields covered by a field_type rule are type-checked there
        let rule_typed: BTreeSet<&str> = definition
            .validation_rules
            .iter()
            .filter(|r| matches!(r, EnterpriseValidationRule::FieldType { .. }))
            .map(|r| r.field())
            .collect();

        for (field, expected) in &definition.required_structure {
            if rule_typed.contains(field.as_str()) {
                continue;
            }
            let Some(sub) = props.get(field) else { continue };
            let sub = resolve(root, sub);
            if !type_matches(sub, expected) {
                issues.push(EnterpriseFeatureIssue {
                    feature: definition.name.clone(),
                    field_path: field_path(field),
                    issue_type: IssueType::TypeMismatch,
                    message: format!(
                        "Field '{}' of '{}' should be of type {} but declares {}",
                        field,
                        definition.name,
                        expected,
                        declared_type(sub)
                    ),
                    severity: Severity::Error,
                    suggestion: format!("Set \"type\": \"{}\" on {}", expected, field_path(field)),
                });
            }
        }

        for rule in &definition.validation_rules {
            if let Some(problem) = evaluate_rule(rule, root, props) {
                issues.push(EnterpriseFeatureIssue {
                    feature: definition.name.clone(),
                    field_path: field_path(rule.field()),
                    issue_type: IssueType::RuleViolation,
                    message: format!("{}: {}", rule.message(), problem),
                    severity: rule.severity(),
                    suggestion: rule.message().to_string(),
                });
            }
        }
    }

    fn check_specialization(
        &self,
        definition: &EnterpriseFeatureDefinition,
        feature: &Value,
        module: &str,
        out: &mut Vec<SpecializationIssue>,
    ) -> Result<()> {
        if definition.specialization_fields.is_empty() {
            return Ok(());
        }
        let mut names = BTreeSet::new();
        collect_property_names(feature, &mut names);

        for pattern in &definition.specialization_fields {
            let regex = specialization_regex(pattern, module)?;
            if names.iter().any(|n| regex.is_match(n)) {
                continue;
            }
            let expected_field = pattern.replace(catalog::MODULE_PLACEHOLDER, module);
            out.push(SpecializationIssue {
                feature: definition.name.clone(),
                pattern: pattern.clone(),
                message: format!(
                    "Enterprise feature '{}' has no module-specific field matching '{}'",
                    definition.name, expected_field
                ),
                suggestion: format!(
                    "Add a '{}' field under properties.{}",
                    expected_field, definition.name
                ),
                expected_field,
                severity: Severity::Warning,
            });
        }
        Ok(())
    }
}

/// Evaluate one rule against the feature properties. Returns the problem text.
fn evaluate_rule(rule: &EnterpriseValidationRule, root: &Value, props: &Map<String, Value>) -> Option<String> {
    match rule {
        EnterpriseValidationRule::FieldType {
            field,
            expected_type,
            minimum,
            maximum,
            ..
        } => {
            let sub = resolve(root, props.get(field)?);
            if !type_matches(sub, expected_type) {
                return Some(format!("declared type is {}", declared_type(sub)));
            }
            let mut problems = Vec::new();
            let declared_min = sub.get("minimum").and_then(Value::as_f64);
            let declared_max = sub.get("maximum").and_then(Value::as_f64);
            if let Some(min) = minimum {
                match declared_min {
                    None => problems.push("no minimum declared".to_string()),
                    Some(m) if m < *min => problems.push(format!("minimum {} is below {}", m, min)),
                    _ => {}
                }
            }
            if let Some(max) = maximum {
                match declared_max {
                    None => problems.push("no maximum declared".to_string()),
                    Some(m) if m > *max => problems.push(format!("maximum {} is above {}", m, max)),
                    _ => {}
                }
            }
            if let Some(default) = sub.get("default").and_then(Value::as_f64) {
                let below = minimum.map_or(false, |min| default < min);
                let above = maximum.map_or(false, |max| default > max);
                if below || above {
                    problems.push(format!("default {} is out of range", default));
                }
            }
            if problems.is_empty() {
                None
            } else {
                Some(problems.join("; "))
            }
        }
        EnterpriseValidationRule::RequiredField { field, .. } => {
            if props.contains_key(field) {
                None
            } else {
                Some(format!("'{}' is not declared", field))
            }
        }
        EnterpriseValidationRule::Custom { function, field, .. } => {
            let sub = props.get(field).map(|s| resolve(root, s));
            match function.as_str() {
                "non_empty_enum" => {
                    let sub = sub?;
                    let has_enum = |v: &Value| {
                        v.get("enum")
                            .and_then(Value::as_array)
                            .map_or(false, |e| !e.is_empty())
                    };
                    let items_enum = sub.get("items").map(|i| resolve(root, i)).map_or(false, has_enum);
                    if has_enum(sub) || items_enum {
                        None
                    } else {
                        Some(format!("'{}' has no non-empty enum", field))
                    }
                }
                "has_description" => {
                    let sub = sub?;
                    let described = sub
                        .get("description")
                        .and_then(Value::as_str)
                        .map_or(false, |d| !d.trim().is_empty());
                    if described {
                        None
                    } else {
                        Some(format!("'{}' has no description", field))
                    }
                }
                other => Some(format!("unknown validation function '{}'", other)),
            }
        }
    }
}

/// Follow a local `$ref` (`#/...`) once; anything else is returned as is
fn resolve<'a>(root: &'a Value, value: &'a Value) -> &'a Value {
    value
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix('#'))
        .and_then(|pointer| root.pointer(pointer))
        .unwrap_or(value)
}

fn declared_type(schema: &Value) -> String {
    match schema.get("type") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("|"),
        _ => "no type".to_string(),
    }
}

/// Declared type equals (or lists) `expected`; `number` also accepts `integer`
fn type_matches(schema: &Value, expected: &str) -> bool {
    let accepts = |t: &str| t == expected || (expected == "number" && t == "integer");
    match schema.get("type") {
        Some(Value::String(t)) => accepts(t),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(accepts),
        _ => false,
    }
}

/// Every key of every `properties` map inside `value`
fn collect_property_names(value: &Value, names: &mut BTreeSet<String>) {
    match value {
        Value::Object(obj) => {
            if let Some(Value::Object(props)) = obj.get("properties") {
                names.extend(props.keys().cloned());
            }
            for sub in obj.values() {
                collect_property_names(sub, names);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_property_names(item, names);
            }
        }
        _ => {}
    }
}

/// Anchored regex for a specialization pattern
fn specialization_regex(pattern: &str, module: &str) -> Result<Regex> {
    let mut regex = String::from("^");
    for (i, segment) in pattern.split(catalog::MODULE_PLACEHOLDER).enumerate() {
        if i > 0 {
            regex.push_str(&regex::escape(module));
        }
        let literal: Vec<String> = segment.split('*').map(regex::escape).collect();
        regex.push_str(&literal.join("[a-z0-9_]+"));
    }
    regex.push('$');
    Ok(Regex::new(&regex)?)
}
