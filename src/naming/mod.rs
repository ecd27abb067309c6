//! Naming Convention Checking
//!
//! Schema field names, definition names and enum values must be snake_case
//! (`^[a-z][a-z0-9]*(_[a-z0-9]+)*$`). The application model layer uses the
//! camelCase equivalents, which are reported as field mappings.
//!
//! ## Walk
//! Depth-first over `properties` (including nested property schemas, `items`,
//! `additionalProperties` and the combinators), string `enum` values, and
//! `$defs` / `definitions`. Every discovered name is counted exactly once.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::diagnostic::Severity;
use crate::error::Result;
use crate::schema::SchemaDocument;

/// Layer the checked names belong to
pub const SCHEMA_LAYER: &str = "schema";

/// Kind of naming violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    /// camelCase or PascalCase
    WrongCase,
    /// Upper case mixed with underscores
    MixedConvention,
    /// Dashes, spaces, leading digits and other illegal shapes
    InvalidPattern,
}

/// Where a name was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingScope {
    Property,
    Definition,
    EnumValue,
}

/// Severity assigned to violations in one scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingRule {
    pub scope: NamingScope,
    pub severity: Severity,
}

/// A single non-compliant name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingViolation {
    pub field_path: String,
    pub field_name: String,
    pub violation_type: ViolationType,
    pub expected_naming: String,
    pub actual_naming: String,
    pub layer: String,
    pub severity: Severity,
    pub suggestion: String,
}

/// Schema field name paired with its application model name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub field_path: String,
    pub schema_field: String,
    pub model_field: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingSummary {
    pub total_fields: usize,
    pub compliant_fields: usize,
    pub violation_count: usize,
    pub compliance_percentage: f64,
}

/// Result of checking one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamingConventionValidationResult {
    pub schema_name: String,
    pub is_compliant: bool,
    pub violations: Vec<NamingViolation>,
    pub field_mappings: Vec<FieldMapping>,
    pub summary: NamingSummary,
}

/// The naming convention checker
pub struct NamingChecker {
    snake_case: Regex,
    rules: Vec<NamingRule>,
}

impl Default for NamingChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk state: counts and findings from a single pass
#[derive(Default)]
struct Walk {
    total: usize,
    compliant: usize,
    violations: Vec<NamingViolation>,
    mappings: Vec<FieldMapping>,
}

impl NamingChecker {
    pub fn new() -> Self {
        Self::with_rules(vec![
            NamingRule { scope: NamingScope::Property, severity: Severity::Error },
            NamingRule { scope: NamingScope::Definition, severity: Severity::Warning },
            NamingRule { scope: NamingScope::EnumValue, severity: Severity::Warning },
        ])
    }

    /// Checker with custom per-scope severities. Scopes without a rule
    /// default to warning.
    pub fn with_rules(rules: Vec<NamingRule>) -> Self {
        Self {
            snake_case: Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)*$").unwrap(),
            rules,
        }
    }

    pub fn is_compliant(&self, name: &str) -> bool {
        self.snake_case.is_match(name)
    }

    /// Classify a non-compliant name
    pub fn classify(&self, name: &str) -> ViolationType {
        let illegal = name
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '_'));
        let has_upper = name.chars().any(|c| c.is_ascii_uppercase());
        if illegal {
            ViolationType::InvalidPattern
        } else if has_upper && name.contains('_') {
            ViolationType::MixedConvention
        } else if has_upper {
            ViolationType::WrongCase
        } else {
            ViolationType::InvalidPattern
        }
    }

    fn severity_for(&self, scope: NamingScope) -> Severity {
        self.rules
            .iter()
            .find(|r| r.scope == scope)
            .map(|r| r.severity)
            .unwrap_or(Severity::Warning)
    }

    /// Check a schema file
    pub fn validate_naming_convention(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<NamingConventionValidationResult> {
        let doc = SchemaDocument::from_file(path)?;
        Ok(self.check_document(&doc.name, &doc.content))
    }

    /// Check an already parsed schema
    pub fn check_document(&self, schema_name: &str, schema: &Value) -> NamingConventionValidationResult {
        let mut walk = Walk::default();

        self.walk_schema(schema, "", &mut walk);

        let defs = schema
            .get("$defs")
            .map(|d| ("$defs", d))
            .or_else(|| schema.get("definitions").map(|d| ("definitions", d)));
        if let Some((keyword, Value::Object(defs))) = defs {
            for (name, body) in defs {
                let path = format!("{}.{}", keyword, name);
                self.record(name, &path, NamingScope::Definition, &mut walk);
                self.walk_schema(body, &path, &mut walk);
            }
        }

        let compliance_percentage = if walk.total == 0 {
            100.0
        } else {
            walk.compliant as f64 / walk.total as f64 * 100.0
        };

        NamingConventionValidationResult {
            schema_name: schema_name.to_string(),
            is_compliant: walk.violations.is_empty(),
            summary: NamingSummary {
                total_fields: walk.total,
                compliant_fields: walk.compliant,
                violation_count: walk.violations.len(),
                compliance_percentage,
            },
            violations: walk.violations,
            field_mappings: walk.mappings,
        }
    }

    fn walk_properties(&self, props: &Map<String, Value>, path: &str, walk: &mut Walk) {
        for (key, sub) in props {
            let child_path = join(path, key);
            self.record(key, &child_path, NamingScope::Property, walk);
            walk.mappings.push(FieldMapping {
                field_path: child_path.clone(),
                schema_field: to_snake_case(key),
                model_field: to_camel_case(key),
            });
            self.walk_schema(sub, &child_path, walk);
        }
    }

    fn walk_schema(&self, schema: &Value, path: &str, walk: &mut Walk) {
        let Value::Object(obj) = schema else { return };

        if let Some(Value::Object(props)) = obj.get("properties") {
            self.walk_properties(props, path, walk);
        }

        match obj.get("items") {
            Some(items @ Value::Object(_)) => self.walk_schema(items, &format!("{}[]", path), walk),
            Some(Value::Array(items)) => {
                for item in items {
                    self.walk_schema(item, &format!("{}[]", path), walk);
                }
            }
            _ => {}
        }

        if let Some(extra @ Value::Object(_)) = obj.get("additionalProperties") {
            self.walk_schema(extra, path, walk);
        }

        for keyword in ["allOf", "anyOf", "oneOf"] {
            if let Some(Value::Array(branches)) = obj.get(keyword) {
                for branch in branches {
                    self.walk_schema(branch, path, walk);
                }
            }
        }

        for keyword in ["not", "if", "then", "else"] {
            if let Some(sub) = obj.get(keyword) {
                self.walk_schema(sub, path, walk);
            }
        }

        if let Some(Value::Array(values)) = obj.get("enum") {
            for (i, value) in values.iter().enumerate() {
                if let Some(s) = value.as_str() {
                    let enum_path = format!("{}.enum[{}]", path, i);
                    self.record(s, &enum_path, NamingScope::EnumValue, walk);
                }
            }
        }
    }

    fn record(&self, name: &str, path: &str, scope: NamingScope, walk: &mut Walk) {
        walk.total += 1;
        if self.is_compliant(name) {
            walk.compliant += 1;
            return;
        }

        let expected = to_snake_case(name);
        let suggestion = if expected.is_empty() || expected == name {
            format!("Rename '{}' to a snake_case identifier", name)
        } else {
            format!("Rename '{}' to '{}'", name, expected)
        };
        walk.violations.push(NamingViolation {
            field_path: path.to_string(),
            field_name: name.to_string(),
            violation_type: self.classify(name),
            expected_naming: expected,
            actual_naming: name.to_string(),
            layer: SCHEMA_LAYER.to_string(),
            severity: self.severity_for(scope),
            suggestion,
        });
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Convert an identifier to snake_case.
///
/// Handles camelCase, PascalCase, acronyms (`HTTPServer` -> `http_server`),
/// dashes and spaces. Already snake_case input is returned unchanged.
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | ' ' | '.') {
            out.push('_');
            continue;
        }
        if !c.is_ascii_alphanumeric() {
            continue;
        }
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|j| chars[j]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.map_or(false, |n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    // Collapse runs and trim the ends
    out.split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert an identifier to camelCase (via snake_case)
pub fn to_camel_case(input: &str) -> String {
    let snake = to_snake_case(input);
    let mut out = String::with_capacity(snake.len());
    for (i, part) in snake.split('_').enumerate() {
        if i == 0 {
            out.push_str(part);
            continue;
        }
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
