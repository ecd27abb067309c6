//! Enterprise feature catalog
//!
//! Declarative definitions of the cross-cutting features every protocol
//! schema must declare. The built-in catalog can be replaced by a JSON
//! document with the same shape:
//!
//! ```json
//! { "features": [ { "name": "audit_trail", "required_fields": ["enabled"], ... } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::diagnostic::Severity;
use crate::error::Result;

/// Placeholder replaced by the module name in specialization patterns
pub const MODULE_PLACEHOLDER: &str = "{module}";

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterpriseFeatureDefinition {
    /// Top-level property name of the feature
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Fields the feature sub-schema must declare
    #[serde(default)]
    pub required_fields: Vec<String>,
    /// Expected JSON types of fields, checked when present
    #[serde(default)]
    pub required_structure: BTreeMap<String, String>,
    /// Module-specific property name patterns (`{module}`, `*`)
    #[serde(default)]
    pub specialization_fields: Vec<String>,
    #[serde(default)]
    pub validation_rules: Vec<EnterpriseValidationRule>,
}

/// A rule evaluated against a present feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule_type", rename_all = "snake_case")]
pub enum EnterpriseValidationRule {
    /// Field must have the expected type and declare bounds inside the range
    FieldType {
        field: String,
        expected_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        minimum: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        maximum: Option<f64>,
        severity: Severity,
        message: String,
    },
    /// Field must be declared
    RequiredField {
        field: String,
        severity: Severity,
        message: String,
    },
    /// Named check function applied to the field schema
    Custom {
        function: String,
        field: String,
        severity: Severity,
        message: String,
    },
}

impl EnterpriseValidationRule {
    pub fn field(&self) -> &str {
        match self {
            Self::FieldType { field, .. }
            | Self::RequiredField { field, .. }
            | Self::Custom { field, .. } => field,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::FieldType { severity, .. }
            | Self::RequiredField { severity, .. }
            | Self::Custom { severity, .. } => *severity,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::FieldType { message, .. }
            | Self::RequiredField { message, .. }
            | Self::Custom { message, .. } => message,
        }
    }
}

/// The full set of feature definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnterpriseCatalog {
    pub features: Vec<EnterpriseFeatureDefinition>,
}

impl Default for EnterpriseCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EnterpriseCatalog {
    /// Parse a catalog document
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a catalog document from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&EnterpriseFeatureDefinition> {
        self.features.iter().find(|f| f.name == name)
    }

    /// The six built-in features
    pub fn builtin() -> Self {
        Self {
            features: vec![
                feature(
                    "audit_trail",
                    "Audit logging of module operations",
                    &["enabled", "retention_days"],
                    &[("enabled", "boolean"), ("retention_days", "integer"), ("audit_events", "array")],
                    &["{module}_operation"],
                    vec![EnterpriseValidationRule::FieldType {
                        field: "retention_days".to_string(),
                        expected_type: "integer".to_string(),
                        minimum: Some(1.0),
                        maximum: Some(2555.0),
                        severity: Severity::Error,
                        message: "retention_days must be an integer between 1 and 2555".to_string(),
                    }],
                ),
                feature(
                    "performance_metrics",
                    "Latency and throughput metrics collection",
                    &["enabled", "collection_interval_seconds"],
                    &[
                        ("enabled", "boolean"),
                        ("collection_interval_seconds", "integer"),
                        ("metrics", "object"),
                    ],
                    &["{module}_*_latency_ms"],
                    vec![EnterpriseValidationRule::FieldType {
                        field: "collection_interval_seconds".to_string(),
                        expected_type: "integer".to_string(),
                        minimum: Some(10.0),
                        maximum: Some(3600.0),
                        severity: Severity::Error,
                        message: "collection_interval_seconds must be an integer between 10 and 3600"
                            .to_string(),
                    }],
                ),
                feature(
                    "monitoring_integration",
                    "Export to external monitoring providers",
                    &["enabled", "supported_providers"],
                    &[("enabled", "boolean"), ("supported_providers", "array")],
                    &["{module}_metrics"],
                    vec![EnterpriseValidationRule::Custom {
                        function: "non_empty_enum".to_string(),
                        field: "supported_providers".to_string(),
                        severity: Severity::Warning,
                        message: "supported_providers should enumerate the allowed providers".to_string(),
                    }],
                ),
                feature(
                    "version_history",
                    "Versioned snapshots of module state",
                    &["enabled", "max_versions"],
                    &[("enabled", "boolean"), ("max_versions", "integer"), ("versions", "array")],
                    &["{module}_snapshot"],
                    vec![EnterpriseValidationRule::FieldType {
                        field: "max_versions".to_string(),
                        expected_type: "integer".to_string(),
                        minimum: Some(1.0),
                        maximum: Some(1000.0),
                        severity: Severity::Warning,
                        message: "max_versions should be an integer between 1 and 1000".to_string(),
                    }],
                ),
                feature(
                    "search_metadata",
                    "Search indexing metadata",
                    &["enabled", "indexed_fields"],
                    &[("enabled", "boolean"), ("indexed_fields", "array")],
                    &["{module}_*_index"],
                    vec![
                        EnterpriseValidationRule::RequiredField {
                            field: "search_strategy".to_string(),
                            severity: Severity::Warning,
                            message: "search_metadata should declare a search_strategy".to_string(),
                        },
                        EnterpriseValidationRule::Custom {
                            function: "non_empty_enum".to_string(),
                            field: "indexed_fields".to_string(),
                            severity: Severity::Warning,
                            message: "indexed_fields should enumerate the indexable fields".to_string(),
                        },
                    ],
                ),
                feature(
                    "event_integration",
                    "Event bus publishing and subscription",
                    &["enabled", "event_bus_connection"],
                    &[
                        ("enabled", "boolean"),
                        ("event_bus_connection", "object"),
                        ("published_events", "array"),
                        ("subscribed_events", "array"),
                    ],
                    &["{module}_events"],
                    vec![EnterpriseValidationRule::RequiredField {
                        field: "published_events".to_string(),
                        severity: Severity::Warning,
                        message: "event_integration should declare published_events".to_string(),
                    }],
                ),
            ],
        }
    }
}

fn feature(
    name: &str,
    description: &str,
    required_fields: &[&str],
    structure: &[(&str, &str)],
    specialization: &[&str],
    validation_rules: Vec<EnterpriseValidationRule>,
) -> EnterpriseFeatureDefinition {
    EnterpriseFeatureDefinition {
        name: name.to_string(),
        description: description.to_string(),
        required_fields: required_fields.iter().map(|s| s.to_string()).collect(),
        required_structure: structure
            .iter()
            .map(|(f, t)| (f.to_string(), t.to_string()))
            .collect(),
        specialization_fields: specialization.iter().map(|s| s.to_string()).collect(),
        validation_rules,
    }
}
