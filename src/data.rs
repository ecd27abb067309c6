//! Instance data validation
//!
//! Validates arbitrary JSON values against a named schema. Compiled
//! validators are cached per schema name and recompiled when the document
//! digest changes.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use jsonschema::{Draft, JSONSchema};
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::diagnostic::panic_message;
use crate::error::{ComplianceError, Result};
use crate::schema::SchemaDocument;
use crate::store::SchemaStore;

pub const CONSTRAINT_SCHEMA_LOAD: &str = "schema-load";
pub const CONSTRAINT_BATCH_EXECUTION: &str = "batch-execution";
pub const CUSTOM_CONSTRAINT_PREFIX: &str = "custom-";

/// A named predicate over the whole data value
pub type CustomValidator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Per-request options
#[derive(Clone, Default)]
pub struct DataValidationOptions {
    /// Run the best-practice heuristics (warnings only)
    pub strict_mode: bool,
    /// Predicates run after schema validation, in name order
    pub custom_validators: BTreeMap<String, CustomValidator>,
}

impl fmt::Debug for DataValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataValidationOptions")
            .field("strict_mode", &self.strict_mode)
            .field("custom_validators", &self.custom_validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct DataValidationRequest {
    pub schema_name: String,
    pub data: Value,
    pub options: DataValidationOptions,
}

impl DataValidationRequest {
    pub fn new(schema_name: impl Into<String>, data: Value) -> Self {
        Self {
            schema_name: schema_name.into(),
            data,
            options: DataValidationOptions::default(),
        }
    }

    pub fn strict(mut self) -> Self {
        self.options.strict_mode = true;
        self
    }

    /// Add a named custom validator
    pub fn with_validator<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.options.custom_validators.insert(name.into(), Arc::new(predicate));
        self
    }
}

/// One violation found in the data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValidationError {
    /// Dotted path inside the data (`root` for the value itself)
    pub error_path: String,
    pub error_message: String,
    pub expected_type: String,
    pub actual_type: String,
    pub value: Value,
    /// Failing schema keyword, `custom-<name>`, `schema-load` or `batch-execution`
    pub constraint: String,
}

/// Advisory finding from strict mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValidationWarning {
    pub warning_path: String,
    pub warning_message: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValidationMetadata {
    pub schema_name: String,
    pub validation_timestamp: DateTime<Utc>,
    pub validation_duration_ms: u64,
    pub strict_mode: bool,
    pub rules_applied: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValidationResult {
    /// No errors; warnings never count
    pub is_valid: bool,
    pub errors: Vec<DataValidationError>,
    pub warnings: Vec<DataValidationWarning>,
    pub metadata: DataValidationMetadata,
}

impl DataValidationResult {
    /// Result carrying a single infrastructure error
    fn failure(request: &DataValidationRequest, message: String, constraint: &str) -> Self {
        Self {
            is_valid: false,
            errors: vec![DataValidationError {
                error_path: "root".to_string(),
                error_message: message,
                expected_type: "unknown".to_string(),
                actual_type: json_type(&request.data).to_string(),
                value: Value::Null,
                constraint: constraint.to_string(),
            }],
            warnings: Vec::new(),
            metadata: DataValidationMetadata {
                schema_name: request.schema_name.clone(),
                validation_timestamp: Utc::now(),
                validation_duration_ms: 0,
                strict_mode: request.options.strict_mode,
                rules_applied: vec![constraint.to_string()],
            },
        }
    }
}

/// Validates data against named schemas
pub struct DataValidator {
    store: Arc<SchemaStore>,
    /// Compiled validators by schema name, with the digest they were built from
    compiled: DashMap<String, (String, Arc<JSONSchema>)>,
    /// Strict mode applied to every request
    default_strict: bool,
    camel_case: Regex,
}

impl DataValidator {
    pub fn new(store: Arc<SchemaStore>, default_strict: bool) -> Self {
        Self {
            store,
            compiled: DashMap::new(),
            default_strict,
            camel_case: Regex::new(r"^[a-z][a-z0-9]*[A-Z][A-Za-z0-9]*$").unwrap(),
        }
    }

    /// Validate one value
    pub fn validate_data(&self, request: &DataValidationRequest) -> DataValidationResult {
        let started = Instant::now();
        let strict = request.options.strict_mode || self.default_strict;

        let (doc, compiled) = match self.compiled_schema(&request.schema_name) {
            Ok(found) => found,
            Err(e) => {
                warn!(schema = %request.schema_name, error = %e, "data validation could not load schema");
                return DataValidationResult::failure(
                    request,
                    format!("Cannot load schema '{}': {}", request.schema_name, e),
                    CONSTRAINT_SCHEMA_LOAD,
                );
            }
        };

        let mut rules_applied = vec!["schema-validation".to_string()];
        let mut errors = Vec::new();
        if let Err(violations) = compiled.validate(&request.data) {
            for violation in violations {
                let schema_path = violation.schema_path.to_string();
                let constraint = schema_path
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("schema")
                    .to_string();
                errors.push(DataValidationError {
                    error_path: pointer_to_path(&violation.instance_path.to_string()),
                    error_message: violation.to_string(),
                    expected_type: expected_type(&doc.content, &schema_path, &constraint),
                    actual_type: json_type(&violation.instance).to_string(),
                    value: violation.instance.clone().into_owned(),
                    constraint,
                });
            }
        }

        if !request.options.custom_validators.is_empty() {
            rules_applied.push("custom-validators".to_string());
        }
        for (name, predicate) in &request.options.custom_validators {
            let outcome = catch_unwind(AssertUnwindSafe(|| (predicate.as_ref())(&request.data)));
            let message = match outcome {
                Ok(true) => continue,
                Ok(false) => format!("Custom validator '{}' failed", name),
                Err(payload) => {
                    warn!(validator = %name, "custom validator panicked");
                    format!("Custom validator '{}' raised an error: {}", name, panic_message(&*payload))
                }
            };
            errors.push(DataValidationError {
                error_path: "root".to_string(),
                error_message: message,
                expected_type: "valid".to_string(),
                actual_type: json_type(&request.data).to_string(),
                value: request.data.clone(),
                constraint: format!("{}{}", CUSTOM_CONSTRAINT_PREFIX, name),
            });
        }

        let mut warnings = Vec::new();
        if strict {
            rules_applied.push("strict-mode".to_string());
            self.strict_checks(&request.data, &mut warnings);
        }

        DataValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            metadata: DataValidationMetadata {
                schema_name: request.schema_name.clone(),
                validation_timestamp: Utc::now(),
                validation_duration_ms: started.elapsed().as_millis() as u64,
                strict_mode: strict,
                rules_applied,
            },
        }
    }

    /// Validate many values in parallel, preserving order
    pub fn validate_batch(&self, requests: &[DataValidationRequest]) -> Vec<DataValidationResult> {
        let results: Vec<DataValidationResult> = requests
            .par_iter()
            .map(|request| contain_panic(request, || self.validate_data(request)))
            .collect();
        info!(
            requests = results.len(),
            invalid = results.iter().filter(|r| !r.is_valid).count(),
            "data batch validated"
        );
        results
    }

    /// Number of cached compiled validators
    pub fn cached_validators(&self) -> usize {
        self.compiled.len()
    }

    /// Drop compiled validators and cached documents
    pub fn clear_cache(&self) {
        self.compiled.clear();
        self.store.clear();
    }

    fn compiled_schema(&self, name: &str) -> Result<(Arc<SchemaDocument>, Arc<JSONSchema>)> {
        let resolved = self.store.resolve(name).unwrap_or_else(|| name.to_string());
        let doc = self.store.load(&resolved)?;

        if let Some(entry) = self.compiled.get(&resolved) {
            if entry.0 == doc.digest {
                debug!(schema = %resolved, "compiled validator cache hit");
                return Ok((doc, Arc::clone(&entry.1)));
            }
        }

        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&doc.content)
            .map_err(|e| ComplianceError::Compile {
                name: resolved.clone(),
                reason: e.to_string(),
            })?;
        let compiled = Arc::new(compiled);
        self.compiled
            .insert(resolved, (doc.digest.clone(), Arc::clone(&compiled)));
        Ok((doc, compiled))
    }

    fn strict_checks(&self, data: &Value, warnings: &mut Vec<DataValidationWarning>) {
        if let Some(obj) = data.as_object() {
            let has_id = obj.keys().any(|k| k == "id" || k.ends_with("_id"));
            if !has_id {
                warnings.push(DataValidationWarning {
                    warning_path: "root".to_string(),
                    warning_message: "No identifier field found".to_string(),
                    suggestion: "Add an 'id' or '<entity>_id' field".to_string(),
                });
            }
            let has_timestamp = obj
                .keys()
                .any(|k| k == "timestamp" || k == "created_at" || k.ends_with("_at"));
            if !has_timestamp {
                warnings.push(DataValidationWarning {
                    warning_path: "root".to_string(),
                    warning_message: "No timestamp field found".to_string(),
                    suggestion: "Add a 'timestamp' or 'created_at' field".to_string(),
                });
            }
        }
        self.camel_case_keys(data, "", warnings);
    }

    fn camel_case_keys(&self, value: &Value, path: &str, warnings: &mut Vec<DataValidationWarning>) {
        match value {
            Value::Object(obj) => {
                for (key, sub) in obj {
                    let child = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    if self.camel_case.is_match(key) {
                        warnings.push(DataValidationWarning {
                            warning_path: child.clone(),
                            warning_message: format!("Field '{}' uses camelCase", key),
                            suggestion: format!("Use '{}'", crate::naming::to_snake_case(key)),
                        });
                    }
                    self.camel_case_keys(sub, &child, warnings);
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.camel_case_keys(item, &format!("{}[{}]", path, i), warnings);
                }
            }
            _ => {}
        }
    }
}

/// Run one batch member, turning a panic into a failed result
fn contain_panic<F>(request: &DataValidationRequest, run: F) -> DataValidationResult
where
    F: FnOnce() -> DataValidationResult,
{
    catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
        warn!(schema = %request.schema_name, "batch member panicked");
        DataValidationResult::failure(
            request,
            format!("Validation failed: {}", panic_message(&*payload)),
            CONSTRAINT_BATCH_EXECUTION,
        )
    })
}

/// JSON type name of a value
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Expected type for a failing keyword, read back from the schema
fn expected_type(schema: &Value, schema_path: &str, constraint: &str) -> String {
    let render = |t: &Value| match t {
        Value::String(s) => Some(s.clone()),
        Value::Array(types) => Some(
            types
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("|"),
        ),
        _ => None,
    };

    if constraint == "type" {
        if let Some(found) = resolve_schema_path(schema, schema_path).and_then(render) {
            return found;
        }
    }
    let parent = schema_path.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
    resolve_schema_path(schema, parent)
        .map(|node| follow_ref(schema, node))
        .and_then(|node| node.get("type"))
        .and_then(render)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Walk a keyword path through `schema`, following `$ref` segments
fn resolve_schema_path<'a>(schema: &'a Value, pointer: &str) -> Option<&'a Value> {
    let mut node = schema;
    for segment in pointer.split('/').filter(|s| !s.is_empty()) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        node = if segment == "$ref" {
            let reference = node.get("$ref")?.as_str()?;
            schema.pointer(reference.strip_prefix('#')?)?
        } else {
            match node {
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => node.get(segment.as_str())?,
            }
        };
    }
    Some(node)
}

/// Local `$ref` target of `node`, or `node` itself
fn follow_ref<'a>(schema: &'a Value, node: &'a Value) -> &'a Value {
    node.get("$ref")
        .and_then(Value::as_str)
        .and_then(|r| r.strip_prefix('#'))
        .and_then(|p| schema.pointer(p))
        .unwrap_or(node)
}

/// `/a/0/b` -> `a.0.b`, empty -> `root`
fn pointer_to_path(pointer: &str) -> String {
    let path = pointer
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".");
    if path.is_empty() {
        "root".to_string()
    } else {
        path
    }
}
