//! Diagnostics and validation results
//!
//! Diagnostic codes are part of the public output format. Never rename or
//! remove a code; add new ones instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version stamped into every [`ValidationMetadata`]
pub const VALIDATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Stable diagnostic code registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Access and parsing
    FileAccessError,
    DirectoryAccessError,
    JsonSyntaxError,
    UnexpectedError,

    // Structure and semantics
    SchemaStructureError,
    #[serde(rename = "DRAFT07_COMPLIANCE_ERROR")]
    Draft07ComplianceError,
    OrgRuleError,
    BestPracticeWarning,

    // Naming
    NamingConventionWarning,
    NamingConventionViolation,
    NamingValidationError,

    // Enterprise features
    MissingEnterpriseFeature,
    IncompleteEnterpriseFeature,
    MissingSpecialization,
    EnterpriseValidationError,

    // Compatibility
    SchemaLoadError,
    VersionMismatch,
    MissingDefinition,
    TypeMismatch,
    ConstraintViolation,
    MatrixParseError,
    MatrixValidationError,
    SchemaNotFound,
    InvalidVersionFormat,
}

impl DiagnosticCode {
    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileAccessError => "FILE_ACCESS_ERROR",
            Self::DirectoryAccessError => "DIRECTORY_ACCESS_ERROR",
            Self::JsonSyntaxError => "JSON_SYNTAX_ERROR",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
            Self::SchemaStructureError => "SCHEMA_STRUCTURE_ERROR",
            Self::Draft07ComplianceError => "DRAFT07_COMPLIANCE_ERROR",
            Self::OrgRuleError => "ORG_RULE_ERROR",
            Self::BestPracticeWarning => "BEST_PRACTICE_WARNING",
            Self::NamingConventionWarning => "NAMING_CONVENTION_WARNING",
            Self::NamingConventionViolation => "NAMING_CONVENTION_VIOLATION",
            Self::NamingValidationError => "NAMING_VALIDATION_ERROR",
            Self::MissingEnterpriseFeature => "MISSING_ENTERPRISE_FEATURE",
            Self::IncompleteEnterpriseFeature => "INCOMPLETE_ENTERPRISE_FEATURE",
            Self::MissingSpecialization => "MISSING_SPECIALIZATION",
            Self::EnterpriseValidationError => "ENTERPRISE_VALIDATION_ERROR",
            Self::SchemaLoadError => "SCHEMA_LOAD_ERROR",
            Self::VersionMismatch => "VERSION_MISMATCH",
            Self::MissingDefinition => "MISSING_DEFINITION",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::ConstraintViolation => "CONSTRAINT_VIOLATION",
            Self::MatrixParseError => "MATRIX_PARSE_ERROR",
            Self::MatrixValidationError => "MATRIX_VALIDATION_ERROR",
            Self::SchemaNotFound => "SCHEMA_NOT_FOUND",
            Self::InvalidVersionFormat => "INVALID_VERSION_FORMAT",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticType {
    Syntax,
    Semantic,
    Compatibility,
    Enterprise,
    Naming,
    Style,
    Reference,
    BestPractice,
    Specialization,
    Deprecation,
}

impl DiagnosticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Semantic => "semantic",
            Self::Compatibility => "compatibility",
            Self::Enterprise => "enterprise",
            Self::Naming => "naming",
            Self::Style => "style",
            Self::Reference => "reference",
            Self::BestPractice => "best_practice",
            Self::Specialization => "specialization",
            Self::Deprecation => "deprecation",
        }
    }

    /// Remediation used when a caller supplies an empty suggestion
    fn default_suggestion(&self) -> &'static str {
        match self {
            Self::Syntax => "Check the file exists and contains well-formed JSON",
            Self::Semantic => "Follow the standard schema template",
            Self::Compatibility | Self::Deprecation => {
                "Review schema changes for breaking modifications"
            }
            Self::Enterprise | Self::Specialization => {
                "Add the missing enterprise feature fields to the schema"
            }
            Self::Naming | Self::Style => "Use snake_case for schema field names",
            Self::Reference => "Check referenced schema files exist",
            Self::BestPractice => "Follow schema documentation best practices",
        }
    }
}

impl std::fmt::Display for DiagnosticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Whether diagnostics of this severity make a result invalid
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Critical | Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a diagnostic was raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorLocation {
    /// Schema name, file path, or `source -> target` pair
    pub schema_file: String,
    /// Dotted path inside the schema (empty for the document root)
    pub json_path: String,
    /// Which check produced the diagnostic
    pub context: String,
}

impl ErrorLocation {
    pub fn new(
        schema_file: impl Into<String>,
        json_path: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let schema_file = schema_file.into();
        Self {
            schema_file: if schema_file.is_empty() {
                "<unknown>".to_string()
            } else {
                schema_file
            },
            json_path: json_path.into(),
            context: context.into(),
        }
    }

    /// Path for display, `root` when empty
    pub fn display_path(&self) -> &str {
        if self.json_path.is_empty() {
            "root"
        } else {
            &self.json_path
        }
    }
}

/// A single validation finding (error or warning)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub id: String,
    pub code: DiagnosticCode,
    #[serde(rename = "type")]
    pub diagnostic_type: DiagnosticType,
    pub message: String,
    pub details: String,
    pub location: ErrorLocation,
    pub severity: Severity,
    pub suggestions: Vec<String>,
}

/// Diagnostics reported as errors
pub type ValidationError = Diagnostic;
/// Diagnostics reported as warnings
pub type ValidationWarning = Diagnostic;

impl Diagnostic {
    /// Create a diagnostic. A first suggestion is mandatory.
    pub fn new(
        code: DiagnosticCode,
        diagnostic_type: DiagnosticType,
        severity: Severity,
        message: impl Into<String>,
        location: ErrorLocation,
        suggestion: impl Into<String>,
    ) -> Self {
        let suggestion = suggestion.into();
        let suggestion = if suggestion.trim().is_empty() {
            diagnostic_type.default_suggestion().to_string()
        } else {
            suggestion
        };
        Self {
            id: format!("{}-{}", diagnostic_type.as_str(), Uuid::new_v4()),
            code,
            diagnostic_type,
            message: message.into(),
            details: String::new(),
            location,
            severity,
            suggestions: vec![suggestion],
        }
    }

    /// Set the details text
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Append further suggestions (empty entries are dropped)
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions.extend(
            suggestions
                .into_iter()
                .map(Into::into)
                .filter(|s| !s.trim().is_empty()),
        );
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }
}

/// Bookkeeping attached to every result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMetadata {
    pub validator_version: String,
    pub validation_timestamp: DateTime<Utc>,
    pub total_schemas_checked: usize,
    pub validation_duration_ms: u64,
    /// Rule stages that actually ran, in application order
    pub rules_applied: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,
}

/// Outcome of one validation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub metadata: ValidationMetadata,
}

impl ValidationResult {
    /// Name used by reports: metadata first, then the first diagnostic
    pub fn schema_name(&self) -> &str {
        if let Some(name) = &self.metadata.schema_name {
            return name;
        }
        self.errors
            .first()
            .or_else(|| self.warnings.first())
            .map(|d| d.location.schema_file.as_str())
            .unwrap_or("unknown-schema")
    }

    /// Iterate errors then warnings
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn has_diagnostic(&self, code: DiagnosticCode) -> bool {
        self.diagnostics().any(|d| d.code == code)
    }
}

/// Accumulates diagnostics and rule stages for one validation call
#[derive(Debug)]
pub struct Findings {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    rules_applied: Vec<String>,
    started: std::time::Instant,
}

impl Default for Findings {
    fn default() -> Self {
        Self::new()
    }
}

impl Findings {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            rules_applied: Vec::new(),
            started: std::time::Instant::now(),
        }
    }

    /// Route a diagnostic by severity
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_blocking() {
            self.errors.push(diagnostic);
        } else {
            self.warnings.push(diagnostic);
        }
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// Record that a rule stage ran
    pub fn rule(&mut self, rule: &str) {
        self.rules_applied.push(rule.to_string());
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn into_result(self, schema_name: Option<&str>, schemas_checked: usize) -> ValidationResult {
        let duration = self.started.elapsed();
        ValidationResult {
            is_valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            metadata: ValidationMetadata {
                validator_version: VALIDATOR_VERSION.to_string(),
                validation_timestamp: Utc::now(),
                total_schemas_checked: schemas_checked,
                validation_duration_ms: duration.as_millis() as u64,
                rules_applied: self.rules_applied,
                schema_name: schema_name.map(str::to_string),
            },
        }
    }
}

/// Human readable text for a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
