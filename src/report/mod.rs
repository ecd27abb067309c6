//! Validation reports
//!
//! Every format renders the same [`ValidationReport`], so summary numbers and
//! itemized sections always agree. Rendering is deterministic: the report
//! stamp is the latest validation timestamp of the inputs, not the wall clock.

mod html;
mod json;
mod junit;
mod text;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::diagnostic::{DiagnosticType, Severity, ValidationResult};
use crate::error::ComplianceError;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Html,
    Junit,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Html => "html",
            Self::Junit => "junit",
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
            Self::Html => "html",
            Self::Junit => "xml",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = ComplianceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            "junit" | "xml" => Ok(Self::Junit),
            other => Err(ComplianceError::UnknownReportFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_schemas: usize,
    pub valid_schemas: usize,
    pub invalid_schemas: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub critical_errors: usize,
    pub execution_time_ms: u64,
}

/// Schemas free of one diagnostic category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceStats {
    pub compliant_schemas: usize,
    pub total_schemas: usize,
    pub compliance_rate: f64,
}

impl ComplianceStats {
    fn over(results: &[ValidationResult], category: DiagnosticType) -> Self {
        let compliant = results
            .iter()
            .filter(|r| is_compliant(r, category))
            .count();
        let total = results.len();
        Self {
            compliant_schemas: compliant,
            total_schemas: total,
            compliance_rate: if total == 0 {
                100.0
            } else {
                compliant as f64 / total as f64 * 100.0
            },
        }
    }
}

/// Whether a result has no diagnostic of the given category
pub(crate) fn is_compliant(result: &ValidationResult, category: DiagnosticType) -> bool {
    !result.diagnostics().any(|d| d.diagnostic_type == category)
}

/// The shared model behind every format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub title: String,
    /// Latest validation timestamp of the inputs
    pub generated_at: Option<DateTime<Utc>>,
    pub summary: ValidationSummary,
    pub enterprise_compliance: ComplianceStats,
    pub naming_compliance: ComplianceStats,
    pub recommendations: Vec<String>,
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn build(title: &str, results: &[ValidationResult]) -> Self {
        let summary = ValidationSummary {
            total_schemas: results.len(),
            valid_schemas: results.iter().filter(|r| r.is_valid).count(),
            invalid_schemas: results.iter().filter(|r| !r.is_valid).count(),
            total_errors: results.iter().map(|r| r.errors.len()).sum(),
            total_warnings: results.iter().map(|r| r.warnings.len()).sum(),
            critical_errors: results
                .iter()
                .flat_map(|r| r.errors.iter())
                .filter(|e| e.severity == Severity::Critical)
                .count(),
            execution_time_ms: results.iter().map(|r| r.metadata.validation_duration_ms).sum(),
        };
        let enterprise_compliance = ComplianceStats::over(results, DiagnosticType::Enterprise);
        let naming_compliance = ComplianceStats::over(results, DiagnosticType::Naming);
        let recommendations = recommendations(&summary, &enterprise_compliance, &naming_compliance);

        Self {
            title: title.to_string(),
            generated_at: results.iter().map(|r| r.metadata.validation_timestamp).max(),
            summary,
            enterprise_compliance,
            naming_compliance,
            recommendations,
            results: results.to_vec(),
        }
    }

    /// Report stamp for display
    pub(crate) fn generated_label(&self) -> String {
        self.generated_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "n/a".to_string())
    }
}

fn recommendations(
    summary: &ValidationSummary,
    enterprise: &ComplianceStats,
    naming: &ComplianceStats,
) -> Vec<String> {
    let mut out = Vec::new();
    if summary.critical_errors > 0 {
        out.push("Fix critical errors immediately - these prevent schema usage");
    }
    if summary.total_errors > 0 {
        out.push("Address all errors before deploying schemas");
    }
    if summary.total_warnings > 0 {
        out.push("Review warnings to improve schema quality");
    }
    if summary.invalid_schemas > 0 {
        out.push("Focus on fixing invalid schemas first");
    }
    if enterprise.compliant_schemas < enterprise.total_schemas {
        out.push("Complete the missing enterprise features in non-compliant schemas");
    }
    if naming.compliant_schemas < naming.total_schemas {
        out.push("Rename fields that break the snake_case naming convention");
    }
    if out.is_empty() {
        out.push("All schemas passed validation - no action required");
    } else {
        out.push("Run validation again after making changes");
    }
    out.into_iter().map(String::from).collect()
}

/// Renders validation results in every supported format
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    title: String,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new("Schema Validation Report")
    }
}

impl ReportGenerator {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }

    pub fn build_report(&self, results: &[ValidationResult]) -> ValidationReport {
        ValidationReport::build(&self.title, results)
    }

    pub fn generate(&self, format: ReportFormat, results: &[ValidationResult]) -> String {
        match format {
            ReportFormat::Text => self.generate_text_report(results),
            ReportFormat::Json => self.generate_json_report(results),
            ReportFormat::Html => self.generate_html_report(results),
            ReportFormat::Junit => self.generate_junit_report(results),
        }
    }

    pub fn generate_text_report(&self, results: &[ValidationResult]) -> String {
        text::render(&self.build_report(results))
    }

    pub fn generate_json_report(&self, results: &[ValidationResult]) -> String {
        json::render(&self.build_report(results))
    }

    pub fn generate_html_report(&self, results: &[ValidationResult]) -> String {
        html::render(&self.build_report(results))
    }

    pub fn generate_junit_report(&self, results: &[ValidationResult]) -> String {
        junit::render(&self.build_report(results))
    }
}

/// Escape text for HTML and XML content, dropping control characters XML forbids
pub(crate) fn escape(input: &str) -> String {
    let printable: String = input
        .chars()
        .filter(|c| (*c as u32) >= 0x20 || matches!(c, '\t' | '\n' | '\r'))
        .collect();
    quick_xml::escape::escape(printable.as_str()).into_owned()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::diagnostic::{Diagnostic, DiagnosticCode, ErrorLocation, Findings};

    /// Result with the given (code, type, severity) diagnostics
    pub(crate) fn result_with(
        name: &str,
        diagnostics: &[(DiagnosticCode, DiagnosticType, Severity)],
    ) -> ValidationResult {
        let mut findings = Findings::new();
        findings.rule("test");
        for (code, ty, severity) in diagnostics {
            findings.push(Diagnostic::new(
                *code,
                *ty,
                *severity,
                format!("{} <found> & flagged", code),
                ErrorLocation::new(name, "properties.x", "test"),
                "Fix \"it\"",
            ));
        }
        findings.into_result(Some(name), 1)
    }

    pub(crate) fn sample() -> Vec<ValidationResult> {
        vec![
            result_with("mplp-context", &[]),
            result_with(
                "mplp-plan",
                &[
                    (DiagnosticCode::MissingEnterpriseFeature, DiagnosticType::Enterprise, Severity::Error),
                    (DiagnosticCode::JsonSyntaxError, DiagnosticType::Syntax, Severity::Critical),
                    (DiagnosticCode::BestPracticeWarning, DiagnosticType::BestPractice, Severity::Info),
                ],
            ),
            result_with(
                "mplp-trace",
                &[(DiagnosticCode::NamingConventionViolation, DiagnosticType::Naming, Severity::Warning)],
            ),
        ]
    }

    #[test]
    fn test_summary() {
        let report = ReportGenerator::default().build_report(&sample());
        assert_eq!(report.summary.total_schemas, 3);
        assert_eq!(report.summary.valid_schemas, 2);
        assert_eq!(report.summary.invalid_schemas, 1);
        assert_eq!(report.summary.total_errors, 2);
        assert_eq!(report.summary.total_warnings, 2);
        assert_eq!(report.summary.critical_errors, 1);
    }

    #[test]
    fn test_compliance_rates() {
        let report = ReportGenerator::default().build_report(&sample());
        assert_eq!(report.enterprise_compliance.compliant_schemas, 2);
        assert_eq!(report.naming_compliance.compliant_schemas, 2);
        assert!((report.enterprise_compliance.compliance_rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_empty_input() {
        let report = ReportGenerator::default().build_report(&[]);
        assert_eq!(report.summary, ValidationSummary::default());
        assert_eq!(report.enterprise_compliance.compliance_rate, 100.0);
        assert_eq!(report.naming_compliance.compliance_rate, 100.0);
        assert_eq!(report.generated_at, None);
        assert_eq!(
            report.recommendations,
            vec!["All schemas passed validation - no action required"]
        );
    }

    #[test]
    fn test_recommendations_order() {
        let report = ReportGenerator::default().build_report(&sample());
        assert_eq!(
            report.recommendations.first().map(String::as_str),
            Some("Fix critical errors immediately - these prevent schema usage")
        );
        assert_eq!(
            report.recommendations.last().map(String::as_str),
            Some("Run validation again after making changes")
        );
    }

    #[test]
    fn test_deterministic_output() {
        let results = sample();
        let generator = ReportGenerator::default();
        for format in [ReportFormat::Text, ReportFormat::Json, ReportFormat::Html, ReportFormat::Junit] {
            assert_eq!(generator.generate(format, &results), generator.generate(format, &results));
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("xml".parse::<ReportFormat>().unwrap(), ReportFormat::Junit);
        assert!(matches!(
            "pdf".parse::<ReportFormat>(),
            Err(ComplianceError::UnknownReportFormat(_))
        ));
    }
}
