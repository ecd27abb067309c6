//! JUnit XML rendering
//!
//! One `<testsuite>` per schema. Each error becomes a failing test case and
//! each warning a skipped one, so the suite-level `failures` and `skipped`
//! counts equal the summary's error and warning totals.

use super::{escape, is_compliant, ValidationReport};
use crate::diagnostic::{Diagnostic, DiagnosticType, ValidationResult};

fn seconds(ms: u64) -> String {
    format!("{:.3}", ms as f64 / 1000.0)
}

/// Test cases in a suite: one per diagnostic, or a single passing case
fn case_count(result: &ValidationResult) -> usize {
    (result.errors.len() + result.warnings.len()).max(1)
}

pub(crate) fn render(report: &ValidationReport) -> String {
    let summary = &report.summary;
    let total_tests: usize = report.results.iter().map(case_count).sum();
    let mut output = String::new();

    output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    output.push_str(&format!(
        "<testsuites name=\"{}\" tests=\"{}\" failures=\"{}\" skipped=\"{}\" errors=\"0\" time=\"{}\">\n",
        escape(&report.title),
        total_tests,
        summary.total_errors,
        summary.total_warnings,
        seconds(summary.execution_time_ms)
    ));
    for result in &report.results {
        suite(&mut output, result);
    }
    output.push_str("</testsuites>\n");
    output
}

fn suite(output: &mut String, result: &ValidationResult) {
    let name = escape(result.schema_name());
    let classname = format!("schema.{}", name);

    output.push_str(&format!(
        "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" skipped=\"{}\" errors=\"0\" time=\"{}\" timestamp=\"{}\">\n",
        name,
        case_count(result),
        result.errors.len(),
        result.warnings.len(),
        seconds(result.metadata.validation_duration_ms),
        result.metadata.validation_timestamp.to_rfc3339()
    ));

    output.push_str("    <properties>\n");
    for (key, value) in [
        ("validator_version", result.metadata.validator_version.clone()),
        (
            "enterprise_compliant",
            is_compliant(result, DiagnosticType::Enterprise).to_string(),
        ),
        (
            "naming_compliant",
            is_compliant(result, DiagnosticType::Naming).to_string(),
        ),
        ("rules_applied", result.metadata.rules_applied.join(",")),
    ] {
        output.push_str(&format!(
            "      <property name=\"{}\" value=\"{}\"/>\n",
            key,
            escape(&value)
        ));
    }
    output.push_str("    </properties>\n");

    for error in &result.errors {
        output.push_str(&format!(
            "    <testcase name=\"{}\" classname=\"{}\">\n",
            case_name(error),
            classname
        ));
        output.push_str(&format!(
            "      <failure message=\"{}\" type=\"{}\">{}</failure>\n",
            escape(&error.message),
            error.code,
            escape(&failure_body(error))
        ));
        output.push_str("    </testcase>\n");
    }
    for warning in &result.warnings {
        output.push_str(&format!(
            "    <testcase name=\"{}\" classname=\"{}\">\n",
            case_name(warning),
            classname
        ));
        output.push_str(&format!(
            "      <skipped message=\"{}\"/>\n",
            escape(&warning.message)
        ));
        output.push_str("    </testcase>\n");
    }
    if result.errors.is_empty() && result.warnings.is_empty() {
        output.push_str(&format!(
            "    <testcase name=\"schema-validation\" classname=\"{}\"/>\n",
            classname
        ));
    }

    output.push_str("  </testsuite>\n");
}

fn case_name(diagnostic: &Diagnostic) -> String {
    escape(&format!(
        "{} at {}",
        diagnostic.code,
        diagnostic.location.display_path()
    ))
}

fn failure_body(diagnostic: &Diagnostic) -> String {
    let mut body = format!(
        "[{}] {}",
        diagnostic.severity.as_str().to_uppercase(),
        diagnostic.message
    );
    if !diagnostic.details.is_empty() {
        body.push_str(&format!("\nDetails: {}", diagnostic.details));
    }
    for suggestion in &diagnostic.suggestions {
        body.push_str(&format!("\nSuggestion: {}", suggestion));
    }
    body
}
