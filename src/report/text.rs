use super::{ComplianceStats, ValidationReport};
use crate::diagnostic::Diagnostic;

const RULE: &str = "----------------------------------------";
const BANNER: &str =
    "================================================================================";

pub(crate) fn render(report: &ValidationReport) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    out.push_str(&format!("{}\n", BANNER));
    out.push_str(&format!("{}\n", report.title.to_uppercase()));
    out.push_str(&format!("{}\n", BANNER));
    out.push_str(&format!("Generated: {}\n", report.generated_label()));
    out.push_str("\n");

    section(&mut out, "SUMMARY");
    out.push_str(&format!("Total Schemas: {}\n", summary.total_schemas));
    out.push_str(&format!("Valid Schemas: {}\n", summary.valid_schemas));
    out.push_str(&format!("Invalid Schemas: {}\n", summary.invalid_schemas));
    out.push_str(&format!("Total Errors: {}\n", summary.total_errors));
    out.push_str(&format!("Total Warnings: {}\n", summary.total_warnings));
    out.push_str(&format!("Critical Errors: {}\n", summary.critical_errors));
    out.push_str(&format!("Execution Time: {}ms\n", summary.execution_time_ms));
    out.push_str("\n");

    section(&mut out, "ENTERPRISE FEATURES COMPLIANCE");
    compliance(&mut out, &report.enterprise_compliance);
    section(&mut out, "NAMING CONVENTION COMPLIANCE");
    compliance(&mut out, &report.naming_compliance);

    section(&mut out, "DETAILED RESULTS");
    if report.results.is_empty() {
        out.push_str("No schemas were validated.\n");
    }
    for result in &report.results {
        let status = if result.is_valid { "✓ VALID" } else { "✗ INVALID" };
        out.push_str(&format!("{} {}\n", status, result.schema_name()));
        out.push_str(&format!(
            "  Errors: {}, Warnings: {}\n",
            result.errors.len(),
            result.warnings.len()
        ));
        for diagnostic in result.diagnostics() {
            item(&mut out, diagnostic);
        }
        out.push_str("\n");
    }

    section(&mut out, "RECOMMENDATIONS");
    for (i, recommendation) in report.recommendations.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, recommendation));
    }

    out
}

fn section(out: &mut String, heading: &str) {
    out.push_str(&format!("{}\n", heading));
    out.push_str(&format!("{}\n", RULE));
}

fn compliance(out: &mut String, stats: &ComplianceStats) {
    out.push_str(&format!(
        "Compliant Schemas: {}/{} ({:.1}%)\n",
        stats.compliant_schemas,
        stats.total_schemas,
        stats.compliance_rate
    ));
    out.push_str("\n");
}

fn item(out: &mut String, diagnostic: &Diagnostic) {
    out.push_str(&format!(
        "  [{}] {} at {}: {}\n",
        diagnostic.severity.as_str().to_uppercase(),
        diagnostic.code,
        diagnostic.location.display_path(),
        diagnostic.message
    ));
    if !diagnostic.details.is_empty() {
        out.push_str(&format!("    Details: {}\n", diagnostic.details));
    }
    for suggestion in &diagnostic.suggestions {
        out.push_str(&format!("    Suggestion: {}\n", suggestion));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample;
    use crate::report::ReportGenerator;

    #[test]
    fn test_sections_present() {
        let text = ReportGenerator::default().generate_text_report(&sample());
        for heading in [
            "SCHEMA VALIDATION REPORT",
            "SUMMARY",
            "ENTERPRISE FEATURES COMPLIANCE",
            "NAMING CONVENTION COMPLIANCE",
            "DETAILED RESULTS",
            "RECOMMENDATIONS",
        ] {
            assert!(text.contains(heading), "missing {}", heading);
        }
        assert!(text.contains("Total Errors: 2"));
        assert!(text.contains("Compliant Schemas: 2/3 (66.7%)"));
        assert!(text.contains("✗ INVALID mplp-plan"));
        assert!(text.contains("[CRITICAL] JSON_SYNTAX_ERROR at properties.x"));
    }

    #[test]
    fn test_empty_report() {
        let text = render(&ValidationReport::build("Empty", &[]));
        assert!(text.contains("Total Schemas: 0"));
        assert!(text.contains("Compliant Schemas: 0/0 (100.0%)"));
        assert!(text.contains("No schemas were validated."));
        assert!(text.contains("Generated: n/a"));
    }
}
