use serde::Serialize;

use super::{ComplianceStats, ValidationReport, ValidationSummary};
use crate::diagnostic::{ValidationResult, VALIDATOR_VERSION};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportMetadata<'a> {
    title: &'a str,
    generated_at: String,
    validator_version: &'a str,
    format: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    report_metadata: ReportMetadata<'a>,
    summary: &'a ValidationSummary,
    enterprise_compliance: &'a ComplianceStats,
    naming_compliance: &'a ComplianceStats,
    results: &'a [ValidationResult],
    recommendations: &'a [String],
}

pub(crate) fn render(report: &ValidationReport) -> String {
    let document = JsonReport {
        report_metadata: ReportMetadata {
            title: &report.title,
            generated_at: report.generated_label(),
            validator_version: VALIDATOR_VERSION,
            format: "json",
        },
        summary: &report.summary,
        enterprise_compliance: &report.enterprise_compliance,
        naming_compliance: &report.naming_compliance,
        results: &report.results,
        recommendations: &report.recommendations,
    };

    serde_json::to_string_pretty(&document).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("failed to render report: {}", e) }).to_string()
    })
}

#[cfg(test)]
mod tests {
    use crate::report::tests::sample;
    use crate::report::ReportGenerator;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn test_json_report_shape() {
        let json = ReportGenerator::default().generate_json_report(&sample());
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["reportMetadata"]["format"], "json");
        assert_eq!(value["summary"]["totalSchemas"], 3);
        assert_eq!(value["summary"]["totalErrors"], 2);
        assert_eq!(value["summary"]["criticalErrors"], 1);
        assert_eq!(value["results"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["results"][1]["errors"][0]["code"], "MISSING_ENTERPRISE_FEATURE");
        assert_eq!(value["results"][1]["errors"][0]["type"], "enterprise");
        assert_eq!(value["results"][1]["isValid"], false);
        assert!(value["results"][1]["metadata"]["rulesApplied"].is_array());
        assert!(value["results"][1]["errors"][0]["location"]["jsonPath"].is_string());
        assert_eq!(value["namingCompliance"]["compliantSchemas"], 2);
    }

    #[test]
    fn test_json_empty() {
        let json = ReportGenerator::default().generate_json_report(&[]);
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["totalSchemas"], 0);
        assert_eq!(value["reportMetadata"]["generatedAt"], "n/a");
        assert_eq!(value["enterpriseCompliance"]["complianceRate"], 100.0);
    }
}
