use super::{escape, ComplianceStats, ValidationReport};
use crate::diagnostic::{Diagnostic, ValidationResult};

const STYLE: &str = "\
body { font-family: Helvetica, Arial, sans-serif; margin: 2em; color: #222; }
h1 { border-bottom: 2px solid #404040; padding-bottom: 0.3em; }
.cards { display: flex; flex-wrap: wrap; gap: 1em; }
.card { background: #f4f4f4; border-radius: 6px; padding: 1em; min-width: 9em; }
.card .value { font-size: 1.6em; font-weight: bold; }
.valid { color: #4CAF50; }
.invalid { color: #F44336; }
table { border-collapse: collapse; width: 100%; margin-bottom: 1.5em; }
th, td { border: 1px solid #ddd; padding: 0.4em; text-align: left; vertical-align: top; }
th { background: #404040; color: white; }
.critical, .error { color: #F44336; }
.warning { color: #FF9800; }
.info { color: #2196F3; }
";

pub(crate) fn render(report: &ValidationReport) -> String {
    let summary = &report.summary;
    let mut output = String::new();

    output.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    output.push_str("<meta charset=\"utf-8\">\n");
    output.push_str(&format!("<title>{}</title>\n", escape(&report.title)));
    output.push_str(&format!("<style>\n{}</style>\n", STYLE));
    output.push_str("</head>\n<body>\n");
    output.push_str(&format!("<h1>{}</h1>\n", escape(&report.title)));
    output.push_str(&format!(
        "<p>Generated: {}</p>\n",
        escape(&report.generated_label())
    ));

    output.push_str("<h2>Summary</h2>\n<div class=\"cards\">\n");
    for (label, value) in [
        ("Total Schemas", summary.total_schemas.to_string()),
        ("Valid Schemas", summary.valid_schemas.to_string()),
        ("Invalid Schemas", summary.invalid_schemas.to_string()),
        ("Total Errors", summary.total_errors.to_string()),
        ("Total Warnings", summary.total_warnings.to_string()),
        ("Critical Errors", summary.critical_errors.to_string()),
        ("Execution Time", format!("{}ms", summary.execution_time_ms)),
    ] {
        output.push_str(&format!(
            "<div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>\n",
            label, value
        ));
    }
    output.push_str("</div>\n");

    compliance(&mut output, "Enterprise Features Compliance", &report.enterprise_compliance);
    compliance(&mut output, "Naming Convention Compliance", &report.naming_compliance);

    output.push_str("<h2>Detailed Results</h2>\n");
    if report.results.is_empty() {
        output.push_str("<p>No schemas were validated.</p>\n");
    }
    for result in &report.results {
        schema_section(&mut output, result);
    }

    output.push_str("<h2>Recommendations</h2>\n<ol>\n");
    for recommendation in &report.recommendations {
        output.push_str(&format!("<li>{}</li>\n", escape(recommendation)));
    }
    output.push_str("</ol>\n</body>\n</html>\n");
    output
}

fn compliance(output: &mut String, heading: &str, stats: &ComplianceStats) {
    output.push_str(&format!("<h2>{}</h2>\n", heading));
    output.push_str(&format!(
        "<p>Compliant Schemas: {}/{} ({:.1}%)</p>\n",
        stats.compliant_schemas, stats.total_schemas, stats.compliance_rate
    ));
}

fn schema_section(output: &mut String, result: &ValidationResult) {
    let (class, status) = if result.is_valid {
        ("valid", "VALID")
    } else {
        ("invalid", "INVALID")
    };
    output.push_str(&format!(
        "<h3 class=\"{}\">{} {}</h3>\n",
        class,
        status,
        escape(result.schema_name())
    ));
    output.push_str(&format!(
        "<p>Errors: {}, Warnings: {}</p>\n",
        result.errors.len(),
        result.warnings.len()
    ));
    if result.errors.is_empty() && result.warnings.is_empty() {
        return;
    }

    output.push_str("<table>\n<tr><th>Severity</th><th>Code</th><th>Path</th><th>Message</th><th>Suggestions</th></tr>\n");
    for diagnostic in result.diagnostics() {
        row(output, diagnostic);
    }
    output.push_str("</table>\n");
}

fn row(output: &mut String, diagnostic: &Diagnostic) {
    let suggestions = diagnostic
        .suggestions
        .iter()
        .map(|s| escape(s))
        .collect::<Vec<_>>()
        .join("<br>");
    output.push_str(&format!(
        "<tr><td class=\"{0}\">{0}</td><td>{1}</td><td>{2}</td><td>{3}</td><td>{4}</td></tr>\n",
        diagnostic.severity.as_str(),
        diagnostic.code,
        escape(diagnostic.location.display_path()),
        escape(&diagnostic.message),
        suggestions
    ));
}
