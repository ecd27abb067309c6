//! Schema Validator CLI
//!
//! Validates protocol schemas, checks compatibility and validates data files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use schema_compliance::{
    CompatibilityStatus, ComplianceConfig, DataValidationRequest, ReportFormat, ValidationResult,
    ValidatorFactory,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-validator")]
#[command(about = "Validate protocol schemas and check their compliance")]
struct Cli {
    /// Configuration file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Schema directory (overrides configuration)
    #[arg(short, long, global = true)]
    schemas: Option<PathBuf>,

    /// Report format: text, json, html or junit
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every schema in the schema directory
    All,

    /// Validate a single schema file
    File {
        /// Path to the schema file
        path: PathBuf,
    },

    /// Check compatibility between two schemas
    Compat {
        /// Source schema name
        source: String,
        /// Target schema name
        target: String,
    },

    /// Validate the compatibility matrix
    Matrix,

    /// Pairwise compatibility report across all schemas
    CompatReport,

    /// Validate a JSON data file against a schema
    Data {
        /// Schema name (with or without the file prefix)
        schema: String,
        /// JSON file holding the data
        file: PathBuf,
        /// Also run best-practice heuristics
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether everything validated
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = ComplianceConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(dir) = cli.schemas {
        config.schemas.dir = dir;
    }
    let format = match cli.format.as_deref() {
        Some(name) => name.parse::<ReportFormat>()?,
        None => config.report.default_format,
    };
    let output = cli.output.as_deref();
    let factory = ValidatorFactory::new(config);

    match cli.command {
        Commands::All => {
            eprintln!("🔍 Validating schemas in {}", factory.config().schemas.dir.display());
            let results = factory.syntax().validate_all_schemas();
            report(&factory, format, &results, output)
        }

        Commands::File { path } => {
            eprintln!("🔍 Validating {}", path.display());
            let results = vec![factory.syntax().validate_schema(&path)];
            report(&factory, format, &results, output)
        }

        Commands::Compat { source, target } => {
            eprintln!("🔍 Checking compatibility: {} -> {}", source, target);
            let results = vec![factory.compatibility().check_compatibility(&source, &target)];
            report(&factory, format, &results, output)
        }

        Commands::Matrix => {
            eprintln!("🔍 Validating {}", factory.config().matrix_path().display());
            let results = vec![factory.compatibility().validate_compatibility_matrix()];
            report(&factory, format, &results, output)
        }

        Commands::CompatReport => {
            let report = factory.compatibility().generate_compatibility_report();
            let content = match format {
                ReportFormat::Text => {
                    let mut text = format!(
                        "Compatibility report {}\n{} pairs: {} compatible, {} incompatible, {} deprecated, {} unknown\n",
                        report.report_id,
                        report.summary.total_pairs,
                        report.summary.compatible,
                        report.summary.incompatible,
                        report.summary.deprecated,
                        report.summary.unknown
                    );
                    for detail in &report.details {
                        let mark = match detail.status {
                            CompatibilityStatus::Compatible => "✅",
                            CompatibilityStatus::Deprecated => "⚠️",
                            _ => "❌",
                        };
                        text.push_str(&format!(
                            "  {} {} -> {} ({:?})\n",
                            mark, detail.source_schema, detail.target_schema, detail.status
                        ));
                        for issue in &detail.issues {
                            text.push_str(&format!("     └─ {}\n", issue));
                        }
                    }
                    text
                }
                _ => serde_json::to_string_pretty(&report)?,
            };
            emit(output, &content)?;
            Ok(report.summary.incompatible == 0 && report.summary.unknown == 0)
        }

        Commands::Data { schema, file, strict } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let data: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", file.display()))?;

            let mut request = DataValidationRequest::new(schema, data);
            if strict {
                request = request.strict();
            }
            let result = factory.data().validate_data(&request);

            let content = match format {
                ReportFormat::Text => {
                    let mut text = if result.is_valid {
                        format!("✅ {} is valid against {}\n", file.display(), result.metadata.schema_name)
                    } else {
                        format!("❌ {} is INVALID against {}\n", file.display(), result.metadata.schema_name)
                    };
                    for error in &result.errors {
                        text.push_str(&format!(
                            "   └─ {} at {}: {}\n",
                            error.constraint, error.error_path, error.error_message
                        ));
                    }
                    for warning in &result.warnings {
                        text.push_str(&format!(
                            "   ⚠️ {}: {} ({})\n",
                            warning.warning_path, warning.warning_message, warning.suggestion
                        ));
                    }
                    text
                }
                _ => serde_json::to_string_pretty(&result)?,
            };
            emit(output, &content)?;
            Ok(result.is_valid)
        }
    }
}

fn report(
    factory: &ValidatorFactory,
    format: ReportFormat,
    results: &[ValidationResult],
    output: Option<&Path>,
) -> anyhow::Result<bool> {
    let content = factory.report_generator().generate(format, results);
    emit(output, &content)?;

    let invalid = results.iter().filter(|r| !r.is_valid).count();
    if invalid == 0 {
        eprintln!("✅ {} result(s) valid", results.len());
    } else {
        eprintln!("❌ {} of {} result(s) invalid", invalid, results.len());
    }
    Ok(invalid == 0)
}

fn emit(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("✅ Report written to {:?}", path);
        }
        None => println!("{}", content),
    }
    Ok(())
}
