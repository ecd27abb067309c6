//! Configuration management for the compliance engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-compliance.toml)
//! - Environment variables (SCHEMA_COMPLIANCE__*)
//!
//! ## Example config file (schema-compliance.toml):
//! ```toml
//! [schemas]
//! dir = "src/schemas"
//! file_prefix = "mplp-"
//! id_prefix = "https://mplp.dev/schemas/v1.0/"
//!
//! [validation]
//! enterprise_features = true
//! naming_convention = true
//! strict_data_validation = false
//!
//! [report]
//! title = "Schema Validation Report"
//! default_format = "text"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::report::ReportFormat;

/// Draft-07 meta-schema URI
pub const DRAFT_07_URI: &str = "http://json-schema.org/draft-07/schema#";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceConfig {
    /// Schema location and identity settings
    #[serde(default)]
    pub schemas: SchemasConfig,

    /// Validation stage toggles
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Report settings
    #[serde(default)]
    pub report: ReportConfig,
}

/// Where schemas live and how they are identified
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemasConfig {
    /// Directory holding the schema files
    #[serde(default = "default_schemas_dir")]
    pub dir: PathBuf,

    /// File name prefix of schema files (also stripped to get module names)
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Required `$id` prefix
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// Required `$schema` value
    #[serde(default = "default_draft_uri")]
    pub draft_uri: String,

    /// Compatibility matrix file, relative to `dir`
    #[serde(default = "default_matrix_file")]
    pub matrix_file: String,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Run the enterprise feature stage
    #[serde(default = "default_true")]
    pub enterprise_features: bool,

    /// Run the detailed naming convention stage
    #[serde(default = "default_true")]
    pub naming_convention: bool,

    /// Default strict mode for data validation
    #[serde(default)]
    pub strict_data_validation: bool,
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_title")]
    pub title: String,

    #[serde(default)]
    pub default_format: ReportFormat,
}

// Default value functions
fn default_schemas_dir() -> PathBuf {
    PathBuf::from("src/schemas")
}

fn default_file_prefix() -> String {
    "mplp-".to_string()
}

fn default_id_prefix() -> String {
    "https://mplp.dev/schemas/v1.0/".to_string()
}

fn default_draft_uri() -> String {
    DRAFT_07_URI.to_string()
}

fn default_matrix_file() -> String {
    "compatibility-matrix.json".to_string()
}

fn default_report_title() -> String {
    "Schema Validation Report".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SchemasConfig {
    fn default() -> Self {
        Self {
            dir: default_schemas_dir(),
            file_prefix: default_file_prefix(),
            id_prefix: default_id_prefix(),
            draft_uri: default_draft_uri(),
            matrix_file: default_matrix_file(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enterprise_features: true,
            naming_convention: true,
            strict_data_validation: false,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_report_title(),
            default_format: ReportFormat::default(),
        }
    }
}

impl ComplianceConfig {
    /// Configuration with defaults and the given schema directory
    pub fn with_schemas_dir(dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.schemas.dir = dir.into();
        config
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-compliance.toml",
            ".schema-compliance.toml",
            "config/schema-compliance.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(dirs) = directories::ProjectDirs::from("dev", "mplp", "schema-compliance") {
            let xdg_config = dirs.config_dir().join("schema-compliance.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        // SCHEMA_COMPLIANCE__VALIDATION__NAMING_CONVENTION=false
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_COMPLIANCE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Full path of the compatibility matrix file
    pub fn matrix_path(&self) -> PathBuf {
        self.schemas.dir.join(&self.schemas.matrix_file)
    }
}
