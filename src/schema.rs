//! Schema documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::{ComplianceError, Result};

/// A parsed JSON Schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Schema name, the file stem (e.g., "mplp-context")
    pub name: String,
    /// Source file path (if loaded from disk)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Parsed content
    pub content: Value,
    /// SHA256 of the raw text
    pub digest: String,
    /// When this document was loaded
    pub loaded_at: DateTime<Utc>,
}

impl SchemaDocument {
    /// Parse a document from raw text
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        let name = name.into();
        let content: Value = serde_json::from_str(text).map_err(|e| ComplianceError::InvalidSchema {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            name,
            path: None,
            content,
            digest: digest_text(text),
            loaded_at: Utc::now(),
        })
    }

    /// Read and parse a document from a file; the name is the file stem
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = schema_name_from_path(path);
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ComplianceError::SchemaNotFound {
                name: name.clone(),
                path: path.to_path_buf(),
            },
            _ => ComplianceError::Io(e),
        })?;
        let mut doc = Self::parse(name, &text)?;
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Root object, if the document is an object
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.content.as_object()
    }

    pub fn title(&self) -> Option<&str> {
        self.content.get("title").and_then(Value::as_str)
    }

    /// Root `type` keyword
    pub fn root_type(&self) -> Option<&Value> {
        self.content.get("type")
    }

    /// Declared version: top-level `version`, then `properties.protocol_version.const`
    pub fn version(&self) -> Option<&str> {
        self.content
            .get("version")
            .and_then(Value::as_str)
            .or_else(|| {
                self.content
                    .pointer("/properties/protocol_version/const")
                    .and_then(Value::as_str)
            })
    }

    /// Definitions map: `$defs`, then `definitions`
    pub fn defs(&self) -> Option<&Map<String, Value>> {
        self.content
            .get("$defs")
            .or_else(|| self.content.get("definitions"))
            .and_then(Value::as_object)
    }

    /// Module name: prefix stripped, dashes to underscores
    pub fn module_name(&self, prefix: &str) -> String {
        module_name(&self.name, prefix)
    }
}

/// Schema name for a file path (its stem)
pub fn schema_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Module name for a schema name
pub fn module_name(schema_name: &str, prefix: &str) -> String {
    schema_name
        .strip_prefix(prefix)
        .unwrap_or(schema_name)
        .replace('-', "_")
}

/// Hex SHA256 of a string
pub fn digest_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_accessors() {
        let doc = SchemaDocument::parse(
            "mplp-context",
            r#"{"title": "Context", "type": "object", "version": "1.0.1",
                "$defs": {"uuid": {"type": "string"}}}"#,
        )
        .unwrap();
        assert_eq!(doc.title(), Some("Context"));
        assert_eq!(doc.version(), Some("1.0.1"));
        assert!(doc.defs().unwrap().contains_key("uuid"));
        assert_eq!(doc.module_name("mplp-"), "context");
        assert_eq!(doc.digest.len(), 64);
    }

    #[test]
    fn test_version_falls_back_to_protocol_version() {
        let doc = SchemaDocument::parse(
            "mplp-plan",
            r#"{"properties": {"protocol_version": {"const": "1.0.0"}}}"#,
        )
        .unwrap();
        assert_eq!(doc.version(), Some("1.0.0"));
    }

    #[test]
    fn test_digest_changes_with_text() {
        assert_ne!(digest_text("{}"), digest_text("{ }"));
        assert_eq!(digest_text("abc"), digest_text("abc"));
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name("mplp-trace-span", "mplp-"), "trace_span");
        assert_eq!(module_name("plan", "mplp-"), "plan");
    }

    #[test]
    fn test_invalid_json() {
        let err = SchemaDocument::parse("bad", "{ nope").unwrap_err();
        assert!(matches!(err, ComplianceError::InvalidSchema { .. }));
    }
}
