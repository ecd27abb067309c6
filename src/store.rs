//! Schema Store
//!
//! Loads schema documents by name from a directory and caches the parsed
//! result. No validation happens here.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ComplianceError, Result};
use crate::schema::{schema_name_from_path, SchemaDocument};

/// Name-keyed cache of parsed schema documents
#[derive(Debug)]
pub struct SchemaStore {
    /// Directory holding the schema files
    root: PathBuf,
    /// File name prefix for listing
    prefix: String,
    /// Parsed documents by schema name
    documents: DashMap<String, Arc<SchemaDocument>>,
}

impl SchemaStore {
    /// Create a store over `root`, listing files named `<prefix>*.json`
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
            documents: DashMap::new(),
        }
    }

    /// Get the root path of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File name prefix used for listing
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path of the file backing `name`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }

    /// Whether a schema file exists for `name`
    pub fn exists(&self, name: &str) -> bool {
        self.documents.contains_key(name) || self.path_for(name).is_file()
    }

    /// Resolve a schema name given with or without the file prefix
    pub fn resolve(&self, name: &str) -> Option<String> {
        if self.exists(name) {
            return Some(name.to_string());
        }
        let prefixed = format!("{}{}", self.prefix, name);
        self.exists(&prefixed).then_some(prefixed)
    }

    /// Load a document, from cache when present
    pub fn load(&self, name: &str) -> Result<Arc<SchemaDocument>> {
        if let Some(doc) = self.documents.get(name) {
            debug!(schema = name, "schema cache hit");
            return Ok(Arc::clone(doc.value()));
        }

        let path = self.path_for(name);
        if !path.is_file() {
            return Err(ComplianceError::SchemaNotFound {
                name: name.to_string(),
                path,
            });
        }

        let doc = Arc::new(SchemaDocument::from_file(&path)?);
        debug!(schema = name, digest = %doc.digest, "schema loaded");
        // Concurrent first loads may race; both parse the same file.
        self.documents.insert(name.to_string(), Arc::clone(&doc));
        Ok(doc)
    }

    /// List schema files (`<prefix>*.json`), sorted by path
    pub fn list_schema_files(&self) -> Result<Vec<PathBuf>> {
        if self.root.exists() && !self.root.is_dir() {
            return Err(ComplianceError::NotADirectory(self.root.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_json = path.extension().map(|x| x == "json").unwrap_or(false);
            let has_prefix = entry
                .file_name()
                .to_str()
                .map(|n| n.starts_with(&self.prefix))
                .unwrap_or(false);
            if is_json && has_prefix {
                files.push(path.to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Names of all listed schemas, sorted
    pub fn schema_names(&self) -> Result<Vec<String>> {
        Ok(self
            .list_schema_files()?
            .iter()
            .map(|p| schema_name_from_path(p))
            .collect())
    }

    /// Number of cached documents
    pub fn cached_count(&self) -> usize {
        self.documents.len()
    }

    /// Drop all cached documents
    pub fn clear(&self) {
        self.documents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_list_filters_prefix_and_extension() {
        let dir = tempdir().unwrap();
        write(dir.path(), "mplp-plan.json", "{}");
        write(dir.path(), "mplp-context.json", "{}");
        write(dir.path(), "compatibility-matrix.json", "{}");
        write(dir.path(), "mplp-notes.txt", "");
        std::fs::create_dir(dir.path().join("mplp-nested.json")).unwrap();

        let store = SchemaStore::new(dir.path(), "mplp-");
        let names = store.schema_names().unwrap();
        assert_eq!(names, vec!["mplp-context", "mplp-plan"]);
    }

    #[test]
    fn test_missing_directory_is_error() {
        let dir = tempdir().unwrap();
        let store = SchemaStore::new(dir.path().join("nope"), "mplp-");
        assert!(matches!(
            store.list_schema_files(),
            Err(ComplianceError::Walk(_))
        ));
    }

    #[test]
    fn test_file_as_root_is_error() {
        let dir = tempdir().unwrap();
        write(dir.path(), "schemas", "not a directory");
        let store = SchemaStore::new(dir.path().join("schemas"), "mplp-");
        assert!(matches!(
            store.list_schema_files(),
            Err(ComplianceError::NotADirectory(_))
        ));
        assert!(store.schema_names().is_err());
    }

    #[test]
    fn test_load_caches_until_clear() {
        let dir = tempdir().unwrap();
        write(dir.path(), "mplp-plan.json", r#"{"type": "object"}"#);
        let store = SchemaStore::new(dir.path(), "mplp-");
        assert_eq!(store.resolve("plan").as_deref(), Some("mplp-plan"));

        let first = store.load("mplp-plan").unwrap();
        write(dir.path(), "mplp-plan.json", r#"{"type": "array"}"#);
        let second = store.load("mplp-plan").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.cached_count(), 1);

        store.clear();
        let third = store.load("mplp-plan").unwrap();
        assert_eq!(third.root_type().and_then(|t| t.as_str()), Some("array"));
        assert_ne!(first.digest, third.digest);
    }

    #[test]
    fn test_load_unknown_schema() {
        let dir = tempdir().unwrap();
        let store = SchemaStore::new(dir.path(), "mplp-");
        assert!(!store.exists("mplp-ghost"));
        assert_eq!(store.resolve("ghost"), None);
        assert!(matches!(
            store.load("mplp-ghost"),
            Err(ComplianceError::SchemaNotFound { .. })
        ));
    }
}
