//! Schema Compliance
//!
//! Validation and compliance engine for a family of JSON Schema (Draft-07)
//! protocol documents that live in one directory as `<prefix><module>.json`.
//!
//! ## Features
//!
//! - **Syntax Validation**: JSON syntax, required structure, Draft-07 keywords
//!   and organisation rules (`$id` prefix, `$defs.uuid`)
//! - **Naming Conventions**: snake_case field names with per-violation fixes
//! - **Enterprise Features**: catalog-driven checks for the six cross-cutting
//!   feature blocks every module schema must carry
//! - **Compatibility**: pairwise checks, a compatibility matrix and a
//!   pairwise report
//! - **Data Validation**: instance documents against compiled schemas, with
//!   strict-mode heuristics and custom predicates
//! - **Reports**: text, JSON, HTML and JUnit XML renderings of one model
//!
//! ## Architecture
//!
//! ```text
//! ValidatorFactory
//! ├── SchemaStore            (shared, cached documents)
//! ├── SyntaxValidator        ── NamingChecker, EnterpriseChecker
//! ├── CompatibilityValidator ── SchemaCompatibilityMatrix
//! ├── DataValidator          (compiled schema cache)
//! └── ReportGenerator        ── text | json | html | junit
//! ```
//!
//! Public validation entry points never return `Err`: every failure becomes
//! a [`Diagnostic`] inside a [`ValidationResult`].

pub mod compatibility;
pub mod config;
pub mod data;
pub mod diagnostic;
pub mod enterprise;
pub mod error;
pub mod factory;
pub mod naming;
pub mod report;
pub mod schema;
pub mod store;
pub mod syntax;
pub mod version;

pub use compatibility::{
    CompatibilityReport, CompatibilityStatus, CompatibilityValidator, ConstraintRule,
    SchemaCompatibilityMatrix,
};
pub use config::ComplianceConfig;
pub use data::{DataValidationRequest, DataValidationResult, DataValidator};
pub use diagnostic::{
    Diagnostic, DiagnosticCode, DiagnosticType, ErrorLocation, Severity, ValidationResult,
};
pub use enterprise::{EnterpriseCatalog, EnterpriseChecker, EnterpriseFeatureValidationResult};
pub use error::{ComplianceError, Result};
pub use factory::{ValidatorFactory, ValidatorHandle, ValidatorKind};
pub use naming::{NamingChecker, NamingConventionValidationResult};
pub use report::{ReportFormat, ReportGenerator, ValidationReport};
pub use schema::SchemaDocument;
pub use store::SchemaStore;
pub use syntax::SyntaxValidator;
