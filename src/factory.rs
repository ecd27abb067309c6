//! Validator factory
//!
//! Owns the configuration and one shared [`SchemaStore`]. Validators are
//! built on first use and the same instance is handed out afterwards.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::compatibility::CompatibilityValidator;
use crate::config::ComplianceConfig;
use crate::data::DataValidator;
use crate::error::{ComplianceError, Result};
use crate::report::ReportGenerator;
use crate::store::SchemaStore;
use crate::syntax::SyntaxValidator;

/// Validator selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
    Syntax,
    Compatibility,
    Data,
}

impl ValidatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Compatibility => "compatibility",
            Self::Data => "data",
        }
    }
}

impl FromStr for ValidatorKind {
    type Err = ComplianceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "syntax" => Ok(Self::Syntax),
            "compatibility" => Ok(Self::Compatibility),
            "data" => Ok(Self::Data),
            other => Err(ComplianceError::UnknownValidator(other.to_string())),
        }
    }
}

impl std::fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validator returned by [`ValidatorFactory::validator`]
#[derive(Clone)]
pub enum ValidatorHandle {
    Syntax(Arc<SyntaxValidator>),
    Compatibility(Arc<CompatibilityValidator>),
    Data(Arc<DataValidator>),
}

impl ValidatorHandle {
    pub fn kind(&self) -> ValidatorKind {
        match self {
            Self::Syntax(_) => ValidatorKind::Syntax,
            Self::Compatibility(_) => ValidatorKind::Compatibility,
            Self::Data(_) => ValidatorKind::Data,
        }
    }
}

impl std::fmt::Debug for ValidatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ValidatorHandle").field(&self.kind()).finish()
    }
}

/// Builds and shares validators over one schema store
pub struct ValidatorFactory {
    config: ComplianceConfig,
    store: Arc<SchemaStore>,
    syntax: OnceLock<Arc<SyntaxValidator>>,
    compatibility: OnceLock<Arc<CompatibilityValidator>>,
    data: OnceLock<Arc<DataValidator>>,
    report: OnceLock<Arc<ReportGenerator>>,
}

impl ValidatorFactory {
    pub fn new(config: ComplianceConfig) -> Self {
        let store = Arc::new(SchemaStore::new(
            config.schemas.dir.clone(),
            config.schemas.file_prefix.clone(),
        ));
        Self {
            config,
            store,
            syntax: OnceLock::new(),
            compatibility: OnceLock::new(),
            data: OnceLock::new(),
            report: OnceLock::new(),
        }
    }

    /// Build a factory from layered configuration plus an optional file
    pub fn from_config_file(path: Option<&Path>) -> Result<Self> {
        Ok(Self::new(ComplianceConfig::load_from(path)?))
    }

    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<SchemaStore> {
        &self.store
    }

    pub fn syntax(&self) -> Arc<SyntaxValidator> {
        Arc::clone(self.syntax.get_or_init(|| {
            debug!("creating syntax validator");
            Arc::new(SyntaxValidator::new(self.config.clone(), Arc::clone(&self.store)))
        }))
    }

    pub fn compatibility(&self) -> Arc<CompatibilityValidator> {
        Arc::clone(self.compatibility.get_or_init(|| {
            debug!("creating compatibility validator");
            Arc::new(CompatibilityValidator::new(
                self.config.clone(),
                Arc::clone(&self.store),
            ))
        }))
    }

    pub fn data(&self) -> Arc<DataValidator> {
        Arc::clone(self.data.get_or_init(|| {
            debug!("creating data validator");
            Arc::new(DataValidator::new(
                Arc::clone(&self.store),
                self.config.validation.strict_data_validation,
            ))
        }))
    }

    pub fn report_generator(&self) -> Arc<ReportGenerator> {
        Arc::clone(
            self.report
                .get_or_init(|| Arc::new(ReportGenerator::new(self.config.report.title.clone()))),
        )
    }

    pub fn validator(&self, kind: ValidatorKind) -> ValidatorHandle {
        match kind {
            ValidatorKind::Syntax => ValidatorHandle::Syntax(self.syntax()),
            ValidatorKind::Compatibility => ValidatorHandle::Compatibility(self.compatibility()),
            ValidatorKind::Data => ValidatorHandle::Data(self.data()),
        }
    }

    /// Drop cached documents and compiled validators
    pub fn clear_caches(&self) {
        self.store.clear();
        if let Some(data) = self.data.get() {
            data.clear_cache();
        }
        debug!("validator caches cleared");
    }
}
