//! The validation gate
//!
//! Runs every configured [`FileCheck`] over each file of a batch, measures
//! metrics, and turns the result into a [`ValidationReport`] with a
//! pass/fail verdict.

use crate::checks::{
    BestPracticeCheck, ContractCheck, DependencyCheck, FileCheck, SecurityCheck, SyntaxCheck,
    TypeAnnotationCheck, DEFAULT_RELATIVE_IMPORT_THRESHOLD,
};
use crate::error::ValidationError;
use crate::metrics::CodeMetrics;
use crate::report::{FileMetrics, ValidationReport};
use genforge_artifact::GeneratedFile;
use serde::{Deserialize, Serialize};

/// Validation gate configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Run the security check
    pub security_checks: bool,
    /// Run the best-practice check
    pub best_practice_checks: bool,
    /// Relative imports tolerated per file before an info issue
    pub relative_import_threshold: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            security_checks: false,
            best_practice_checks: false,
            relative_import_threshold: DEFAULT_RELATIVE_IMPORT_THRESHOLD,
        }
    }
}

/// Static-analysis gate over generated files
#[derive(Debug)]
pub struct ValidationGate {
    checks: Vec<Box<dyn FileCheck>>,
}

impl ValidationGate {
    /// Create gate from configuration
    #[must_use]
    pub fn new(config: &ValidationConfig) -> Self {
        let mut checks: Vec<Box<dyn FileCheck>> = vec![
            Box::new(SyntaxCheck),
            Box::new(TypeAnnotationCheck),
            Box::new(DependencyCheck::new(config.relative_import_threshold)),
            Box::new(ContractCheck),
        ];
        if config.security_checks {
            checks.push(Box::new(SecurityCheck));
        }
        if config.best_practice_checks {
            checks.push(Box::new(BestPracticeCheck));
        }
        Self { checks }
    }

    /// Add a custom check, run after the built-in ones
    #[must_use]
    pub fn with_check(mut self, check: impl FileCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Number of checks run per file
    #[inline]
    #[must_use]
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Validate a batch of files
    ///
    /// Issue ids are assigned in file order, then check order, so the same
    /// batch always yields the same ids.
    ///
    /// # Errors
    /// Returns error if a file has an empty path or binary content
    pub fn validate(&self, files: &[GeneratedFile]) -> Result<ValidationReport, ValidationError> {
        for (index, file) in files.iter().enumerate() {
            if file.path.trim().is_empty() {
                return Err(ValidationError::EmptyPath { index });
            }
            if file.content.contains('\0') {
                return Err(ValidationError::BinaryContent {
                    path: file.path.clone(),
                });
            }
        }

        let mut issues = Vec::new();
        let mut file_metrics = Vec::with_capacity(files.len());
        let mut seq = 0;

        for file in files {
            for check in &self.checks {
                for finding in check.check(file) {
                    seq += 1;
                    issues.push(finding.into_issue(seq, &file.path));
                }
            }
            file_metrics.push(FileMetrics {
                path: file.path.clone(),
                language: file.language,
                metrics: CodeMetrics::measure(file),
            });
        }

        let report = ValidationReport::new(issues, file_metrics);
        tracing::debug!(
            files = files.len(),
            issues = report.issues.len(),
            passed = report.passed,
            score = report.score,
            "validation complete"
        );
        Ok(report)
    }
}

impl Default for ValidationGate {
    fn default() -> Self {
        Self::new(&ValidationConfig::default())
    }
}
