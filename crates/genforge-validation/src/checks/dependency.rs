//! Relative import heuristic

use super::FileCheck;
use crate::issue::{Finding, IssueKind, Severity};
use crate::rules::rules_for;
use genforge_artifact::GeneratedFile;

/// Default number of relative imports tolerated per file
pub const DEFAULT_RELATIVE_IMPORT_THRESHOLD: usize = 5;

/// Suggests refactoring when a file pulls in many same-project modules
#[derive(Debug, Clone, Copy)]
pub struct DependencyCheck {
    threshold: usize,
}

impl DependencyCheck {
    /// Create check with a custom threshold
    #[inline]
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// Relative imports in a file
    #[must_use]
    pub fn relative_imports(file: &GeneratedFile) -> usize {
        rules_for(file.language)
            .relative_import
            .as_ref()
            .map_or(0, |re| re.find_iter(&file.content).count())
    }
}

impl Default for DependencyCheck {
    fn default() -> Self {
        Self::new(DEFAULT_RELATIVE_IMPORT_THRESHOLD)
    }
}

impl FileCheck for DependencyCheck {
    fn check(&self, file: &GeneratedFile) -> Vec<Finding> {
        let count = Self::relative_imports(file);
        if count > self.threshold {
            vec![Finding::new(
                IssueKind::Dependency,
                Severity::Info,
                format!(
                    "{count} relative imports (more than {}); consider refactoring into fewer modules",
                    self.threshold
                ),
            )]
        } else {
            Vec::new()
        }
    }
}
