//! Per-file checks run by the validation gate
//!
//! Each check inspects one file independently and returns findings; the
//! gate assigns issue ids and concatenates results.

mod contract;
mod dependency;
mod hygiene;
mod syntax;
mod types;

pub use contract::ContractCheck;
pub use dependency::{DependencyCheck, DEFAULT_RELATIVE_IMPORT_THRESHOLD};
pub use hygiene::{BestPracticeCheck, SecurityCheck};
pub use syntax::SyntaxCheck;
pub use types::TypeAnnotationCheck;

use crate::issue::Finding;
use genforge_artifact::GeneratedFile;

/// A static check over a single generated file
pub trait FileCheck: Send + Sync + std::fmt::Debug {
    /// Inspect a file and return findings (empty when clean)
    fn check(&self, file: &GeneratedFile) -> Vec<Finding>;
}
