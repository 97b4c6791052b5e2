//! genforge Validation Gate
//!
//! Static analysis over a batch of generated files. Produces a
//! [`ValidationReport`] carrying issues, metrics, a pass/fail verdict and a
//! 0-100 score.
//!
//! # Verdict
//!
//! - `passed` is true exactly when no `error`-severity issue was found
//! - `score` is 100 when passed, else `max(0, 100 - 20 * errors - 5 * warnings)`
//! - suggestions are advisory and never change the verdict
//!
//! # Example
//!
//! ```rust
//! use genforge_artifact::{GeneratedFile, StageName};
//! use genforge_validation::ValidationGate;
//!
//! let files = vec![GeneratedFile::new(
//!     StageName::BackendGeneration,
//!     "src/sum.ts",
//!     "export const sum = (a: number, b: number): number => a + b;\n",
//! )];
//! let report = ValidationGate::default().validate(&files).unwrap();
//! assert!(report.passed);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod checks;
pub mod error;
pub mod gate;
pub mod issue;
pub mod metrics;
pub mod report;
mod rules;

pub use checks::FileCheck;
pub use error::ValidationError;
pub use gate::{ValidationConfig, ValidationGate};
pub use issue::{Finding, IssueKind, Severity, ValidationIssue};
pub use metrics::CodeMetrics;
pub use report::{FileMetrics, ReportSummary, Suggestion, SuggestionKind, ValidationReport};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
