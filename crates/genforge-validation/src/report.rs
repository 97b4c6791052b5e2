//! Validation report, verdict and suggestions

use crate::issue::{IssueKind, Severity, ValidationIssue};
use crate::metrics::CodeMetrics;
use genforge_artifact::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-file complexity above which a refactor is suggested
pub const COMPLEXITY_THRESHOLD: usize = 10;
/// Per-file maintainability below which an improvement is suggested
pub const MAINTAINABILITY_THRESHOLD: f64 = 60.0;
/// Batch type coverage below which more annotations are suggested
pub const TYPE_COVERAGE_THRESHOLD: f64 = 80.0;

/// Metrics for one file in the batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetrics {
    /// File path
    pub path: String,
    /// Language tag
    pub language: Language,
    /// Metrics for this file alone
    pub metrics: CodeMetrics,
}

/// Category of an advisory suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    FixSyntax,
    AddTypeAnnotations,
    ReduceCoupling,
    DocumentContracts,
    ReviewSecurity,
    RemoveDebugCode,
    Refactor,
    ImproveMaintainability,
    IncreaseTypeCoverage,
}

/// Advisory suggestion; never affects the verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub message: String,
    pub file: Option<String>,
}

impl Suggestion {
    fn new(kind: SuggestionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: None,
        }
    }

    fn for_file(mut self, path: &str) -> Self {
        self.file = Some(path.to_string());
        self
    }
}

/// Issue counts and overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub overall_score: u8,
    pub passed: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub files_analyzed: usize,
}

/// Output of the validation gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
    /// Batch aggregate
    pub metrics: CodeMetrics,
    pub file_metrics: Vec<FileMetrics>,
    pub passed: bool,
    /// 0..=100
    pub score: u8,
    pub summary: ReportSummary,
    pub suggestions: Vec<Suggestion>,
}

impl ValidationReport {
    /// Assemble a report, computing verdict, score and suggestions
    #[must_use]
    pub fn new(issues: Vec<ValidationIssue>, file_metrics: Vec<FileMetrics>) -> Self {
        let metrics = CodeMetrics::aggregate(file_metrics.iter().map(|f| &f.metrics));
        let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
        let error_count = count(Severity::Error);
        let warning_count = count(Severity::Warning);
        let info_count = count(Severity::Info);
        let (passed, score) = verdict(error_count, warning_count);
        let suggestions = suggest(&issues, &metrics, &file_metrics);

        Self {
            summary: ReportSummary {
                overall_score: score,
                passed,
                error_count,
                warning_count,
                info_count,
                files_analyzed: file_metrics.len(),
            },
            issues,
            metrics,
            file_metrics,
            passed,
            score,
            suggestions,
        }
    }

    /// Issues of one category
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }
}

/// Pass/fail verdict and score.
///
/// Any error fails the batch; a failed batch loses 20 points per error and
/// 5 per warning, floored at zero. A passing batch always scores 100.
#[must_use]
pub fn verdict(error_count: usize, warning_count: usize) -> (bool, u8) {
    if error_count == 0 {
        return (true, 100);
    }
    let penalty = error_count
        .saturating_mul(20)
        .saturating_add(warning_count.saturating_mul(5));
    let score = 100usize.saturating_sub(penalty);
    (false, u8::try_from(score).unwrap_or(0))
}

fn suggest(
    issues: &[ValidationIssue],
    metrics: &CodeMetrics,
    file_metrics: &[FileMetrics],
) -> Vec<Suggestion> {
    let kinds: BTreeSet<IssueKind> = issues.iter().map(|i| i.kind).collect();
    let mut suggestions: Vec<Suggestion> = kinds
        .into_iter()
        .map(|kind| match kind {
            IssueKind::Syntax => Suggestion::new(
                SuggestionKind::FixSyntax,
                "Fix unbalanced or unterminated blocks before using the generated code",
            ),
            IssueKind::Type => Suggestion::new(
                SuggestionKind::AddTypeAnnotations,
                "Add explicit type annotations and avoid escape-hatch types",
            ),
            IssueKind::Dependency => Suggestion::new(
                SuggestionKind::ReduceCoupling,
                "Consolidate modules with many relative imports",
            ),
            IssueKind::Contract => Suggestion::new(
                SuggestionKind::DocumentContracts,
                "Document exported symbols and export the types that describe them",
            ),
            IssueKind::Security => Suggestion::new(
                SuggestionKind::ReviewSecurity,
                "Review security-sensitive constructs flagged in the report",
            ),
            IssueKind::BestPractice => Suggestion::new(
                SuggestionKind::RemoveDebugCode,
                "Remove leftover debugging statements",
            ),
        })
        .collect();

    for file in file_metrics {
        if file.metrics.complexity > COMPLEXITY_THRESHOLD {
            suggestions.push(
                Suggestion::new(
                    SuggestionKind::Refactor,
                    format!(
                        "Refactor to reduce complexity ({} > {COMPLEXITY_THRESHOLD})",
                        file.metrics.complexity
                    ),
                )
                .for_file(&file.path),
            );
        }
        if file.metrics.maintainability < MAINTAINABILITY_THRESHOLD {
            suggestions.push(
                Suggestion::new(
                    SuggestionKind::ImproveMaintainability,
                    format!(
                        "Improve maintainability ({:.1} < {MAINTAINABILITY_THRESHOLD})",
                        file.metrics.maintainability
                    ),
                )
                .for_file(&file.path),
            );
        }
    }

    if metrics.type_coverage < TYPE_COVERAGE_THRESHOLD {
        suggestions.push(Suggestion::new(
            SuggestionKind::IncreaseTypeCoverage,
            format!(
                "Increase type coverage ({:.1}% < {TYPE_COVERAGE_THRESHOLD}%)",
                metrics.type_coverage
            ),
        ));
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity, kind: IssueKind) -> ValidationIssue {
        ValidationIssue {
            id: "X-0001".to_string(),
            kind,
            severity,
            message: "m".to_string(),
            file: None,
            line: None,
        }
    }

    #[test]
    fn verdict_passes_without_errors() {
        assert_eq!(verdict(0, 0), (true, 100));
        assert_eq!(verdict(0, 12), (true, 100));
    }

    #[test]
    fn verdict_penalizes_errors_and_warnings() {
        assert_eq!(verdict(1, 0), (false, 80));
        assert_eq!(verdict(2, 3), (false, 45));
        assert_eq!(verdict(5, 1), (false, 0));
        assert_eq!(verdict(usize::MAX, usize::MAX), (false, 0));
    }

    #[test]
    fn report_counts_and_summary() {
        let report = ValidationReport::new(
            vec![
                issue(Severity::Error, IssueKind::Syntax),
                issue(Severity::Warning, IssueKind::Type),
                issue(Severity::Info, IssueKind::Dependency),
            ],
            Vec::new(),
        );
        assert!(!report.passed);
        assert_eq!(report.score, 75);
        assert_eq!(report.summary.overall_score, 75);
        assert_eq!(report.summary.error_count, 1);
        assert_eq!(report.summary.info_count, 1);
        assert_eq!(report.issues_of(IssueKind::Type).count(), 1);
    }

    #[test]
    fn suggestions_follow_issue_categories() {
        let report = ValidationReport::new(
            vec![
                issue(Severity::Warning, IssueKind::Type),
                issue(Severity::Warning, IssueKind::Type),
            ],
            Vec::new(),
        );
        assert_eq!(report.suggestions.len(), 1);
        assert_eq!(report.suggestions[0].kind, SuggestionKind::AddTypeAnnotations);
    }

    #[test]
    fn metric_thresholds_drive_suggestions() {
        let complex = FileMetrics {
            path: "big.ts".to_string(),
            language: Language::TypeScript,
            metrics: CodeMetrics::from_counts(10, 12, 10, 5),
        };
        let report = ValidationReport::new(Vec::new(), vec![complex]);
        let kinds: Vec<_> = report.suggestions.iter().map(|s| s.kind).collect();
        assert!(kinds.contains(&SuggestionKind::Refactor));
        assert!(kinds.contains(&SuggestionKind::IncreaseTypeCoverage));
        assert!(report.passed, "suggestions never affect the verdict");
    }
}
