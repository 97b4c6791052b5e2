//! Validation issues

use serde::{Deserialize, Serialize};

/// Category of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// Unbalanced delimiters, unterminated bodies
    Syntax,
    /// Missing or escaped type annotations
    Type,
    /// Import structure
    Dependency,
    /// Documentation and exported-type contracts
    Contract,
    /// Leftover debugging and similar habits
    BestPractice,
    /// Dangerous constructs
    Security,
}

impl IssueKind {
    /// Short code used as issue id prefix
    #[inline]
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::Syntax => "SYN",
            IssueKind::Type => "TYP",
            IssueKind::Dependency => "DEP",
            IssueKind::Contract => "CON",
            IssueKind::BestPractice => "BPR",
            IssueKind::Security => "SEC",
        }
    }
}

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Forces a failed verdict
    Error,
    /// Score penalty when the verdict fails
    Warning,
    /// Advisory only
    Info,
}

/// A single issue found in a generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Report-unique, stable identifier
    pub id: String,
    /// Category
    pub kind: IssueKind,
    /// Severity
    pub severity: Severity,
    /// Human-readable description
    pub message: String,
    /// File the issue was found in
    pub file: Option<String>,
    /// 1-based line number
    pub line: Option<usize>,
}

/// Issue produced by a check before the gate assigns id and file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Category
    pub kind: IssueKind,
    /// Severity
    pub severity: Severity,
    /// Description
    pub message: String,
    /// 1-based line number
    pub line: Option<usize>,
}

impl Finding {
    /// Create a finding without a line
    #[inline]
    #[must_use]
    pub fn new(kind: IssueKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            line: None,
        }
    }

    /// Attach a line number
    #[inline]
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Promote to an issue with report-level id and file path
    pub(crate) fn into_issue(self, seq: usize, file: &str) -> ValidationIssue {
        ValidationIssue {
            id: format!("{}-{:04}", self.kind.code(), seq),
            kind: self.kind,
            severity: self.severity,
            message: self.message,
            file: Some(file.to_string()),
            line: self.line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_into_issue() {
        let issue = Finding::new(IssueKind::Syntax, Severity::Error, "unclosed '{'")
            .at_line(3)
            .into_issue(7, "src/a.ts");
        assert_eq!(issue.id, "SYN-0007");
        assert_eq!(issue.file.as_deref(), Some("src/a.ts"));
        assert_eq!(issue.line, Some(3));
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
        assert_eq!(
            serde_json::to_string(&IssueKind::BestPractice).unwrap(),
            "\"best-practice\""
        );
    }
}
