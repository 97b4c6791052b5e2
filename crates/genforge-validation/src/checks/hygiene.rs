//! Optional security and best-practice checks

use super::FileCheck;
use crate::issue::{Finding, IssueKind, Severity};
use crate::rules::{line_of, rules_for, SECURITY_PATTERNS};
use genforge_artifact::GeneratedFile;

/// Flags dangerous constructs such as `eval` and hard-coded credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityCheck;

impl FileCheck for SecurityCheck {
    fn check(&self, file: &GeneratedFile) -> Vec<Finding> {
        let source = file.content.as_str();
        SECURITY_PATTERNS
            .iter()
            .flat_map(|(pattern, label)| {
                pattern.find_iter(source).map(move |m| {
                    Finding::new(IssueKind::Security, Severity::Warning, *label)
                        .at_line(line_of(source, m.start()))
                })
            })
            .collect()
    }
}

/// Flags leftover debugging statements
#[derive(Debug, Clone, Copy, Default)]
pub struct BestPracticeCheck;

impl FileCheck for BestPracticeCheck {
    fn check(&self, file: &GeneratedFile) -> Vec<Finding> {
        let source = file.content.as_str();
        let Some(pattern) = &rules_for(file.language).debug_leftover else {
            return Vec::new();
        };
        pattern
            .find_iter(source)
            .map(|m| {
                Finding::new(
                    IssueKind::BestPractice,
                    Severity::Info,
                    format!("leftover debugging statement `{}`", m.as_str().trim_end_matches('(').trim()),
                )
                .at_line(line_of(source, m.start()))
            })
            .collect()
    }
}
