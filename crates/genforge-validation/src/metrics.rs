//! Code metrics
//!
//! These formulas are this system's own scoring convention. They are
//! heuristic, kept stable for compatibility with existing consumers, and
//! not calibrated against any external tool:
//!
//! - `linesOfCode`: non-blank lines
//! - `complexity`: `1 + decision points` (`if`, `for`, `while`, `case`,
//!   `catch`, `&&`, `||`, ternary `? :`)
//! - `maintainability`: `clamp(0, 100, (171 - 5.2 ln V - 0.23 C) * 100 / 171)`
//!   with `V = loc * log2(loc + 1)`
//! - `typeCoverage`: `typed / declarations * 100`, 100 with no declarations

use crate::rules::{rules_for, LanguageRules, DECISION_POINTS};
use genforge_artifact::GeneratedFile;
use serde::{Deserialize, Serialize};

/// Metrics for a file or a batch of files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeMetrics {
    /// Non-blank lines
    pub lines_of_code: usize,
    /// 1 + decision points
    pub complexity: usize,
    /// Maintainability index, 0..=100
    pub maintainability: f64,
    /// Percentage of typed declarations, 0..=100
    pub type_coverage: f64,
    /// Raw decision point count
    pub decision_points: usize,
    /// Declarations seen (statically typed languages only)
    pub declarations: usize,
    /// Declarations carrying a type annotation
    pub typed_declarations: usize,
}

impl CodeMetrics {
    /// Derive all metrics from raw counts
    #[must_use]
    pub fn from_counts(
        lines_of_code: usize,
        decision_points: usize,
        declarations: usize,
        typed_declarations: usize,
    ) -> Self {
        let complexity = 1 + decision_points;
        Self {
            lines_of_code,
            complexity,
            maintainability: maintainability_index(lines_of_code, complexity),
            type_coverage: type_coverage(typed_declarations, declarations),
            decision_points,
            declarations,
            typed_declarations,
        }
    }

    /// Measure a single file
    #[must_use]
    pub fn measure(file: &GeneratedFile) -> Self {
        let source = file.content.as_str();
        let (declarations, typed) = if file.language.is_statically_typed() {
            declaration_counts(source, rules_for(file.language))
        } else {
            (0, 0)
        };

        Self::from_counts(
            count_lines_of_code(source),
            count_decision_points(source),
            declarations,
            typed,
        )
    }

    /// Aggregate file metrics, treating the batch as one unit
    #[must_use]
    pub fn aggregate<'a>(metrics: impl IntoIterator<Item = &'a CodeMetrics>) -> Self {
        let (loc, decisions, decls, typed) = metrics.into_iter().fold(
            (0, 0, 0, 0),
            |(loc, decisions, decls, typed), m| {
                (
                    loc + m.lines_of_code,
                    decisions + m.decision_points,
                    decls + m.declarations,
                    typed + m.typed_declarations,
                )
            },
        );
        Self::from_counts(loc, decisions, decls, typed)
    }
}

/// Count non-blank lines
#[must_use]
pub fn count_lines_of_code(source: &str) -> usize {
    source.lines().filter(|l| !l.trim().is_empty()).count()
}

/// Count decision-point pattern matches
#[must_use]
pub fn count_decision_points(source: &str) -> usize {
    DECISION_POINTS
        .iter()
        .map(|pattern| pattern.find_iter(source).count())
        .sum()
}

/// Maintainability index from lines of code and complexity
///
/// An empty body has zero volume and is fully maintainable.
#[must_use]
pub fn maintainability_index(lines_of_code: usize, complexity: usize) -> f64 {
    let loc = lines_of_code as f64;
    let volume = loc * (loc + 1.0).log2();
    if volume <= 0.0 {
        return 100.0;
    }
    let raw = (171.0 - 5.2 * volume.ln() - 0.23 * complexity as f64) * 100.0 / 171.0;
    raw.clamp(0.0, 100.0)
}

/// Percentage of typed declarations; vacuously 100 when there are none
#[must_use]
pub fn type_coverage(typed: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        typed as f64 / total as f64 * 100.0
    }
}

/// `(declarations, typed declarations)` for a language's declaration rules
pub(crate) fn declaration_counts(source: &str, rules: &LanguageRules) -> (usize, usize) {
    let mut total = 0;
    let mut typed = 0;
    for rule in &rules.declarations {
        for caps in rule.pattern.captures_iter(source) {
            total += 1;
            if rule.typed_group.is_some_and(|g| caps.get(g).is_some()) {
                typed += 1;
            }
        }
    }
    (total, typed)
}
