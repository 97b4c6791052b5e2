//! End-to-end behavior of the validation gate over realistic batches.

use genforge_artifact::{GeneratedFile, StageName};
use genforge_validation::{IssueKind, Severity, SuggestionKind, ValidationConfig, ValidationGate};
use pretty_assertions::assert_eq;

fn backend(path: &str, content: &str) -> GeneratedFile {
    GeneratedFile::new(StageName::BackendGeneration, path, content)
}

const CLEAN_SERVICE: &str = r#"/** A stored user */
export interface User {
  id: string;
  name: string;
}

/** Look up a user by id */
export function findUser(users: User[], id: string): User | undefined {
  const found: User | undefined = users.find((user) => user.id === id);
  if (found && found.name.length > 0) {
    return found;
  }
  return undefined;
}
"#;

#[test]
fn clean_batch_passes_with_full_score() {
    let report = ValidationGate::default()
        .validate(&[backend("src/users.ts", CLEAN_SERVICE)])
        .unwrap();

    assert!(report.issues.is_empty(), "{:?}", report.issues);
    assert!(report.passed);
    assert_eq!(report.score, 100);
    assert_eq!(report.summary.files_analyzed, 1);
    // if + && + implicit base
    assert_eq!(report.metrics.complexity, 3);
    assert_eq!(report.metrics.type_coverage, 100.0);
}

#[test]
fn any_error_fails_regardless_of_other_quality() {
    let broken = "/** x */\nexport interface A { a: string }\nexport function f(a: A): string {\n  return a.a;\n";
    let report = ValidationGate::default()
        .validate(&[backend("src/a.ts", CLEAN_SERVICE), backend("src/b.ts", broken)])
        .unwrap();

    assert!(!report.passed);
    assert_eq!(report.summary.error_count, 1);
    assert_eq!(report.score, 80);
    let syntax: Vec<_> = report.issues_of(IssueKind::Syntax).collect();
    assert_eq!(syntax[0].file.as_deref(), Some("src/b.ts"));
    assert_eq!(syntax[0].line, Some(3));
    assert!(report
        .suggestions
        .iter()
        .any(|s| s.kind == SuggestionKind::FixSyntax));
}

#[test]
fn warnings_alone_do_not_fail() {
    let report = ValidationGate::default()
        .validate(&[backend("src/a.ts", "export const a: any = 1;\n")])
        .unwrap();

    assert!(report.passed);
    assert_eq!(report.score, 100);
    assert!(report.summary.warning_count >= 1);
}

#[test]
fn optional_checks_only_run_when_enabled() {
    let source = "/** cfg */\nexport const apiKey = \"sk-12345678\";\nconsole.log(apiKey);\n";
    let files = [backend("src/cfg.js", source)];

    let default_report = ValidationGate::default().validate(&files).unwrap();
    assert_eq!(default_report.issues_of(IssueKind::Security).count(), 0);

    let strict = ValidationGate::new(&ValidationConfig {
        security_checks: true,
        best_practice_checks: true,
        ..ValidationConfig::default()
    });
    let report = strict.validate(&files).unwrap();
    assert_eq!(report.issues_of(IssueKind::Security).count(), 1);
    assert_eq!(report.issues_of(IssueKind::BestPractice).count(), 1);
    assert!(report
        .issues
        .iter()
        .all(|i| i.severity != Severity::Error));
}

#[test]
fn report_serializes_with_camel_case_summary() {
    let report = ValidationGate::default()
        .validate(&[backend("src/users.ts", CLEAN_SERVICE)])
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["overallScore"], 100);
    assert_eq!(json["metrics"]["linesOfCode"], 13);
    assert!(json["fileMetrics"].is_array());
}

const RUST_DELIMITERS: &str = r#"/// Delimiter pairs recognised by the parser
pub fn pair(open: char) -> Option<char> {
    match open {
        '{' => Some('}'),
        '(' => Some(')'),
        '\'' => Some('\''),
        _ => None,
    }
}

/// First word of `text`
pub fn first<'a>(text: &'a str) -> &'a str {
    text.split(' ').next().unwrap_or(text)
}
"#;

const GO_DELIMITERS: &str = r#"package lexer

// Open reports the opening rune for a closing one.
func Open(close rune) rune {
	if close == ')' {
		return '('
	}
	return '{'
}
"#;

#[test]
fn char_and_rune_literals_do_not_break_the_verdict() {
    let report = ValidationGate::default()
        .validate(&[
            backend("src/pairs.rs", RUST_DELIMITERS),
            backend("lexer/open.go", GO_DELIMITERS),
        ])
        .unwrap();

    assert_eq!(report.issues_of(IssueKind::Syntax).count(), 0);
    assert_eq!(report.summary.error_count, 0);
    assert!(report.passed);
    assert_eq!(report.score, 100);
}
