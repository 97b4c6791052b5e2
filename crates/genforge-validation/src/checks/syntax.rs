//! Delimiter balance check
//!
//! Walks the source once, skipping comments and string literals, and tracks
//! open brackets on a stack. Unbalanced or unterminated constructs are
//! errors.

use super::FileCheck;
use crate::issue::{Finding, IssueKind, Severity};
use crate::rules::{rules_for, Lexical};
use genforge_artifact::GeneratedFile;

/// Syntax check over bracket/brace/paren balance
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxCheck;

impl FileCheck for SyntaxCheck {
    fn check(&self, file: &GeneratedFile) -> Vec<Finding> {
        let Some(lexical) = rules_for(file.language).lexical else {
            return Vec::new();
        };

        scan_delimiters(&file.content, lexical)
            .into_iter()
            .map(DelimiterProblem::into_finding)
            .collect()
    }
}

/// A structural problem found by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DelimiterProblem {
    Unexpected { close: char, line: usize },
    Mismatched { open: char, open_line: usize, close: char, line: usize },
    Unclosed { open: char, line: usize },
    UnterminatedComment { line: usize },
    UnterminatedString { quote: char, line: usize },
}

impl DelimiterProblem {
    fn into_finding(self) -> Finding {
        let (message, line) = match self {
            Self::Unexpected { close, line } => (format!("unexpected closing '{close}'"), line),
            Self::Mismatched { open, open_line, close, line } => (
                format!("'{open}' opened on line {open_line} is closed by '{close}'"),
                line,
            ),
            Self::Unclosed { open, line } => {
                (format!("unclosed '{open}': block is never terminated"), line)
            }
            Self::UnterminatedComment { line } => ("unterminated block comment".to_string(), line),
            Self::UnterminatedString { quote, line } => {
                (format!("unterminated string literal opened with {quote}"), line)
            }
        };
        Finding::new(IssueKind::Syntax, Severity::Error, message).at_line(line)
    }
}

fn opener_for(close: char) -> char {
    match close {
        ')' => '(',
        ']' => '[',
        _ => '{',
    }
}

fn starts_with(chars: &[char], at: usize, marker: &str) -> bool {
    let mut idx = at;
    for m in marker.chars() {
        if chars.get(idx) != Some(&m) {
            return false;
        }
        idx += 1;
    }
    true
}

/// Length of the char literal opening at `at`, if one does
///
/// Escapes (`'\n'`, `'\''`, `'\u{7b}'`) close within a few characters on
/// the same line; a plain literal is exactly one character between quotes.
fn char_literal_len(chars: &[char], at: usize) -> Option<usize> {
    match chars.get(at + 1)? {
        '\\' => chars
            .iter()
            .skip(at + 3)
            .take(10)
            .take_while(|c| **c != '\n')
            .position(|c| *c == '\'')
            .map(|offset| offset + 4),
        '\n' | '\'' => None,
        _ => (chars.get(at + 2) == Some(&'\'')).then_some(3),
    }
}

/// Scan `source` and return every delimiter problem, in source order
/// (unclosed openers last).
pub(crate) fn scan_delimiters(source: &str, lexical: Lexical) -> Vec<DelimiterProblem> {
    let chars: Vec<char> = source.chars().collect();
    let len = chars.len();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut problems = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < len {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            i += 1;
            continue;
        }

        if let Some(marker) = lexical.line_comment {
            if starts_with(&chars, i, marker) {
                while i < len && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
        }

        if lexical.block_comment && starts_with(&chars, i, "/*") {
            let start_line = line;
            i += 2;
            loop {
                if i >= len {
                    problems.push(DelimiterProblem::UnterminatedComment { line: start_line });
                    break;
                }
                if starts_with(&chars, i, "*/") {
                    i += 2;
                    break;
                }
                if chars[i] == '\n' {
                    line += 1;
                }
                i += 1;
            }
            continue;
        }

        if lexical.triple_quotes && (starts_with(&chars, i, "\"\"\"") || starts_with(&chars, i, "'''")) {
            let delim: String = chars[i..i + 3].iter().collect();
            let start_line = line;
            i += 3;
            loop {
                if i >= len {
                    problems.push(DelimiterProblem::UnterminatedString {
                        quote: c,
                        line: start_line,
                    });
                    break;
                }
                if starts_with(&chars, i, &delim) {
                    i += 3;
                    break;
                }
                match chars[i] {
                    '\n' => line += 1,
                    '\\' => {
                        if chars.get(i + 1) == Some(&'\n') {
                            line += 1;
                        }
                        i += 1;
                    }
                    _ => {}
                }
                i += 1;
            }
            continue;
        }

        if lexical.char_literals && c == '\'' {
            i += char_literal_len(&chars, i).unwrap_or(1);
            continue;
        }

        if lexical.quotes.contains(&c) {
            let multiline = lexical.multiline_quotes.contains(&c);
            let start_line = line;
            i += 1;
            loop {
                if i >= len {
                    if multiline {
                        problems.push(DelimiterProblem::UnterminatedString {
                            quote: c,
                            line: start_line,
                        });
                    }
                    break;
                }
                let d = chars[i];
                if d == '\\' {
                    if chars.get(i + 1) == Some(&'\n') {
                        line += 1;
                    }
                    i += 2;
                    continue;
                }
                if d == c {
                    i += 1;
                    break;
                }
                if d == '\n' {
                    if !multiline {
                        // Single-line literal ran off the line; resume scanning there.
                        break;
                    }
                    line += 1;
                }
                i += 1;
            }
            continue;
        }

        match c {
            '(' | '[' | '{' => stack.push((c, line)),
            ')' | ']' | '}' => match stack.pop() {
                Some((open, _)) if open == opener_for(c) => {}
                Some((open, open_line)) => problems.push(DelimiterProblem::Mismatched {
                    open,
                    open_line,
                    close: c,
                    line,
                }),
                None => problems.push(DelimiterProblem::Unexpected { close: c, line }),
            },
            _ => {}
        }
        i += 1;
    }

    problems.extend(
        stack
            .into_iter()
            .map(|(open, line)| DelimiterProblem::Unclosed { open, line }),
    );
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use genforge_artifact::{Language, StageName};

    fn ts(source: &str) -> Vec<Finding> {
        SyntaxCheck.check(&GeneratedFile::new(StageName::BackendGeneration, "a.ts", source))
    }

    #[test]
    fn balanced_source_is_clean() {
        assert!(ts("function f(a: number[]) { return { a }; }").is_empty());
    }

    #[test]
    fn unclosed_brace_is_reported() {
        let findings = ts("class A {\n  m() {\n  }\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].line, Some(1));
    }

    #[test]
    fn unexpected_closer_is_reported() {
        let findings = ts("f());");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("unexpected closing ')'"));
    }

    #[test]
    fn mismatch_is_reported() {
        let findings = ts("const a = [1, 2);");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("'[' opened on line 1"));
    }

    #[test]
    fn delimiters_in_strings_and_comments_are_ignored() {
        let source = "// {\nconst s = \"(\";\n/* [ */\nconst t = `\n}\n`;\n";
        assert!(ts(source).is_empty());
    }

    #[test]
    fn unterminated_template_literal() {
        let findings = ts("const s = `abc");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("unterminated string"));
    }

    #[test]
    fn python_triple_quotes_are_skipped() {
        let file = GeneratedFile::new(
            StageName::BackendGeneration,
            "a.py",
            "def f():\n    \"\"\"Returns (x\"\"\"\n    return [1]\n",
        );
        assert!(SyntaxCheck.check(&file).is_empty());
    }

    #[test]
    fn rust_lifetimes_do_not_open_strings() {
        let file = GeneratedFile::new(
            StageName::BackendGeneration,
            "lib.rs",
            "fn f<'a>(s: &'a str) -> &'a str { s }",
        );
        assert!(SyntaxCheck.check(&file).is_empty());
    }

    fn rust(source: &str) -> Vec<Finding> {
        SyntaxCheck.check(&GeneratedFile::new(StageName::BackendGeneration, "lib.rs", source))
    }

    #[test]
    fn rust_char_literals_hide_delimiters() {
        assert!(rust("fn open() -> char { '{' }").is_empty());
        assert!(rust("fn close() -> [char; 3] { [')', ']', '}'] }").is_empty());
    }

    #[test]
    fn rust_escaped_char_literals() {
        assert!(rust("fn q() -> [char; 3] { ['\\'', '\\\\', '\\u{7b}'] }").is_empty());
        assert!(rust("fn nl() -> char { '\\n' }").is_empty());
    }

    #[test]
    fn lifetimes_next_to_char_literals() {
        assert!(rust("fn f<'a>(s: &'a str) -> char { let _ = s; '(' }").is_empty());
        let findings = rust("fn f<'a>(s: &'a str) {");
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn go_rune_literals_hide_delimiters() {
        let file = GeneratedFile::new(
            StageName::BackendGeneration,
            "main.go",
            "func open() rune {\n\tif true {\n\t\treturn '('\n\t}\n\treturn '\\''\n}\n",
        );
        assert!(SyntaxCheck.check(&file).is_empty());
    }

    #[test]
    fn markdown_is_not_scanned() {
        let file = GeneratedFile::new(StageName::ArchitectureDesign, "README.md", "a ( b")
            .with_language(Language::Markdown);
        assert!(SyntaxCheck.check(&file).is_empty());
    }
}
