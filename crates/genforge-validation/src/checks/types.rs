//! Type annotation check (statically typed languages only)

use super::FileCheck;
use crate::issue::{Finding, IssueKind, Severity};
use crate::metrics::declaration_counts;
use crate::rules::{line_of, rules_for};
use genforge_artifact::{GeneratedFile, Language};

/// Flags missing annotations, escape-hatch types and untyped functions
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeAnnotationCheck;

impl FileCheck for TypeAnnotationCheck {
    fn check(&self, file: &GeneratedFile) -> Vec<Finding> {
        if !file.language.is_statically_typed() {
            return Vec::new();
        }

        let rules = rules_for(file.language);
        let source = file.content.as_str();
        let mut findings = Vec::new();

        // Local inference is idiomatic in Rust and Go; only TypeScript
        // declarations are expected to carry annotations.
        if file.language == Language::TypeScript {
            let (total, typed) = declaration_counts(source, rules);
            if total > 0 && typed == 0 {
                findings.push(Finding::new(
                    IssueKind::Type,
                    Severity::Warning,
                    format!("no visible type annotations on {total} declarations"),
                ));
            }
        }

        if let Some(escape) = &rules.escape_hatch {
            findings.extend(escape.find_iter(source).map(|m| {
                Finding::new(
                    IssueKind::Type,
                    Severity::Warning,
                    format!("escape-hatch type `{}` bypasses type checking", m.as_str().trim()),
                )
                .at_line(line_of(source, m.start()))
            }));
        }

        if let Some(untyped) = &rules.untyped_function {
            findings.extend(untyped.find_iter(source).map(|m| {
                Finding::new(
                    IssueKind::Type,
                    Severity::Warning,
                    "function is missing a return type annotation",
                )
                .at_line(line_of(source, m.start()))
            }));
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genforge_artifact::StageName;

    fn check(path: &str, source: &str) -> Vec<Finding> {
        TypeAnnotationCheck.check(&GeneratedFile::new(StageName::BackendGeneration, path, source))
    }

    #[test]
    fn annotated_typescript_is_clean() {
        let source = "const a: number = 1;\nfunction f(x: number): number { return x; }\n";
        assert!(check("a.ts", source).is_empty());
    }

    #[test]
    fn untyped_declarations_warn_once() {
        let findings = check("a.ts", "const a = 1;\nlet b = 2;\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("2 declarations"));
    }

    #[test]
    fn any_is_flagged_with_line() {
        let findings = check("a.ts", "const a: number = 1;\nconst b: any = a;\n");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, Some(2));
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn missing_return_type_is_flagged() {
        let findings = check("a.ts", "const a: number = 1;\nfunction f(x: number) {\n  return x;\n}\n");
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("return type"));
    }

    #[test]
    fn javascript_is_skipped() {
        assert!(check("a.js", "const a = 1; function f(x) { return x; }").is_empty());
    }

    #[test]
    fn rust_inference_is_not_flagged() {
        assert!(check("lib.rs", "fn f() { let a = 1; }").is_empty());
    }
}
