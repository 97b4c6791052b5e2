//! Per-language pattern tables
//!
//! Every check and metric reads the patterns for a file's language from
//! here. A language without a pattern simply skips that part of the analysis.

use genforge_artifact::Language;
use once_cell::sync::Lazy;
use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static validation pattern compiles")
}

fn compile_opt(pattern: &str) -> Option<Regex> {
    Some(compile(pattern))
}

/// Lexical shape used by the delimiter scanner
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lexical {
    pub(crate) line_comment: Option<&'static str>,
    pub(crate) block_comment: bool,
    pub(crate) quotes: &'static [char],
    /// Quotes that may span lines (template literals, raw strings)
    pub(crate) multiline_quotes: &'static [char],
    pub(crate) triple_quotes: bool,
    /// `'x'` is a char/rune literal; an unclosed `'` (a Rust lifetime) is a plain token
    pub(crate) char_literals: bool,
}

/// Variable declaration pattern
///
/// A match counts as a declaration; it is typed when `typed_group` matched.
#[derive(Debug)]
pub(crate) struct DeclarationRule {
    pub(crate) pattern: Regex,
    pub(crate) typed_group: Option<usize>,
}

#[derive(Debug)]
pub(crate) struct LanguageRules {
    pub(crate) lexical: Option<Lexical>,
    pub(crate) declarations: Vec<DeclarationRule>,
    pub(crate) escape_hatch: Option<Regex>,
    pub(crate) untyped_function: Option<Regex>,
    pub(crate) relative_import: Option<Regex>,
    pub(crate) export: Option<Regex>,
    pub(crate) type_export: Option<Regex>,
    pub(crate) doc_comment: Option<Regex>,
    pub(crate) debug_leftover: Option<Regex>,
}

impl LanguageRules {
    fn empty() -> Self {
        Self {
            lexical: None,
            declarations: Vec::new(),
            escape_hatch: None,
            untyped_function: None,
            relative_import: None,
            export: None,
            type_export: None,
            doc_comment: None,
            debug_leftover: None,
        }
    }
}

const C_LIKE: Lexical = Lexical {
    line_comment: Some("//"),
    block_comment: true,
    quotes: &['"', '\''],
    multiline_quotes: &[],
    triple_quotes: false,
    char_literals: false,
};

/// Decision points counted by the complexity metric.
///
/// `else if` is counted once, through its `if`. A ternary needs a single
/// `:` later on the same line, which leaves out `?.`, `??`, optional
/// members and Rust's `?` operator.
pub(crate) static DECISION_POINTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bif\b",
        r"\bfor\b",
        r"\bwhile\b",
        r"\bcase\b",
        r"\bcatch\b",
        r"&&",
        r"\|\|",
        r"(?m)\?[^?.:;,\n][^:;,\n]*:(?:[^:]|$)",
    ]
    .into_iter()
    .map(compile)
    .collect()
});

pub(crate) static SECURITY_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (compile(r"\beval\s*\("), "use of eval()"),
        (compile(r"\bnew\s+Function\s*\("), "dynamic code construction with new Function()"),
        (compile(r"\.innerHTML\s*="), "direct innerHTML assignment"),
        (
            compile(r#"(?i)\b(password|passwd|secret|api[_-]?key|access[_-]?token)\b\s*[:=]\s*["'][^"']{4,}["']"#),
            "hard-coded credential",
        ),
    ]
});

static TYPESCRIPT: Lazy<LanguageRules> = Lazy::new(|| LanguageRules {
    lexical: Some(Lexical {
        multiline_quotes: &['`'],
        quotes: &['"', '\'', '`'],
        ..C_LIKE
    }),
    declarations: vec![DeclarationRule {
        pattern: compile(r"\b(?:const|let|var)\s+[A-Za-z_$][\w$]*\s*(:)?"),
        typed_group: Some(1),
    }],
    escape_hatch: compile_opt(r":\s*any\b|\bas\s+any\b|<any>"),
    untyped_function: compile_opt(
        r"\bfunction\b\s*\*?\s*[A-Za-z_$][\w$]*\s*(?:<[^>]*>)?\s*\([^)]*\)\s*\{",
    ),
    relative_import: compile_opt(r#"(?:\bfrom\s+|\brequire\s*\(\s*|\bimport\s+)["']\.{1,2}/"#),
    export: compile_opt(
        r"(?m)^\s*export\s+(?:default\s+)?(?:declare\s+)?(?:abstract\s+)?(?:async\s+)?(?:function|class|const|let|var|interface|type|enum)\b",
    ),
    type_export: compile_opt(r"(?m)^\s*export\s+(?:declare\s+)?(?:interface|type)\b"),
    doc_comment: compile_opt(r"/\*\*"),
    debug_leftover: compile_opt(r"\bconsole\.(?:log|debug)\s*\(|\bdebugger\b"),
});

static JAVASCRIPT: Lazy<LanguageRules> = Lazy::new(|| LanguageRules {
    lexical: TYPESCRIPT.lexical,
    relative_import: compile_opt(r#"(?:\bfrom\s+|\brequire\s*\(\s*|\bimport\s+)["']\.{1,2}/"#),
    export: compile_opt(
        r"(?m)^\s*(?:export\s+(?:default\s+)?(?:async\s+)?(?:function|class|const|let|var)\b|module\.exports\b)",
    ),
    doc_comment: compile_opt(r"/\*\*"),
    debug_leftover: compile_opt(r"\bconsole\.(?:log|debug)\s*\(|\bdebugger\b"),
    ..LanguageRules::empty()
});

static RUST: Lazy<LanguageRules> = Lazy::new(|| LanguageRules {
    lexical: Some(Lexical {
        quotes: &['"'],
        char_literals: true,
        ..C_LIKE
    }),
    declarations: vec![DeclarationRule {
        pattern: compile(r"\blet\s+(?:mut\s+)?[A-Za-z_]\w*\s*(:)?"),
        typed_group: Some(1),
    }],
    escape_hatch: compile_opt(r"\bdyn\s+(?:std::any::)?Any\b"),
    relative_import: compile_opt(r"(?m)^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+(?:crate|super|self)::"),
    export: compile_opt(
        r"(?m)^\s*pub\s+(?:async\s+)?(?:fn|struct|enum|trait|type|const|static|mod)\b",
    ),
    type_export: compile_opt(r"(?m)^\s*pub\s+(?:struct|enum|trait|type)\b"),
    doc_comment: compile_opt(r"///|//!"),
    debug_leftover: compile_opt(r"\bdbg!\s*\("),
    ..LanguageRules::empty()
});

static GO: Lazy<LanguageRules> = Lazy::new(|| LanguageRules {
    lexical: Some(Lexical {
        quotes: &['"', '`'],
        multiline_quotes: &['`'],
        char_literals: true,
        ..C_LIKE
    }),
    declarations: vec![
        DeclarationRule {
            pattern: compile(r"\bvar\s+[A-Za-z_]\w*(\s+[A-Za-z_*\[][\w.*\[\]]*)?"),
            typed_group: Some(1),
        },
        DeclarationRule {
            pattern: compile(r"\b[A-Za-z_]\w*\s*:="),
            typed_group: None,
        },
    ],
    escape_hatch: compile_opt(r"interface\s*\{\s*\}|\bany\b"),
    export: compile_opt(r"(?m)^(?:func\s+(?:\([^)]*\)\s*)?|type\s+|var\s+|const\s+)[A-Z]"),
    type_export: compile_opt(r"(?m)^type\s+[A-Z]"),
    doc_comment: compile_opt(r"(?m)^//\s*\S"),
    ..LanguageRules::empty()
});

static JAVA: Lazy<LanguageRules> = Lazy::new(|| LanguageRules {
    lexical: Some(C_LIKE),
    export: compile_opt(r"\bpublic\s+(?:static\s+)?(?:final\s+)?(?:abstract\s+)?(?:class|interface|enum|record|[\w<>\[\]]+\s+\w+\s*\()"),
    type_export: compile_opt(r"\bpublic\s+(?:final\s+)?(?:abstract\s+)?(?:class|interface|enum|record)\b"),
    doc_comment: compile_opt(r"/\*\*"),
    debug_leftover: compile_opt(r"System\.out\.print"),
    ..LanguageRules::empty()
});

static PYTHON: Lazy<LanguageRules> = Lazy::new(|| LanguageRules {
    lexical: Some(Lexical {
        line_comment: Some("#"),
        block_comment: false,
        quotes: &['"', '\''],
        multiline_quotes: &[],
        triple_quotes: true,
        char_literals: false,
    }),
    relative_import: compile_opt(r"(?m)^\s*from\s+\."),
    export: compile_opt(r"(?m)^(?:async\s+)?(?:def|class)\s+[A-Za-z]"),
    doc_comment: compile_opt(r#""""|'''"#),
    debug_leftover: compile_opt(r"\bbreakpoint\s*\(|\bpdb\.set_trace\s*\("),
    ..LanguageRules::empty()
});

static CSS: Lazy<LanguageRules> = Lazy::new(|| LanguageRules {
    lexical: Some(Lexical {
        line_comment: None,
        ..C_LIKE
    }),
    ..LanguageRules::empty()
});

static JSON: Lazy<LanguageRules> = Lazy::new(|| LanguageRules {
    lexical: Some(Lexical {
        line_comment: None,
        block_comment: false,
        quotes: &['"'],
        multiline_quotes: &[],
        triple_quotes: false,
        char_literals: false,
    }),
    ..LanguageRules::empty()
});

static NONE: Lazy<LanguageRules> = Lazy::new(LanguageRules::empty);

/// Pattern table for a language
pub(crate) fn rules_for(language: Language) -> &'static LanguageRules {
    match language {
        Language::TypeScript => &*TYPESCRIPT,
        Language::JavaScript => &*JAVASCRIPT,
        Language::Rust => &*RUST,
        Language::Go => &*GO,
        Language::Java => &*JAVA,
        Language::Python => &*PYTHON,
        Language::Css => &*CSS,
        Language::Json => &*JSON,
        Language::Sql
        | Language::Yaml
        | Language::Markdown
        | Language::Html
        | Language::Plaintext => &*NONE,
    }
}

/// 1-based line number of a byte offset
pub(crate) fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tables_compile() {
        for lang in [
            Language::TypeScript,
            Language::JavaScript,
            Language::Rust,
            Language::Go,
            Language::Java,
            Language::Python,
            Language::Css,
            Language::Json,
            Language::Markdown,
        ] {
            let _ = rules_for(lang);
        }
        assert_eq!(DECISION_POINTS.len(), 8);
        assert_eq!(SECURITY_PATTERNS.len(), 4);
    }

    #[test]
    fn ternary_is_not_optional_property() {
        let ternary = &DECISION_POINTS[7];
        assert!(ternary.is_match("const a = ok ? 1 : 2;"));
        assert!(!ternary.is_match("interface A { b?: string }"));
        assert!(!ternary.is_match("const c = a ?? b;"));
        assert!(ternary.is_match("const d = a?b:c;"));
        assert!(!ternary.is_match("let v = parse(text)?;"));
        assert!(!ternary.is_match("Ok(v) => Ok(load(v)? + Config::base()),"));
        assert!(!ternary.is_match("function f(x?: number) {}"));
        assert!(!ternary.is_match("const n = user?.name;"));
    }

    #[test]
    fn line_of_offsets() {
        let text = "a\nb\nc";
        assert_eq!(line_of(text, 0), 1);
        assert_eq!(line_of(text, 2), 2);
        assert_eq!(line_of(text, 4), 3);
    }
}
