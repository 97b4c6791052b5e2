//! Generated files and their source languages

use crate::stage::StageName;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Language tag of a generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// TypeScript
    TypeScript,
    /// JavaScript
    JavaScript,
    /// Rust
    Rust,
    /// Python
    Python,
    /// Go
    Go,
    /// Java
    Java,
    /// SQL
    Sql,
    /// JSON
    Json,
    /// YAML
    Yaml,
    /// Markdown
    Markdown,
    /// HTML
    Html,
    /// CSS
    Css,
    /// Anything else
    #[default]
    Plaintext,
}

impl Language {
    /// Get file extensions for this language
    #[inline]
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::TypeScript => &["ts", "tsx", "mts", "cts"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::Rust => &["rs"],
            Language::Python => &["py"],
            Language::Go => &["go"],
            Language::Java => &["java"],
            Language::Sql => &["sql"],
            Language::Json => &["json"],
            Language::Yaml => &["yaml", "yml"],
            Language::Markdown => &["md"],
            Language::Html => &["html", "htm"],
            Language::Css => &["css", "scss"],
            Language::Plaintext => &[],
        }
    }

    /// Get human-readable name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Rust => "rust",
            Language::Python => "python",
            Language::Go => "go",
            Language::Java => "java",
            Language::Sql => "sql",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Markdown => "markdown",
            Language::Html => "html",
            Language::Css => "css",
            Language::Plaintext => "plaintext",
        }
    }

    /// Look up a language by extension (without the dot)
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.to_ascii_lowercase();
        ALL_LANGUAGES
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
            .unwrap_or_default()
    }

    /// Infer language from a file path
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// Look up a language by name or common alias ("ts", "rust", ...)
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        ALL_LANGUAGES
            .into_iter()
            .find(|lang| lang.name() == name)
            .unwrap_or_else(|| Self::from_extension(&name))
    }

    /// Languages with static type annotations
    #[inline]
    #[must_use]
    pub fn is_statically_typed(&self) -> bool {
        matches!(
            self,
            Language::TypeScript | Language::Rust | Language::Go | Language::Java
        )
    }
}

const ALL_LANGUAGES: [Language; 13] = [
    Language::TypeScript,
    Language::JavaScript,
    Language::Rust,
    Language::Python,
    Language::Go,
    Language::Java,
    Language::Sql,
    Language::Json,
    Language::Yaml,
    Language::Markdown,
    Language::Html,
    Language::Css,
    Language::Plaintext,
];

/// A file produced by a generation stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    /// Project-relative path
    pub path: String,
    /// File content
    pub content: String,
    /// Language tag
    pub language: Language,
    /// Stage that produced the file
    pub stage: StageName,
}

impl GeneratedFile {
    /// Create a file, inferring the language from the path
    #[must_use]
    pub fn new(stage: StageName, path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            language: Language::from_path(&path),
            path,
            content: content.into(),
            stage,
        }
    }

    /// Override the language tag
    #[inline]
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Number of lines in the content
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}
