//! Generation requests
//!
//! A request is immutable once submitted. Its project identity and feature
//! flags decide which stages run and which cache entry it maps to.

use genforge_artifact::{CacheKey, HashError};
use serde::{Deserialize, Serialize};

/// Broad project shape, expanded into concrete [`ProjectRequirements`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectKind {
    /// Server only
    Backend,
    /// Server exposing an API surface
    Api,
    /// Client only
    Frontend,
    /// Server, API and client
    Fullstack,
    /// Reusable package with no server or UI
    Library,
}

/// Database the project needs
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseRequirements {
    /// Engine hint, e.g. `postgres`
    #[serde(default)]
    pub engine: Option<String>,
    /// Entities the schema must model
    #[serde(default)]
    pub entities: Vec<String>,
}

/// What the generated project has to contain
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectRequirements {
    /// `None` means no database stage
    pub database: Option<DatabaseRequirements>,
    pub backend: bool,
    pub api: bool,
    pub frontend: bool,
}

impl ProjectRequirements {
    /// Requirements implied by a project kind (no database)
    #[must_use]
    pub fn for_kind(kind: ProjectKind) -> Self {
        let (backend, api, frontend) = match kind {
            ProjectKind::Backend => (true, false, false),
            ProjectKind::Api => (true, true, false),
            ProjectKind::Frontend => (false, false, true),
            ProjectKind::Fullstack => (true, true, true),
            ProjectKind::Library => (false, false, false),
        };
        Self {
            database: None,
            backend,
            api,
            frontend,
        }
    }

    /// Add a database requirement
    #[inline]
    #[must_use]
    pub fn with_database(mut self, database: DatabaseRequirements) -> Self {
        self.database = Some(database);
        self
    }
}

/// Optional pipeline features requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    pub include_tests: bool,
    pub optimize: bool,
    pub analyze_quality: bool,
    /// Ignore any cached result; the fresh result is still stored
    pub skip_cache: bool,
}

/// Input to one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub project_id: String,
    pub prompt: String,
    /// Target language hint, e.g. `typescript`
    #[serde(default)]
    pub language: Option<String>,
    /// Target framework hint, e.g. `express`
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub requirements: ProjectRequirements,
    #[serde(default)]
    pub features: FeatureFlags,
}

/// Fields hashed into the cache key
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyMaterial<'a> {
    project_id: &'a str,
    language: Option<&'a str>,
    framework: Option<&'a str>,
    requirements: &'a ProjectRequirements,
    include_tests: bool,
    optimize: bool,
    analyze_quality: bool,
}

impl GenerationRequest {
    /// Create request with no requirements and no optional features
    #[must_use]
    pub fn new(project_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            prompt: prompt.into(),
            language: None,
            framework: None,
            requirements: ProjectRequirements::default(),
            features: FeatureFlags::default(),
        }
    }

    /// Set project requirements
    #[inline]
    #[must_use]
    pub fn with_requirements(mut self, requirements: ProjectRequirements) -> Self {
        self.requirements = requirements;
        self
    }

    /// Set feature flags
    #[inline]
    #[must_use]
    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Set target language hint
    #[inline]
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set target framework hint
    #[inline]
    #[must_use]
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = Some(framework.into());
        self
    }

    /// Reject requests the pipeline cannot start from
    ///
    /// # Errors
    /// Returns the reason when the project id or prompt is blank
    pub fn validate(&self) -> Result<(), String> {
        if self.project_id.trim().is_empty() {
            return Err("project id must not be empty".to_string());
        }
        if self.prompt.trim().is_empty() {
            return Err("prompt must not be empty".to_string());
        }
        Ok(())
    }

    /// Cache key over project identity and feature flags
    ///
    /// The prompt text and `skip_cache` are not part of the key.
    ///
    /// # Errors
    /// Returns error if the key material cannot be serialized
    pub fn cache_key(&self) -> Result<CacheKey, HashError> {
        CacheKey::derive(&KeyMaterial {
            project_id: &self.project_id,
            language: self.language.as_deref(),
            framework: self.framework.as_deref(),
            requirements: &self.requirements,
            include_tests: self.features.include_tests,
            optimize: self.features.optimize,
            analyze_quality: self.features.analyze_quality,
        })
    }
}
