//! Pipeline configuration
//!
//! Loaded from TOML; every section and field is optional.
//!
//! ```toml
//! [cache]
//! enabled = true
//! max_size = 100
//! ttl_secs = 3600
//!
//! [validation]
//! security_checks = false
//!
//! [limits]
//! stage_timeout_secs = 300
//! run_timeout_secs = 1800
//! ```

use genforge_cache::CacheConfig;
use genforge_validation::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Time limits for a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-stage limit; `None` waits indefinitely
    pub stage_timeout_secs: Option<u64>,
    /// Whole-run deadline; `None` waits indefinitely
    pub run_timeout_secs: Option<u64>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            stage_timeout_secs: Some(300),
            run_timeout_secs: Some(1800),
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub cache: CacheConfig,
    pub validation: ValidationConfig,
    pub limits: LimitsConfig,
    /// Sub-second stage limit, takes precedence over `stage_timeout_secs`
    #[serde(skip)]
    stage_timeout_override: Option<Duration>,
    /// Sub-second run limit, takes precedence over `run_timeout_secs`
    #[serde(skip)]
    run_timeout_override: Option<Duration>,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and check TOML text
    ///
    /// # Errors
    /// Returns error on malformed TOML or out-of-range values
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and check a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is invalid
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns error for a zero cache size or TTL, or a zero time limit
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_size == 0 {
            return Err(ConfigError::Invalid("cache.max_size must be at least 1".into()));
        }
        if self.cache.ttl_secs == 0 || self.cache.ttl().is_zero() {
            return Err(ConfigError::Invalid("cache ttl must be positive".into()));
        }
        if self.limits.stage_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("limits.stage_timeout_secs must be at least 1".into()));
        }
        if self.limits.run_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("limits.run_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Set cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, max_size: usize) -> Self {
        self.cache.max_size = max_size;
        self
    }

    /// Set cache entry lifetime
    #[inline]
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = self.cache.with_ttl(ttl);
        self
    }

    /// Disable result caching
    #[inline]
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache.enabled = false;
        self
    }

    /// Set validation gate options
    #[inline]
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    /// Set the per-stage limit
    #[inline]
    #[must_use]
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.limits.stage_timeout_secs = Some(timeout.as_secs().max(1));
        self.stage_timeout_override = Some(timeout);
        self
    }

    /// Set the whole-run deadline
    #[inline]
    #[must_use]
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.limits.run_timeout_secs = Some(timeout.as_secs().max(1));
        self.run_timeout_override = Some(timeout);
        self
    }

    /// Remove both time limits
    #[inline]
    #[must_use]
    pub fn without_time_limits(mut self) -> Self {
        self.limits = LimitsConfig {
            stage_timeout_secs: None,
            run_timeout_secs: None,
        };
        self.stage_timeout_override = None;
        self.run_timeout_override = None;
        self
    }

    /// Effective per-stage limit
    #[must_use]
    pub fn stage_timeout(&self) -> Option<Duration> {
        self.stage_timeout_override
            .or_else(|| self.limits.stage_timeout_secs.map(Duration::from_secs))
    }

    /// Effective whole-run deadline
    #[must_use]
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_override
            .or_else(|| self.limits.run_timeout_secs.map(Duration::from_secs))
    }
}
