//! Cache sizing and expiry configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of cached results
pub const DEFAULT_MAX_SIZE: usize = 100;
/// Default entry lifetime: one hour
pub const DEFAULT_TTL_SECS: u64 = 60 * 60;

/// Result cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Consult and populate the cache at all
    pub enabled: bool,
    /// Maximum number of entries before the oldest is evicted
    pub max_size: usize,
    /// Entry lifetime in seconds
    pub ttl_secs: u64,
    /// Sub-second lifetime, takes precedence over `ttl_secs`
    #[serde(skip)]
    ttl_override: Option<Duration>,
}

impl CacheConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set capacity
    #[inline]
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set entry lifetime
    #[inline]
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs().max(1);
        self.ttl_override = Some(ttl);
        self
    }

    /// Disable caching
    #[inline]
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Entry lifetime
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl_override
            .unwrap_or_else(|| Duration::from_secs(self.ttl_secs))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size: DEFAULT_MAX_SIZE,
            ttl_secs: DEFAULT_TTL_SECS,
            ttl_override: None,
        }
    }
}
