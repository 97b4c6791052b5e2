//! genforge Result Cache
//!
//! Keeps completed generation results so identical requests are not
//! recomputed within the TTL window.
//!
//! - [`ResultCache`]: bounded, insertion-ordered (FIFO, not LRU), lazy TTL
//! - [`ResultStore`]: async seam the orchestrator talks to; other backends
//!   plug in here and report failures as [`CacheError`]
//!
//! # Example
//!
//! ```rust
//! use genforge_artifact::CacheKey;
//! use genforge_cache::ResultCache;
//! use std::time::Duration;
//!
//! let cache = ResultCache::new(100, Duration::from_secs(3600));
//! let key = CacheKey::derive("project-1").unwrap();
//! cache.set(key, "result");
//! assert_eq!(cache.get(&key), Some("result"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
mod fifo;
mod store;

pub use config::{CacheConfig, DEFAULT_MAX_SIZE, DEFAULT_TTL_SECS};
pub use error::CacheError;
pub use fifo::{CacheStats, ResultCache};
pub use store::ResultStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
