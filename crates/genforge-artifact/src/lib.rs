//! genforge Artifact Model
//!
//! Shared vocabulary for the generation pipeline.
//!
//! # Core Concepts
//!
//! - [`GeneratedFile`]: a path, its content, a [`Language`] tag and the producing stage
//! - [`StageName`]: identifiers for every pipeline stage, in default order
//! - [`ContentHash`]: 32-byte Blake3 digest behind cache keys
//! - [`CacheKey`]: deterministic key identifying equivalent generation requests
//!
//! # Example
//!
//! ```rust
//! use genforge_artifact::{GeneratedFile, Language, StageName};
//!
//! let file = GeneratedFile::new(StageName::BackendGeneration, "src/server.ts", "export {};\n");
//! assert_eq!(file.language, Language::TypeScript);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod file;
mod hash;
mod key;
mod stage;

pub use file::{GeneratedFile, Language};
pub use hash::{ContentHash, HashError};
pub use key::CacheKey;
pub use stage::{StageName, UnknownStage};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
