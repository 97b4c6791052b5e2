//! genforge Core
//!
//! The generation pipeline orchestrator and the data it works on.
//!
//! # Architecture
//!
//! ```text
//! GenerationRequest
//!        |
//!        v
//!  Orchestrator --get--> ResultStore (hit: return cached result)
//!        |
//!        v
//!  StagePlan::resolve --> [architecture, database?, backend?, api?, ui?,
//!        |                 tests?, optimization?, quality?, validation]
//!        v
//!  StageExecutor per stage --> PipelineExecution (StageRecords)
//!        |
//!        v
//!  path-collision check --> ValidationGate --> GenerationResult --set--> ResultStore
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use genforge_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo(architect: Arc<dyn StageExecutor>) -> Result<(), GenerationError> {
//! let executors = ExecutorRegistry::new().with(StageName::ArchitectureDesign, architect);
//! let orchestrator = Orchestrator::new(PipelineConfig::default(), executors);
//!
//! let request = GenerationRequest::new("p1", "A todo list service");
//! let result = orchestrator.generate(&request).await?;
//! println!("{} files, score {}", result.metrics.total_files, result.quality_report.score);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod execution;
pub mod executor;
pub mod orchestrator;
pub mod plan;
pub mod provider;
pub mod request;
pub mod result;

pub use config::{ConfigError, LimitsConfig, PipelineConfig};
pub use error::GenerationError;
pub use execution::{PipelineExecution, RunStatus, StageRecord, StageStatus};
pub use executor::{ExecutorRegistry, StageContext, StageExecutor};
pub use orchestrator::{Orchestrator, SharedResult, SharedStore};
pub use plan::{PlanError, PlannedStage, Requirement, StageDefinition, StagePlan};
pub use provider::{extract_files, AiProvider, CompletionOptions, PromptStageExecutor};
pub use request::{DatabaseRequirements, FeatureFlags, GenerationRequest, ProjectKind, ProjectRequirements};
pub use result::{GenerationMetadata, GenerationMetrics, GenerationResult};

pub use genforge_artifact::{CacheKey, GeneratedFile, Language, StageName};
pub use tokio_util::sync::CancellationToken;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::GenerationError;
    pub use crate::execution::{PipelineExecution, RunStatus, StageStatus};
    pub use crate::executor::{ExecutorRegistry, StageContext, StageExecutor};
    pub use crate::orchestrator::Orchestrator;
    pub use crate::plan::{Requirement, StagePlan};
    pub use crate::request::{FeatureFlags, GenerationRequest, ProjectKind, ProjectRequirements};
    pub use crate::result::GenerationResult;
    pub use genforge_artifact::{GeneratedFile, StageName};
    pub use tokio_util::sync::CancellationToken;
}
