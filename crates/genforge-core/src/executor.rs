//! Stage executor seam
//!
//! The orchestrator never produces code itself. Each generation stage is
//! delegated to a [`StageExecutor`] looked up in an [`ExecutorRegistry`].

use crate::execution::{StageRecord, StageStatus};
use crate::request::GenerationRequest;
use genforge_artifact::{GeneratedFile, StageName};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What an executor sees when invoked
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    /// Stage being executed
    pub stage: StageName,
    pub request: &'a GenerationRequest,
    /// Records of the stages that ran before this one, in order
    pub previous: &'a [StageRecord],
    /// Cancelled when the caller gives up on the run
    pub cancellation: &'a CancellationToken,
}

impl<'a> StageContext<'a> {
    /// Files produced by earlier completed stages
    pub fn previous_files(&self) -> impl Iterator<Item = &'a GeneratedFile> {
        self.previous
            .iter()
            .filter(|r| r.status == StageStatus::Completed)
            .flat_map(|r| r.files.iter())
    }

    /// Output of one earlier stage, if it completed
    #[must_use]
    pub fn output_of(&self, stage: StageName) -> Option<&'a [GeneratedFile]> {
        self.previous
            .iter()
            .find(|r| r.stage == stage && r.status == StageStatus::Completed)
            .map(|r| r.files.as_slice())
    }

    /// Check if the run was cancelled
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Produces the files for one stage
///
/// Errors are rendered with their full context chain into the stage record.
#[async_trait::async_trait]
pub trait StageExecutor: Send + Sync {
    /// Run the stage
    async fn execute(&self, ctx: StageContext<'_>) -> anyhow::Result<Vec<GeneratedFile>>;
}

/// Stage executors by stage name
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<StageName, Arc<dyn StageExecutor>>,
}

impl ExecutorRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor, replacing any previous one for `stage`
    pub fn register(&mut self, stage: StageName, executor: Arc<dyn StageExecutor>) {
        self.executors.insert(stage, executor);
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with(mut self, stage: StageName, executor: Arc<dyn StageExecutor>) -> Self {
        self.register(stage, executor);
        self
    }

    /// Executor for a stage
    #[inline]
    #[must_use]
    pub fn get(&self, stage: StageName) -> Option<Arc<dyn StageExecutor>> {
        self.executors.get(&stage).cloned()
    }

    /// Check if a stage has an executor
    #[inline]
    #[must_use]
    pub fn contains(&self, stage: StageName) -> bool {
        self.executors.contains_key(&stage)
    }

    /// Registered stages in declared order
    #[must_use]
    pub fn stages(&self) -> Vec<StageName> {
        let mut stages: Vec<_> = self.executors.keys().copied().collect();
        stages.sort();
        stages
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("stages", &self.stages())
            .finish()
    }
}
