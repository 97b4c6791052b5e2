//! Generation error taxonomy
//!
//! Errors raised before a run starts carry nothing else. Errors that end a
//! run carry the partial [`PipelineExecution`] so callers can see which
//! stages completed, which failed, and when.

use crate::execution::PipelineExecution;
use crate::plan::PlanError;
use genforge_artifact::StageName;
use genforge_validation::ValidationError;
use std::time::Duration;

/// Failure of a generation request
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Request cannot be processed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A required stage has no executor
    #[error("no executor registered for required stage {0}")]
    MissingExecutor(StageName),

    /// Stage plan is inconsistent
    #[error("invalid stage plan: {0}")]
    Plan(#[from] PlanError),

    /// Required stage failed
    #[error("required stage {stage} failed: {message}")]
    Stage {
        stage: StageName,
        message: String,
        execution: Box<PipelineExecution>,
    },

    /// Two files share a path
    #[error("path {path} produced by both {first} and {second}")]
    Conflict {
        path: String,
        first: StageName,
        second: StageName,
        execution: Box<PipelineExecution>,
    },

    /// Validation gate rejected its input
    #[error("validation gate failed: {source}")]
    Validation {
        source: ValidationError,
        execution: Box<PipelineExecution>,
    },

    /// Caller cancelled the run
    #[error("generation cancelled")]
    Cancelled { execution: Box<PipelineExecution> },

    /// Run did not finish within its deadline
    #[error("generation exceeded its deadline of {limit:?}")]
    DeadlineExceeded {
        limit: Duration,
        execution: Box<PipelineExecution>,
    },
}

impl GenerationError {
    /// Partial run record, for errors raised after the run started
    #[must_use]
    pub fn execution(&self) -> Option<&PipelineExecution> {
        match self {
            Self::InvalidRequest(_) | Self::MissingExecutor(_) | Self::Plan(_) => None,
            Self::Stage { execution, .. }
            | Self::Conflict { execution, .. }
            | Self::Validation { execution, .. }
            | Self::Cancelled { execution }
            | Self::DeadlineExceeded { execution, .. } => Some(&**execution),
        }
    }

    /// Stage the failure is attributed to
    #[must_use]
    pub fn stage(&self) -> Option<StageName> {
        match self {
            Self::MissingExecutor(stage) | Self::Stage { stage, .. } => Some(*stage),
            Self::Conflict { second, .. } => Some(*second),
            Self::Validation { .. } => Some(StageName::Validation),
            _ => None,
        }
    }

    /// Check if resubmitting the same request might succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Stage { .. } | Self::Cancelled { .. } | Self::DeadlineExceeded { .. }
        )
    }
}
