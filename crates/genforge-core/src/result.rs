//! Generation results
//!
//! A [`GenerationResult`] is immutable once built and is the only value the
//! result cache stores.

use crate::execution::PipelineExecution;
use chrono::{DateTime, Utc};
use genforge_artifact::{CacheKey, GeneratedFile, StageName};
use genforge_validation::ValidationReport;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Aggregate metrics of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetrics {
    pub total_files: usize,
    /// Sum of per-file line counts
    pub total_lines: usize,
    /// Wall-clock run duration in milliseconds
    pub generation_time: u64,
    /// Batch complexity from the validation gate
    pub complexity_score: usize,
    /// Validation score, present only when quality analysis completed
    pub quality_score: Option<u8>,
}

/// Provenance of a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub created_at: DateTime<Utc>,
    /// Stages invoked, in order
    pub stages_executed: Vec<StageName>,
    pub cache_key: CacheKey,
}

/// Final output of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub generation_id: Ulid,
    pub project_id: String,
    pub files: Vec<GeneratedFile>,
    pub metrics: GenerationMetrics,
    pub quality_report: ValidationReport,
    pub execution: PipelineExecution,
    pub metadata: GenerationMetadata,
}

impl GenerationResult {
    /// Validation verdict
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.quality_report.passed
    }

    /// File at `path`
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Files produced by one stage
    pub fn files_from(&self, stage: StageName) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter().filter(move |f| f.stage == stage)
    }
}
