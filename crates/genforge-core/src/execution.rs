//! Run records
//!
//! A [`PipelineExecution`] is created once per request and owned by the
//! orchestrator for the whole run. It holds one [`StageRecord`] per stage
//! invocation, in invocation order.
//!
//! Both levels are small state machines:
//!
//! - run: `Pending -> Running -> {Completed | Failed | Cancelled}`
//! - stage: `Pending -> Running -> {Completed | Failed}`, or
//!   `Pending -> Skipped`
//!
//! Terminal states are never left.

use crate::plan::Requirement;
use chrono::{DateTime, Utc};
use genforge_artifact::{GeneratedFile, StageName};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Message recorded when a failure carried no text of its own
const UNSPECIFIED_FAILURE: &str = "stage failed without an error message";

/// Status of a whole run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    /// States reachable in one step
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [RunStatus] {
        match self {
            Self::Pending => &[Self::Running],
            Self::Running => &[Self::Completed, Self::Failed, Self::Cancelled],
            Self::Completed | Self::Failed | Self::Cancelled => &[],
        }
    }

    /// Check if `to` is reachable in one step
    #[inline]
    #[must_use]
    pub fn can_transition_to(self, to: RunStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Check if the run has ended
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

/// Status of one stage invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl StageStatus {
    /// States reachable in one step
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [StageStatus] {
        match self {
            Self::Pending => &[Self::Running, Self::Skipped],
            Self::Running => &[Self::Completed, Self::Failed],
            Self::Completed | Self::Failed | Self::Skipped => &[],
        }
    }

    /// Check if `to` is reachable in one step
    #[inline]
    #[must_use]
    pub fn can_transition_to(self, to: StageStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Check if the stage has ended
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

/// One stage invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageRecord {
    pub stage: StageName,
    pub requirement: Requirement,
    pub status: StageStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    /// Output of a completed stage
    pub files: Vec<GeneratedFile>,
    /// Set exactly when `status` is `Failed`; never empty
    pub error: Option<String>,
    /// Why the stage did not run
    pub skip_reason: Option<String>,
    /// Never incremented by the orchestrator; callers that retry record it here
    pub retry_count: u32,
}

impl StageRecord {
    /// Create a record that has not started
    #[must_use]
    pub fn pending(stage: StageName, requirement: Requirement) -> Self {
        Self {
            stage,
            requirement,
            status: StageStatus::Pending,
            started_at: None,
            finished_at: None,
            duration_ms: None,
            files: Vec::new(),
            error: None,
            skip_reason: None,
            retry_count: 0,
        }
    }

    fn transition(&mut self, to: StageStatus) -> bool {
        let allowed = self.status.can_transition_to(to);
        debug_assert!(allowed, "illegal stage transition {:?} -> {to:?}", self.status);
        if allowed {
            self.status = to;
        }
        allowed
    }

    fn stamp_finish(&mut self) {
        let now = Utc::now();
        self.finished_at = Some(now);
        self.duration_ms = self
            .started_at
            .map(|start| u64::try_from((now - start).num_milliseconds()).unwrap_or(0));
    }

    pub(crate) fn start(&mut self) {
        if self.transition(StageStatus::Running) {
            self.started_at = Some(Utc::now());
        }
    }

    pub(crate) fn complete(&mut self, files: Vec<GeneratedFile>) {
        if self.transition(StageStatus::Completed) {
            self.files = files;
            self.stamp_finish();
        }
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        if self.transition(StageStatus::Failed) {
            let message = message.into();
            self.error = Some(if message.trim().is_empty() {
                UNSPECIFIED_FAILURE.to_string()
            } else {
                message
            });
            self.stamp_finish();
        }
    }

    pub(crate) fn skip(&mut self, reason: impl Into<String>) {
        if self.transition(StageStatus::Skipped) {
            self.skip_reason = Some(reason.into());
        }
    }
}

/// Mutable record of one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineExecution {
    pub generation_id: Ulid,
    pub status: RunStatus,
    pub stages: Vec<StageRecord>,
    pub completed_count: usize,
    pub failed_count: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl PipelineExecution {
    /// Create a pending run
    #[must_use]
    pub fn new(generation_id: Ulid) -> Self {
        Self {
            generation_id,
            status: RunStatus::Pending,
            stages: Vec::new(),
            completed_count: 0,
            failed_count: 0,
            started_at: None,
            finished_at: None,
        }
    }

    fn transition(&mut self, to: RunStatus) -> bool {
        let allowed = self.status.can_transition_to(to);
        debug_assert!(allowed, "illegal run transition {:?} -> {to:?}", self.status);
        if allowed {
            self.status = to;
        }
        allowed
    }

    pub(crate) fn start(&mut self) {
        if self.transition(RunStatus::Running) {
            self.started_at = Some(Utc::now());
        }
    }

    pub(crate) fn finish(&mut self, status: RunStatus) {
        if self.transition(status) {
            self.finished_at = Some(Utc::now());
        }
    }

    /// Append a running record for `stage`; returns its index
    pub(crate) fn begin_stage(&mut self, stage: StageName, requirement: Requirement) -> usize {
        let mut record = StageRecord::pending(stage, requirement);
        record.start();
        self.stages.push(record);
        self.stages.len() - 1
    }

    pub(crate) fn complete_stage(&mut self, index: usize, files: Vec<GeneratedFile>) {
        if let Some(record) = self.stages.get_mut(index) {
            record.complete(files);
            self.completed_count += 1;
        }
    }

    pub(crate) fn fail_stage(&mut self, index: usize, message: impl Into<String>) {
        if let Some(record) = self.stages.get_mut(index) {
            record.fail(message);
            self.failed_count += 1;
        }
    }

    pub(crate) fn skip_stage(
        &mut self,
        stage: StageName,
        requirement: Requirement,
        reason: impl Into<String>,
    ) {
        let mut record = StageRecord::pending(stage, requirement);
        record.skip(reason);
        self.stages.push(record);
    }

    /// Record for a stage, if it was invoked or skipped
    #[must_use]
    pub fn record(&self, stage: StageName) -> Option<&StageRecord> {
        self.stages.iter().find(|r| r.stage == stage)
    }

    /// Check if a stage ran to completion
    #[must_use]
    pub fn stage_completed(&self, stage: StageName) -> bool {
        self.record(stage)
            .is_some_and(|r| r.status == StageStatus::Completed)
    }

    /// Files produced so far, in stage order
    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.stages.iter().flat_map(|r| r.files.iter())
    }

    /// Names of stages that were invoked, in order
    #[must_use]
    pub fn executed_stages(&self) -> Vec<StageName> {
        self.stages
            .iter()
            .filter(|r| r.status != StageStatus::Skipped)
            .map(|r| r.stage)
            .collect()
    }

    /// Wall-clock duration of a finished run in milliseconds
    #[must_use]
    pub fn duration_ms(&self) -> Option<u64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => {
                Some(u64::try_from((end - start).num_milliseconds()).unwrap_or(0))
            }
            _ => None,
        }
    }
}
