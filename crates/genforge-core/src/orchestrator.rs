//! Pipeline orchestrator
//!
//! Runs the stages of one request in plan order, feeds every produced file
//! to the validation gate and caches the result.
//!
//! # Workflow
//! 1. Derive the cache key; on a hit return the cached result untouched
//! 2. Resolve the stage plan for the request
//! 3. Invoke each stage; a required failure aborts, an optional one is
//!    recorded and the run continues
//! 4. Reject duplicate paths across all produced files
//! 5. Validate the file set and merge the verdict into the result
//! 6. Aggregate metrics, store the result, return it
//!
//! Stages run strictly one after another. Concurrency exists only across
//! independent requests, which share nothing but the result store.

use crate::config::PipelineConfig;
use crate::error::GenerationError;
use crate::execution::{PipelineExecution, RunStatus};
use crate::executor::{ExecutorRegistry, StageContext, StageExecutor};
use crate::plan::{PlannedStage, PlanError, Requirement, StagePlan};
use crate::request::GenerationRequest;
use crate::result::{GenerationMetadata, GenerationMetrics, GenerationResult};
use chrono::Utc;
use genforge_artifact::{CacheKey, GeneratedFile, StageName};
use genforge_cache::{ResultCache, ResultStore};
use genforge_validation::ValidationGate;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use ulid::Ulid;

/// Result shared between the cache and callers
pub type SharedResult = Arc<GenerationResult>;

/// Result store used by the orchestrator
pub type SharedStore = Arc<dyn ResultStore<SharedResult>>;

/// Why a run stopped early
#[derive(Debug, Clone, Copy)]
enum Interrupt {
    Cancelled,
    Deadline(Duration),
}

impl Interrupt {
    fn message(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Deadline(_) => "run deadline exceeded",
        }
    }
}

enum StageOutcome {
    Completed(Vec<GeneratedFile>),
    Failed(String),
    Interrupted(Interrupt),
}

/// Sequences stage executors for generation requests
pub struct Orchestrator {
    config: PipelineConfig,
    plan: StagePlan,
    executors: ExecutorRegistry,
    gate: ValidationGate,
    store: Option<SharedStore>,
}

impl Orchestrator {
    /// Create orchestrator with the standard plan and an in-memory cache
    #[must_use]
    pub fn new(config: PipelineConfig, executors: ExecutorRegistry) -> Self {
        if let Err(e) = config.validate() {
            tracing::warn!(error = %e, "pipeline configuration out of range");
        }
        let store = config.cache.enabled.then(|| {
            Arc::new(ResultCache::<SharedResult>::from_config(&config.cache)) as SharedStore
        });
        Self {
            gate: ValidationGate::new(&config.validation),
            plan: StagePlan::standard(),
            executors,
            store,
            config,
        }
    }

    /// Replace the stage plan
    #[inline]
    #[must_use]
    pub fn with_plan(mut self, plan: StagePlan) -> Self {
        self.plan = plan;
        self
    }

    /// Replace the result store
    #[inline]
    #[must_use]
    pub fn with_store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the validation gate
    #[inline]
    #[must_use]
    pub fn with_gate(mut self, gate: ValidationGate) -> Self {
        self.gate = gate;
        self
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stages that would run for `request`, in order
    ///
    /// # Errors
    /// Returns error if the plan is inconsistent
    pub fn plan_for(&self, request: &GenerationRequest) -> Result<Vec<PlannedStage>, PlanError> {
        self.plan.resolve(request)
    }

    /// Generate a project for `request`
    ///
    /// # Errors
    /// See [`GenerationError`]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<SharedResult, GenerationError> {
        self.generate_with_cancellation(request, CancellationToken::new())
            .await
    }

    /// Generate a project, stopping early when `cancellation` fires
    ///
    /// A cancelled run ends with status `Cancelled`; the stage that was in
    /// flight is recorded as failed with the message "cancelled".
    ///
    /// # Errors
    /// See [`GenerationError`]
    pub async fn generate_with_cancellation(
        &self,
        request: &GenerationRequest,
        cancellation: CancellationToken,
    ) -> Result<SharedResult, GenerationError> {
        request.validate().map_err(GenerationError::InvalidRequest)?;
        let key = request
            .cache_key()
            .map_err(|e| GenerationError::InvalidRequest(e.to_string()))?;

        if request.features.skip_cache {
            tracing::debug!(project_id = %request.project_id, "cache bypassed by request");
        } else if let Some(hit) = self.get_cached_result(&key).await {
            tracing::info!(
                project_id = %request.project_id,
                generation_id = %hit.generation_id,
                "returning cached result"
            );
            return Ok(hit);
        }

        let stages = self.plan.resolve(request)?;
        if let Some(missing) = stages.iter().find(|s| {
            s.requirement == Requirement::Required
                && s.name != StageName::Validation
                && !self.executors.contains(s.name)
        }) {
            return Err(GenerationError::MissingExecutor(missing.name));
        }

        let generation_id = Ulid::new();
        let span = tracing::info_span!(
            "generate",
            generation_id = %generation_id,
            project_id = %request.project_id
        );

        let result = self
            .run(request, key, generation_id, &stages, &cancellation)
            .instrument(span)
            .await?;
        let result = Arc::new(result);

        if let Some(store) = &self.store {
            if let Err(e) = store.set(key, Arc::clone(&result)).await {
                tracing::warn!(error = %e, key = %key, "cache write failed; result not cached");
            }
        }
        Ok(result)
    }

    /// Cached result for `key`, if present and live
    ///
    /// A failing store is logged and reported as a miss.
    pub async fn get_cached_result(&self, key: &CacheKey) -> Option<SharedResult> {
        let store = self.store.as_ref()?;
        match store.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "cache read failed; treating as miss");
                None
            }
        }
    }

    /// Drop the cached result for `key`; returns whether one was present
    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        match store.invalidate(key).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "cache invalidation failed");
                false
            }
        }
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        key: CacheKey,
        generation_id: Ulid,
        stages: &[PlannedStage],
        cancellation: &CancellationToken,
    ) -> Result<GenerationResult, GenerationError> {
        let mut execution = PipelineExecution::new(generation_id);
        execution.start();
        let deadline = self
            .config
            .run_timeout()
            .map(|limit| (Instant::now() + limit, limit));
        tracing::info!(stages = stages.len(), "generation started");

        for planned in stages.iter().filter(|s| s.name != StageName::Validation) {
            if let Some(interrupt) = interrupted(cancellation, deadline) {
                return Err(abort(execution, interrupt));
            }

            let Some(executor) = self.executors.get(planned.name) else {
                tracing::warn!(stage = %planned.name, "no executor registered; optional stage skipped");
                execution.skip_stage(planned.name, planned.requirement, "no executor registered");
                continue;
            };

            let index = execution.begin_stage(planned.name, planned.requirement);
            tracing::debug!(stage = %planned.name, "stage started");

            let outcome = {
                let ctx = StageContext {
                    stage: planned.name,
                    request,
                    previous: &execution.stages[..index],
                    cancellation,
                };
                self.invoke(executor.as_ref(), ctx, cancellation, deadline)
                    .await
            };

            match outcome {
                StageOutcome::Completed(files) => {
                    tracing::debug!(stage = %planned.name, files = files.len(), "stage completed");
                    execution.complete_stage(index, files);
                }
                StageOutcome::Failed(message) => {
                    execution.fail_stage(index, message.as_str());
                    if planned.requirement == Requirement::Required {
                        tracing::error!(stage = %planned.name, error = %message, "required stage failed");
                        execution.finish(RunStatus::Failed);
                        return Err(GenerationError::Stage {
                            stage: planned.name,
                            message,
                            execution: Box::new(execution),
                        });
                    }
                    tracing::warn!(stage = %planned.name, error = %message, "optional stage failed; continuing");
                }
                StageOutcome::Interrupted(interrupt) => {
                    execution.fail_stage(index, interrupt.message());
                    return Err(abort(execution, interrupt));
                }
            }
        }

        if let Some((path, first, second)) = find_collision(&execution) {
            tracing::error!(path = %path, %first, %second, "duplicate file path");
            execution.finish(RunStatus::Failed);
            return Err(GenerationError::Conflict {
                path,
                first,
                second,
                execution: Box::new(execution),
            });
        }

        if let Some(interrupt) = interrupted(cancellation, deadline) {
            return Err(abort(execution, interrupt));
        }

        let files: Vec<GeneratedFile> = execution.files().cloned().collect();
        let index = execution.begin_stage(StageName::Validation, Requirement::Required);
        let report = match self.gate.validate(&files) {
            Ok(report) => {
                execution.complete_stage(index, Vec::new());
                report
            }
            Err(source) => {
                tracing::error!(error = %source, "validation gate failed");
                execution.fail_stage(index, source.to_string());
                execution.finish(RunStatus::Failed);
                return Err(GenerationError::Validation {
                    source,
                    execution: Box::new(execution),
                });
            }
        };

        execution.finish(RunStatus::Completed);

        let quality_score = execution
            .stage_completed(StageName::QualityAnalysis)
            .then_some(report.score);
        let metrics = GenerationMetrics {
            total_files: files.len(),
            total_lines: files.iter().map(GeneratedFile::line_count).sum(),
            generation_time: execution.duration_ms().unwrap_or(0),
            complexity_score: report.metrics.complexity,
            quality_score,
        };

        tracing::info!(
            files = metrics.total_files,
            lines = metrics.total_lines,
            duration_ms = metrics.generation_time,
            passed = report.passed,
            score = report.score,
            "generation completed"
        );

        Ok(GenerationResult {
            generation_id,
            project_id: request.project_id.clone(),
            metadata: GenerationMetadata {
                created_at: Utc::now(),
                stages_executed: execution.executed_stages(),
                cache_key: key,
            },
            files,
            metrics,
            quality_report: report,
            execution,
        })
    }

    async fn invoke(
        &self,
        executor: &dyn StageExecutor,
        ctx: StageContext<'_>,
        cancellation: &CancellationToken,
        deadline: Option<(Instant, Duration)>,
    ) -> StageOutcome {
        let stage_timeout = self.config.stage_timeout();
        let work = async {
            let result = match stage_timeout {
                Some(limit) => match tokio::time::timeout(limit, executor.execute(ctx)).await {
                    Ok(result) => result,
                    Err(_) => return Err(format!("stage timed out after {limit:?}")),
                },
                None => executor.execute(ctx).await,
            };
            result.map_err(|e| format!("{e:#}"))
        };
        let run_deadline = async {
            match deadline {
                Some((at, limit)) => {
                    tokio::time::sleep_until(at).await;
                    limit
                }
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = cancellation.cancelled() => StageOutcome::Interrupted(Interrupt::Cancelled),
            limit = run_deadline => StageOutcome::Interrupted(Interrupt::Deadline(limit)),
            result = work => match result {
                Ok(files) => StageOutcome::Completed(files),
                Err(message) => StageOutcome::Failed(message),
            },
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("plan", &self.plan)
            .field("executors", &self.executors)
            .field("cached", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

fn interrupted(
    cancellation: &CancellationToken,
    deadline: Option<(Instant, Duration)>,
) -> Option<Interrupt> {
    if cancellation.is_cancelled() {
        return Some(Interrupt::Cancelled);
    }
    match deadline {
        Some((at, limit)) if Instant::now() >= at => Some(Interrupt::Deadline(limit)),
        _ => None,
    }
}

fn abort(mut execution: PipelineExecution, interrupt: Interrupt) -> GenerationError {
    tracing::warn!(reason = interrupt.message(), "generation stopped early");
    execution.finish(RunStatus::Cancelled);
    let execution = Box::new(execution);
    match interrupt {
        Interrupt::Cancelled => GenerationError::Cancelled { execution },
        Interrupt::Deadline(limit) => GenerationError::DeadlineExceeded { limit, execution },
    }
}

/// First path produced twice, with the two producing stages
fn find_collision(execution: &PipelineExecution) -> Option<(String, StageName, StageName)> {
    let mut seen: HashMap<&str, StageName> = HashMap::new();
    for record in &execution.stages {
        for file in &record.files {
            if let Some(first) = seen.insert(file.path.as_str(), record.stage) {
                return Some((file.path.clone(), first, record.stage));
            }
        }
    }
    None
}
