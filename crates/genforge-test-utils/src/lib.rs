//! Testing utilities for the genforge workspace
//!
//! Scripted stage executors, a failing result store and request fixtures.

#![allow(missing_docs)]

use genforge_artifact::{CacheKey, GeneratedFile, StageName};
use genforge_cache::{CacheError, ResultStore};
use genforge_core::{
    AiProvider, CompletionOptions, DatabaseRequirements, ExecutorRegistry, FeatureFlags,
    GenerationRequest, ProjectRequirements, SharedResult, StageContext, StageExecutor,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Script {
    Files(Vec<GeneratedFile>),
    Fail(String),
}

/// Stage executor with a fixed outcome that counts its invocations
#[derive(Debug)]
pub struct ScriptedExecutor {
    script: Script,
    delay: Option<Duration>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Vec<StageName>>>,
}

impl ScriptedExecutor {
    /// Executor returning `files`
    pub fn files(files: Vec<GeneratedFile>) -> Self {
        Self::from_script(Script::Files(files))
    }

    /// Executor returning one file
    pub fn file(stage: StageName, path: &str, content: &str) -> Self {
        Self::files(vec![GeneratedFile::new(stage, path, content)])
    }

    /// Executor returning the default file for `stage`
    pub fn for_stage(stage: StageName) -> Self {
        Self::files(vec![default_file(stage)])
    }

    /// Executor that always fails with `message`
    pub fn failing(message: &str) -> Self {
        Self::from_script(Script::Fail(message.to_string()))
    }

    fn from_script(script: Script) -> Self {
        Self {
            script,
            delay: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Sleep for `delay` before answering
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of invocations so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Stages visible in `previous` on each invocation
    pub fn seen_previous(&self) -> Vec<Vec<StageName>> {
        self.seen.lock().clone()
    }
}

#[async_trait::async_trait]
impl StageExecutor for ScriptedExecutor {
    async fn execute(&self, ctx: StageContext<'_>) -> anyhow::Result<Vec<GeneratedFile>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .push(ctx.previous.iter().map(|r| r.stage).collect());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Files(files) => Ok(files.clone()),
            Script::Fail(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

/// A documented, typed TypeScript file unique to `stage`
pub fn default_file(stage: StageName) -> GeneratedFile {
    let content = format!(
        "/** Output of the {stage} stage */\nexport interface Output {{\n  id: string;\n}}\n"
    );
    GeneratedFile::new(stage, format!("src/{stage}.ts"), content)
}

/// One scripted executor per stage, all inspectable after a run
#[derive(Debug, Default)]
pub struct StageHarness {
    executors: HashMap<StageName, Arc<ScriptedExecutor>>,
}

impl StageHarness {
    /// Harness with a default executor for every generation stage
    pub fn complete() -> Self {
        let mut harness = Self::default();
        for stage in StageName::ALL {
            if stage != StageName::Validation {
                harness.set(stage, ScriptedExecutor::for_stage(stage));
            }
        }
        harness
    }

    /// Replace the executor for `stage`
    pub fn set(&mut self, stage: StageName, executor: ScriptedExecutor) -> Arc<ScriptedExecutor> {
        let executor = Arc::new(executor);
        self.executors.insert(stage, Arc::clone(&executor));
        executor
    }

    /// Builder form of [`set`](Self::set)
    #[must_use]
    pub fn with(mut self, stage: StageName, executor: ScriptedExecutor) -> Self {
        self.set(stage, executor);
        self
    }

    /// Remove the executor for `stage`
    #[must_use]
    pub fn without(mut self, stage: StageName) -> Self {
        self.executors.remove(&stage);
        self
    }

    /// Calls made to the executor for `stage`
    pub fn calls(&self, stage: StageName) -> usize {
        self.executors.get(&stage).map_or(0, |e| e.calls())
    }

    /// Calls across all executors
    pub fn total_calls(&self) -> usize {
        self.executors.values().map(|e| e.calls()).sum()
    }

    /// Executor for `stage`
    pub fn executor(&self, stage: StageName) -> Option<Arc<ScriptedExecutor>> {
        self.executors.get(&stage).cloned()
    }

    /// Registry wired to this harness
    pub fn registry(&self) -> ExecutorRegistry {
        self.executors
            .iter()
            .fold(ExecutorRegistry::new(), |registry, (stage, executor)| {
                registry.with(*stage, Arc::clone(executor) as Arc<dyn StageExecutor>)
            })
    }
}

/// Result store whose every operation fails
#[derive(Debug, Default)]
pub struct FailingStore {
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

#[async_trait::async_trait]
impl ResultStore<SharedResult> for FailingStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<SharedResult>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn set(&self, _key: CacheKey, _value: SharedResult) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn invalidate(&self, _key: &CacheKey) -> Result<bool, CacheError> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
}

/// Provider returning a canned response and recording prompts
#[derive(Debug)]
pub struct ScriptedProvider {
    response: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait::async_trait]
impl AiProvider for ScriptedProvider {
    async fn complete(&self, prompt: &str, _options: &CompletionOptions) -> anyhow::Result<String> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.response.clone())
    }
}

/// Backend-only request without database or optional features
pub fn backend_request(project_id: &str) -> GenerationRequest {
    GenerationRequest::new(project_id, "A REST service for tracking orders").with_requirements(
        ProjectRequirements {
            backend: true,
            ..ProjectRequirements::default()
        },
    )
}

/// Backend request with a database requirement
pub fn database_request(project_id: &str) -> GenerationRequest {
    GenerationRequest::new(project_id, "An inventory service backed by postgres").with_requirements(
        ProjectRequirements {
            database: Some(DatabaseRequirements {
                engine: Some("postgres".into()),
                entities: vec!["Item".into(), "Warehouse".into()],
            }),
            backend: true,
            frontend: true,
            api: false,
        },
    )
}

/// Backend request with the given optional features enabled
pub fn request_with_features(project_id: &str, features: FeatureFlags) -> GenerationRequest {
    backend_request(project_id).with_features(features)
}
