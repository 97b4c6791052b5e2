//! End-to-end orchestrator behavior with scripted stage executors.

use genforge_core::prelude::*;
use genforge_core::{GenerationMetrics, PromptStageExecutor, SharedStore};
use genforge_test_utils::{
    backend_request, database_request, request_with_features, FailingStore, ScriptedExecutor,
    ScriptedProvider, StageHarness,
};
use pretty_assertions::assert_eq;
use std::sync::atomic::Ordering;
use std::sync::Arc;

fn orchestrator(harness: &StageHarness) -> Orchestrator {
    Orchestrator::new(PipelineConfig::default(), harness.registry())
}

#[tokio::test]
async fn backend_only_scenario_runs_three_stages() {
    let harness = StageHarness::complete();
    let result = orchestrator(&harness)
        .generate(&backend_request("p1"))
        .await
        .unwrap();

    let records: Vec<_> = result
        .execution
        .stages
        .iter()
        .map(|r| (r.stage, r.status))
        .collect();
    assert_eq!(
        records,
        vec![
            (StageName::ArchitectureDesign, StageStatus::Completed),
            (StageName::BackendGeneration, StageStatus::Completed),
            (StageName::Validation, StageStatus::Completed),
        ]
    );
    assert_eq!(result.execution.status, RunStatus::Completed);
    assert_eq!(result.metrics.total_files, 2);
    assert_eq!(result.metrics.total_lines, 8);
    assert_eq!(
        result.metadata.stages_executed,
        vec![
            StageName::ArchitectureDesign,
            StageName::BackendGeneration,
            StageName::Validation
        ]
    );
    assert!(result.passed());
    assert_eq!(harness.total_calls(), 2);
}

#[tokio::test]
async fn identical_requests_compute_once() {
    let harness = StageHarness::complete();
    let orchestrator = orchestrator(&harness);
    let request = backend_request("p1");

    let first = orchestrator.generate(&request).await.unwrap();
    let second = orchestrator.generate(&request).await.unwrap();

    assert_eq!(harness.total_calls(), 2);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.files, second.files);
    assert_eq!(first.metrics, second.metrics);

    let key = request.cache_key().unwrap();
    let cached = orchestrator.get_cached_result(&key).await.unwrap();
    assert_eq!(cached.generation_id, first.generation_id);
}

#[tokio::test]
async fn skip_cache_recomputes_and_refreshes_entry() {
    let harness = StageHarness::complete();
    let orchestrator = orchestrator(&harness);
    let request = backend_request("p1");

    let first = orchestrator.generate(&request).await.unwrap();
    let bypass = request.clone().with_features(FeatureFlags {
        skip_cache: true,
        ..FeatureFlags::default()
    });
    let second = orchestrator.generate(&bypass).await.unwrap();
    let third = orchestrator.generate(&request).await.unwrap();

    assert_eq!(harness.calls(StageName::BackendGeneration), 2);
    assert_ne!(first.generation_id, second.generation_id);
    assert_eq!(third.generation_id, second.generation_id);
}

#[tokio::test]
async fn invalidate_forces_a_fresh_run() {
    let harness = StageHarness::complete();
    let orchestrator = orchestrator(&harness);
    let request = backend_request("p1");
    let key = request.cache_key().unwrap();

    orchestrator.generate(&request).await.unwrap();
    assert!(orchestrator.invalidate(&key).await);
    assert!(!orchestrator.invalidate(&key).await);
    orchestrator.generate(&request).await.unwrap();

    assert_eq!(harness.calls(StageName::ArchitectureDesign), 2);
}

#[tokio::test]
async fn required_database_failure_stops_the_run() {
    let harness = StageHarness::complete().with(
        StageName::DatabaseDesign,
        ScriptedExecutor::failing("schema generation refused"),
    );
    let orchestrator = orchestrator(&harness);
    let request = database_request("p2");

    let err = orchestrator.generate(&request).await.unwrap_err();
    match &err {
        GenerationError::Stage {
            stage,
            message,
            execution,
        } => {
            assert_eq!(*stage, StageName::DatabaseDesign);
            assert!(message.contains("schema generation refused"));
            assert_eq!(execution.status, RunStatus::Failed);
            assert_eq!(execution.stages.len(), 2);
            assert_eq!(execution.failed_count, 1);
        }
        other => panic!("expected stage error, got {other:?}"),
    }

    for later in [
        StageName::BackendGeneration,
        StageName::UiGeneration,
        StageName::TestGeneration,
    ] {
        assert_eq!(harness.calls(later), 0, "{later} must not run");
    }
    let key = request.cache_key().unwrap();
    assert!(orchestrator.get_cached_result(&key).await.is_none());
}

#[tokio::test]
async fn optional_test_failure_is_isolated() {
    let harness = StageHarness::complete().with(
        StageName::TestGeneration,
        ScriptedExecutor::failing("test runner crashed"),
    );
    let request = request_with_features(
        "p3",
        FeatureFlags {
            include_tests: true,
            ..FeatureFlags::default()
        },
    );

    let result = orchestrator(&harness).generate(&request).await.unwrap();

    assert_eq!(result.execution.status, RunStatus::Completed);
    let tests = result.execution.record(StageName::TestGeneration).unwrap();
    assert_eq!(tests.status, StageStatus::Failed);
    assert!(tests.error.as_deref().unwrap().contains("test runner crashed"));
    assert_eq!(result.files_from(StageName::TestGeneration).count(), 0);
    assert_eq!(result.execution.failed_count, 1);
}

#[tokio::test]
async fn duplicate_paths_conflict_even_when_stages_succeed() {
    let harness = StageHarness::complete()
        .with(
            StageName::BackendGeneration,
            ScriptedExecutor::file(StageName::BackendGeneration, "src/index.ts", "export {};\n"),
        )
        .with(
            StageName::ApiGeneration,
            ScriptedExecutor::file(StageName::ApiGeneration, "src/index.ts", "export {};\n"),
        );
    let orchestrator = orchestrator(&harness);
    let request = GenerationRequest::new("p4", "orders api")
        .with_requirements(ProjectRequirements::for_kind(ProjectKind::Api));

    let err = orchestrator.generate(&request).await.unwrap_err();
    match &err {
        GenerationError::Conflict {
            path,
            first,
            second,
            execution,
        } => {
            assert_eq!(path, "src/index.ts");
            assert_eq!(*first, StageName::BackendGeneration);
            assert_eq!(*second, StageName::ApiGeneration);
            assert_eq!(execution.status, RunStatus::Failed);
            assert!(execution.record(StageName::Validation).is_none());
        }
        other => panic!("expected conflict, got {other:?}"),
    }
    assert!(!err.is_retryable());
    let key = request.cache_key().unwrap();
    assert!(orchestrator.get_cached_result(&key).await.is_none());
}

#[tokio::test]
async fn quality_score_requires_quality_analysis() {
    let harness = StageHarness::complete();
    let orchestrator = orchestrator(&harness);

    let plain = orchestrator.generate(&backend_request("q1")).await.unwrap();
    assert_eq!(plain.metrics.quality_score, None);

    let analyzed = orchestrator
        .generate(&request_with_features(
            "q2",
            FeatureFlags {
                analyze_quality: true,
                ..FeatureFlags::default()
            },
        ))
        .await
        .unwrap();
    assert_eq!(analyzed.metrics.quality_score, Some(100));

    let broken = StageHarness::complete()
        .with(StageName::QualityAnalysis, ScriptedExecutor::failing("analyzer offline"));
    let result = Orchestrator::new(PipelineConfig::default(), broken.registry())
        .generate(&request_with_features(
            "q3",
            FeatureFlags {
                analyze_quality: true,
                ..FeatureFlags::default()
            },
        ))
        .await
        .unwrap();
    assert_eq!(result.metrics.quality_score, None);
}

#[tokio::test]
async fn failed_verdict_is_merged_not_thrown() {
    let harness = StageHarness::complete().with(
        StageName::BackendGeneration,
        ScriptedExecutor::file(
            StageName::BackendGeneration,
            "src/server.ts",
            "/** server */\nexport function start(): void {\n",
        ),
    );
    let result = orchestrator(&harness)
        .generate(&backend_request("v1"))
        .await
        .unwrap();

    assert_eq!(result.execution.status, RunStatus::Completed);
    assert!(!result.passed());
    assert_eq!(result.quality_report.score, 80);
    assert_eq!(result.quality_report.summary.overall_score, 80);
}

#[tokio::test]
async fn gate_rejection_fails_the_run() {
    let harness = StageHarness::complete().with(
        StageName::BackendGeneration,
        ScriptedExecutor::file(StageName::BackendGeneration, "bin/blob.dat", "\0\0"),
    );
    let err = orchestrator(&harness)
        .generate(&backend_request("v2"))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Validation { .. }));
    let execution = err.execution().unwrap();
    let validation = execution.record(StageName::Validation).unwrap();
    assert_eq!(validation.status, StageStatus::Failed);
    assert!(validation.error.as_deref().unwrap().contains("binary"));
}

#[tokio::test]
async fn executors_see_earlier_stage_output() {
    let harness = StageHarness::complete();
    let request = database_request("d1");
    orchestrator(&harness).generate(&request).await.unwrap();

    let backend = harness.executor(StageName::BackendGeneration).unwrap();
    assert_eq!(
        backend.seen_previous(),
        vec![vec![StageName::ArchitectureDesign, StageName::DatabaseDesign]]
    );
}

#[tokio::test]
async fn missing_required_executor_is_rejected_up_front() {
    let harness = StageHarness::complete().without(StageName::BackendGeneration);
    let err = orchestrator(&harness)
        .generate(&backend_request("m1"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GenerationError::MissingExecutor(StageName::BackendGeneration)
    ));
    assert!(err.execution().is_none());
    assert_eq!(harness.total_calls(), 0);
}

#[tokio::test]
async fn missing_optional_executor_is_skipped() {
    let harness = StageHarness::complete().without(StageName::Optimization);
    let request = request_with_features(
        "m2",
        FeatureFlags {
            optimize: true,
            ..FeatureFlags::default()
        },
    );
    let result = orchestrator(&harness).generate(&request).await.unwrap();

    let record = result.execution.record(StageName::Optimization).unwrap();
    assert_eq!(record.status, StageStatus::Skipped);
    assert!(!result.metadata.stages_executed.contains(&StageName::Optimization));
}

#[tokio::test]
async fn invalid_requests_never_start() {
    let harness = StageHarness::complete();
    let err = orchestrator(&harness)
        .generate(&GenerationRequest::new("p1", "  "))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::InvalidRequest(_)));
    assert_eq!(harness.total_calls(), 0);
}

#[tokio::test]
async fn unavailable_cache_degrades_to_miss() {
    let harness = StageHarness::complete();
    let store = Arc::new(FailingStore::default());
    let orchestrator = orchestrator(&harness).with_store(Arc::clone(&store) as SharedStore);
    let request = backend_request("c1");

    orchestrator.generate(&request).await.unwrap();
    orchestrator.generate(&request).await.unwrap();

    assert_eq!(harness.calls(StageName::ArchitectureDesign), 2);
    assert_eq!(store.gets.load(Ordering::SeqCst), 2);
    assert_eq!(store.sets.load(Ordering::SeqCst), 2);
    assert!(orchestrator
        .get_cached_result(&request.cache_key().unwrap())
        .await
        .is_none());
}

#[tokio::test]
async fn disabled_cache_always_recomputes() {
    let harness = StageHarness::complete();
    let orchestrator = Orchestrator::new(PipelineConfig::new().without_cache(), harness.registry());
    let request = backend_request("c2");

    orchestrator.generate(&request).await.unwrap();
    orchestrator.generate(&request).await.unwrap();
    assert_eq!(harness.calls(StageName::BackendGeneration), 2);
}

#[tokio::test]
async fn independent_requests_run_concurrently() {
    let harness = StageHarness::complete();
    let orchestrator = orchestrator(&harness);
    let a = backend_request("a");
    let b = backend_request("b");

    let (first, second) = tokio::join!(orchestrator.generate(&a), orchestrator.generate(&b));
    assert_eq!(first.unwrap().project_id, "a");
    assert_eq!(second.unwrap().project_id, "b");
    assert_eq!(harness.calls(StageName::BackendGeneration), 2);
}

#[tokio::test]
async fn concurrent_identical_and_distinct_requests_share_the_cache() {
    let harness = StageHarness::complete();
    let orchestrator = orchestrator(&harness);
    orchestrator.generate(&backend_request("warm")).await.unwrap();

    let requests: Vec<_> = ["warm", "x", "y", "warm"]
        .into_iter()
        .map(backend_request)
        .collect();
    let results = futures::future::join_all(requests.iter().map(|r| orchestrator.generate(r))).await;

    let ids: Vec<_> = results
        .into_iter()
        .map(|r| r.unwrap().project_id.clone())
        .collect();
    assert_eq!(ids, ["warm", "x", "y", "warm"]);
    assert_eq!(harness.calls(StageName::BackendGeneration), 3);
}

#[tokio::test]
async fn result_serializes_with_consumer_field_names() {
    let harness = StageHarness::complete();
    let result = orchestrator(&harness)
        .generate(&backend_request("j1"))
        .await
        .unwrap();
    let json = serde_json::to_value(result.as_ref()).unwrap();

    assert!(json["generationId"].is_string());
    assert_eq!(json["projectId"], "j1");
    assert_eq!(json["files"].as_array().unwrap().len(), 2);
    assert_eq!(json["metrics"]["totalFiles"], 2);
    assert_eq!(json["metrics"]["totalLines"], 8);
    assert!(json["metrics"]["generationTime"].is_u64());
    assert_eq!(json["qualityReport"]["summary"]["overallScore"], 100);
    assert_eq!(json["execution"]["status"], "completed");
    assert_eq!(json["metadata"]["stagesExecuted"][1], "backend-generation");

    let metrics: GenerationMetrics = serde_json::from_value(json["metrics"].clone()).unwrap();
    assert_eq!(metrics, result.metrics);
}

#[tokio::test]
async fn prompt_executor_plugs_into_the_pipeline() {
    let provider = Arc::new(ScriptedProvider::new(
        "```markdown docs/ARCHITECTURE.md\n# Orders service\n```\n",
    ));
    let mut harness = StageHarness::complete();
    let architecture = PromptStageExecutor::new(
        Arc::clone(&provider) as Arc<dyn genforge_core::AiProvider>,
        "Describe the system architecture.",
    );
    let registry = harness
        .registry()
        .with(StageName::ArchitectureDesign, Arc::new(architecture));
    harness = harness.without(StageName::ArchitectureDesign);

    let result = Orchestrator::new(PipelineConfig::default(), registry)
        .generate(&backend_request("ai1"))
        .await
        .unwrap();

    assert!(result.file("docs/ARCHITECTURE.md").is_some());
    assert_eq!(provider.prompts().len(), 1);
    assert!(provider.prompts()[0].contains("A REST service for tracking orders"));
    assert_eq!(harness.calls(StageName::BackendGeneration), 1);
}
