//! Stage plan
//!
//! Stages are declared once, each with a required/optional designation, a
//! predicate over the request and the stages it depends on. At run start the
//! plan is filtered by predicate and ordered topologically; ties go to the
//! stage declared first, so the standard plan always runs in its declared
//! order.

use crate::request::GenerationRequest;
use genforge_artifact::StageName;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

/// Whether a stage failure aborts the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Requirement {
    /// Failure aborts the run
    Required,
    /// Failure is recorded and the run continues
    Optional,
}

/// Decides whether a stage applies to a request
pub type StagePredicate = fn(&GenerationRequest) -> bool;

fn always(_: &GenerationRequest) -> bool {
    true
}

/// Declaration of one stage
#[derive(Clone)]
pub struct StageDefinition {
    pub name: StageName,
    pub requirement: Requirement,
    pub depends_on: Vec<StageName>,
    predicate: StagePredicate,
}

impl StageDefinition {
    /// Stage that always applies and has no dependencies
    #[must_use]
    pub fn new(name: StageName, requirement: Requirement) -> Self {
        Self {
            name,
            requirement,
            depends_on: Vec::new(),
            predicate: always,
        }
    }

    /// Required stage
    #[inline]
    #[must_use]
    pub fn required(name: StageName) -> Self {
        Self::new(name, Requirement::Required)
    }

    /// Optional stage
    #[inline]
    #[must_use]
    pub fn optional(name: StageName) -> Self {
        Self::new(name, Requirement::Optional)
    }

    /// Only include the stage when `predicate` holds
    #[inline]
    #[must_use]
    pub fn when(mut self, predicate: StagePredicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Declare stages whose output this stage reads
    #[must_use]
    pub fn after(mut self, stages: impl IntoIterator<Item = StageName>) -> Self {
        self.depends_on.extend(stages);
        self
    }

    /// Check if the stage applies to `request`
    #[inline]
    #[must_use]
    pub fn applies_to(&self, request: &GenerationRequest) -> bool {
        (self.predicate)(request)
    }
}

impl fmt::Debug for StageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageDefinition")
            .field("name", &self.name)
            .field("requirement", &self.requirement)
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}

/// A stage selected for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedStage {
    pub name: StageName,
    pub requirement: Requirement,
}

/// Invalid stage plan
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Same stage declared twice
    #[error("stage {0} is declared more than once")]
    DuplicateStage(StageName),

    /// Dependency names a stage the plan never declares
    #[error("stage {stage} depends on undeclared stage {dependency}")]
    UnknownDependency {
        stage: StageName,
        dependency: StageName,
    },

    /// Dependencies form a cycle
    #[error("dependency cycle among stages: {}", join(.0))]
    Cycle(Vec<StageName>),

    /// Plan has no validation stage
    #[error("plan does not declare the validation stage")]
    MissingValidation,

    /// Validation is not the final stage
    #[error("validation must run last, but {0} is ordered after it")]
    ValidationNotLast(StageName),
}

fn join(stages: &[StageName]) -> String {
    stages
        .iter()
        .map(StageName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ordered set of stage declarations
#[derive(Debug, Clone)]
pub struct StagePlan {
    stages: Vec<StageDefinition>,
}

impl StagePlan {
    /// Plan from explicit declarations; checked when resolved
    #[must_use]
    pub fn new(stages: Vec<StageDefinition>) -> Self {
        Self { stages }
    }

    /// The standard generation pipeline
    #[must_use]
    pub fn standard() -> Self {
        use StageName::{
            ApiGeneration, ArchitectureDesign, BackendGeneration, DatabaseDesign, Optimization,
            QualityAnalysis, TestGeneration, UiGeneration, Validation,
        };

        Self::new(vec![
            StageDefinition::required(ArchitectureDesign),
            StageDefinition::required(DatabaseDesign)
                .when(|r| r.requirements.database.is_some())
                .after([ArchitectureDesign]),
            StageDefinition::required(BackendGeneration)
                .when(|r| r.requirements.backend)
                .after([ArchitectureDesign, DatabaseDesign]),
            StageDefinition::required(ApiGeneration)
                .when(|r| r.requirements.api)
                .after([BackendGeneration]),
            StageDefinition::required(UiGeneration)
                .when(|r| r.requirements.frontend)
                .after([ArchitectureDesign, ApiGeneration]),
            StageDefinition::optional(TestGeneration)
                .when(|r| r.features.include_tests)
                .after([BackendGeneration, ApiGeneration, UiGeneration]),
            StageDefinition::optional(Optimization)
                .when(|r| r.features.optimize)
                .after([BackendGeneration, ApiGeneration, UiGeneration, TestGeneration]),
            StageDefinition::optional(QualityAnalysis)
                .when(|r| r.features.analyze_quality)
                .after([TestGeneration, Optimization]),
            StageDefinition::required(Validation).after([
                ArchitectureDesign,
                DatabaseDesign,
                BackendGeneration,
                ApiGeneration,
                UiGeneration,
                TestGeneration,
                Optimization,
                QualityAnalysis,
            ]),
        ])
    }

    /// Select and order the stages for `request`
    ///
    /// Dependencies on stages filtered out for this request are satisfied
    /// trivially.
    ///
    /// # Errors
    /// Returns `PlanError` for duplicate or undeclared stages, cycles, or a
    /// validation stage that is missing or not last
    pub fn resolve(&self, request: &GenerationRequest) -> Result<Vec<PlannedStage>, PlanError> {
        let mut declared_index: HashMap<StageName, usize> = HashMap::new();
        for (index, def) in self.stages.iter().enumerate() {
            if declared_index.insert(def.name, index).is_some() {
                return Err(PlanError::DuplicateStage(def.name));
            }
        }
        for def in &self.stages {
            if let Some(dependency) = def
                .depends_on
                .iter()
                .find(|d| !declared_index.contains_key(*d))
            {
                return Err(PlanError::UnknownDependency {
                    stage: def.name,
                    dependency: *dependency,
                });
            }
        }
        if !declared_index.contains_key(&StageName::Validation) {
            return Err(PlanError::MissingValidation);
        }

        let selected: Vec<&StageDefinition> = self
            .stages
            .iter()
            .filter(|def| def.applies_to(request))
            .collect();

        let mut graph: DiGraphMap<StageName, ()> = DiGraphMap::new();
        for def in &selected {
            graph.add_node(def.name);
        }
        for def in &selected {
            for dependency in &def.depends_on {
                if graph.contains_node(*dependency) {
                    graph.add_edge(*dependency, def.name, ());
                }
            }
        }

        let order = kahn(&graph, &declared_index)?;
        if let Some(position) = order.iter().position(|s| *s == StageName::Validation) {
            if let Some(after) = order.get(position + 1) {
                return Err(PlanError::ValidationNotLast(*after));
            }
        }

        Ok(order
            .into_iter()
            .filter_map(|name| {
                selected
                    .iter()
                    .find(|def| def.name == name)
                    .map(|def| PlannedStage {
                        name,
                        requirement: def.requirement,
                    })
            })
            .collect())
    }
}

impl Default for StagePlan {
    fn default() -> Self {
        Self::standard()
    }
}

/// Topological order, ready stages taken by declared index
fn kahn(
    graph: &DiGraphMap<StageName, ()>,
    declared_index: &HashMap<StageName, usize>,
) -> Result<Vec<StageName>, PlanError> {
    let index_of = |stage: StageName| declared_index.get(&stage).copied().unwrap_or(usize::MAX);

    let mut in_degree: HashMap<StageName, usize> = graph
        .nodes()
        .map(|n| (n, graph.neighbors_directed(n, Direction::Incoming).count()))
        .collect();

    let mut ready: BinaryHeap<Reverse<(usize, StageName)>> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(stage, _)| Reverse((index_of(*stage), *stage)))
        .collect();

    let mut order = Vec::with_capacity(in_degree.len());
    while let Some(Reverse((_, stage))) = ready.pop() {
        order.push(stage);
        for next in graph.neighbors_directed(stage, Direction::Outgoing) {
            if let Some(degree) = in_degree.get_mut(&next) {
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse((index_of(next), next)));
                }
            }
        }
    }

    if order.len() < in_degree.len() {
        let mut stuck: Vec<StageName> = in_degree
            .into_iter()
            .filter(|(stage, _)| !order.contains(stage))
            .map(|(stage, _)| stage)
            .collect();
        stuck.sort_by_key(|s| index_of(*s));
        return Err(PlanError::Cycle(stuck));
    }
    Ok(order)
}
