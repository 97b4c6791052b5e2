//! Pipeline stage identifiers

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Name of a generation pipeline stage
///
/// Variants are listed in the default execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageName {
    /// System architecture design
    ArchitectureDesign,
    /// Database schema design
    DatabaseDesign,
    /// Backend service generation
    BackendGeneration,
    /// API surface generation
    ApiGeneration,
    /// Frontend UI generation
    UiGeneration,
    /// Test suite generation
    TestGeneration,
    /// Code optimization pass
    Optimization,
    /// Quality analysis pass
    QualityAnalysis,
    /// Static validation of all produced files
    Validation,
}

impl StageName {
    /// All stages in default declared order
    pub const ALL: [StageName; 9] = [
        StageName::ArchitectureDesign,
        StageName::DatabaseDesign,
        StageName::BackendGeneration,
        StageName::ApiGeneration,
        StageName::UiGeneration,
        StageName::TestGeneration,
        StageName::Optimization,
        StageName::QualityAnalysis,
        StageName::Validation,
    ];

    /// Stable kebab-case identifier
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::ArchitectureDesign => "architecture-design",
            StageName::DatabaseDesign => "database-design",
            StageName::BackendGeneration => "backend-generation",
            StageName::ApiGeneration => "api-generation",
            StageName::UiGeneration => "ui-generation",
            StageName::TestGeneration => "test-generation",
            StageName::Optimization => "optimization",
            StageName::QualityAnalysis => "quality-analysis",
            StageName::Validation => "validation",
        }
    }
}

impl Display for StageName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageName {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

/// Unrecognized stage identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage: '{0}'")]
pub struct UnknownStage(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_matches_display() {
        for stage in StageName::ALL {
            assert_eq!(stage.to_string().parse::<StageName>().unwrap(), stage);
        }
    }

    #[test]
    fn serde_is_kebab_case() {
        let json = serde_json::to_string(&StageName::QualityAnalysis).unwrap();
        assert_eq!(json, "\"quality-analysis\"");
    }

    #[test]
    fn unknown_stage_is_rejected() {
        assert_eq!(
            "deploy".parse::<StageName>(),
            Err(UnknownStage("deploy".to_string()))
        );
    }
}
