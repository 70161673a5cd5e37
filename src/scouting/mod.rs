pub mod orchestrator;
pub mod registry;
pub mod resilient;
pub mod reveal;
pub mod synthesizer;

pub use orchestrator::{Orchestrator, ScoutingError, ScoutingRun};
pub use registry::{ProviderId, default_providers, filter_providers, is_valid_provider};
pub use resilient::ResilientSynthesizer;
pub use synthesizer::{MockSynthesizer, ProviderError, Synthesizer};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rendering hint from the client. Never changes what gets synthesized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoutingMode {
    #[default]
    Parallel,
    Compare,
}

impl ScoutingMode {
    /// Unknown values fall back to `Parallel` instead of being rejected.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some("compare") => Self::Compare,
            _ => Self::Parallel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutingResult {
    pub id: Uuid,
    #[serde(rename = "model")]
    pub provider: ProviderId,
    pub title: String,
    pub summary: String,
    pub insights: Vec<String>,
    pub sources: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderFailure {
    #[serde(rename = "model")]
    pub provider: ProviderId,
    pub error: FailureDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub kind: String,
    pub message: String,
}

impl ProviderFailure {
    pub fn new(provider: ProviderId, err: &ProviderError) -> Self {
        Self {
            provider,
            error: FailureDetail {
                kind: err.kind().to_string(),
                message: err.to_string(),
            },
        }
    }
}

/// One slot of the aggregate response. Successes serialize exactly like a
/// bare `ScoutingResult`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProviderOutcome {
    Completed(ScoutingResult),
    Failed(ProviderFailure),
}

impl ProviderOutcome {
    pub fn provider(&self) -> ProviderId {
        match self {
            Self::Completed(result) => result.provider,
            Self::Failed(failure) => failure.provider,
        }
    }

    pub fn result(&self) -> Option<&ScoutingResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Failed(_) => None,
        }
    }
}
