use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use super::{ProviderId, ScoutingResult};

const TITLE_QUERY_MAX_CHARS: usize = 40;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("provider call timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("provider rate limit exceeded")]
    RateLimited,

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("provider authentication failed: {0}")]
    Authentication(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::RateLimited => "rate_limited",
            Self::MalformedResponse(_) => "malformed_response",
            Self::Authentication(_) => "authentication",
            Self::Unavailable(_) => "unavailable",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::RateLimited | Self::Unavailable(_)
        )
    }
}

/// Produces one analysis record for one provider. Implementations must be
/// independent per call so the orchestrator can run them side by side.
#[async_trait::async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(
        &self,
        query: &str,
        provider: ProviderId,
    ) -> Result<ScoutingResult, ProviderError>;

    fn name(&self) -> &str;
}

/// Deterministic stand-in used until real provider calls are wired up.
#[derive(Debug, Default, Clone)]
pub struct MockSynthesizer;

impl MockSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Synthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        query: &str,
        provider: ProviderId,
    ) -> Result<ScoutingResult, ProviderError> {
        Ok(ScoutingResult {
            id: Uuid::new_v4(),
            provider,
            title: format!("Technology Analysis ({provider}): {}", title_fragment(query)),
            summary: "Signals suggest accelerated adoption, ecosystem consolidation, and \
                      increased regulatory scrutiny across core industry segments."
                .to_string(),
            insights: vec![
                "Incumbents are consolidating partnerships to reduce time-to-market.".to_string(),
                "Integration-ready platforms are gaining share due to lower switching costs."
                    .to_string(),
                "Regulatory timelines are driving demand for audit-ready data pipelines."
                    .to_string(),
                "Sector-specific solutions outperform horizontal tools in early deployments."
                    .to_string(),
            ],
            sources: vec![
                "Industry Analyst Briefing".to_string(),
                "Patent Filing Trends".to_string(),
                "Vendor Benchmark Reports".to_string(),
                "Research Consortium Updates".to_string(),
            ],
            confidence: 0.82,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Display form of the query for result titles: at most 40 characters,
/// ellipsized when cut.
pub(crate) fn title_fragment(query: &str) -> String {
    let mut chars = query.char_indices();
    match chars.nth(TITLE_QUERY_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &query[..cut]),
        None => query.to_string(),
    }
}
