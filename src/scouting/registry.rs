use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of providers a scouting query can fan out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "gemini")]
    Gemini,
}

const REGISTRY: [ProviderId; 3] = [ProviderId::OpenAi, ProviderId::Anthropic, ProviderId::Gemini];

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    pub fn parse(id: &str) -> Option<Self> {
        REGISTRY.into_iter().find(|p| p.as_str() == id)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_valid_provider(id: &str) -> bool {
    ProviderId::parse(id).is_some()
}

/// All providers, in canonical order.
pub fn default_providers() -> [ProviderId; 3] {
    REGISTRY
}

/// Keeps the known ids in request order. Unknown ids are dropped and
/// repeats collapse to their first occurrence.
pub fn filter_providers<S: AsRef<str>>(requested: &[S]) -> Vec<ProviderId> {
    let mut providers = Vec::with_capacity(REGISTRY.len());
    for provider in requested.iter().filter_map(|id| ProviderId::parse(id.as_ref())) {
        if !providers.contains(&provider) {
            providers.push(provider);
        }
    }
    providers
}
