use std::sync::Arc;
use std::time::Duration;

use opentelemetry::KeyValue;

use super::{ProviderError, ProviderId, ScoutingResult, Synthesizer};
use crate::telemetry::metrics::SCOUTING_PROVIDER_RETRIES;

const BASE_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Retries retryable provider errors with exponential backoff and jitter.
/// Wraps any `Synthesizer` without changing its contract.
pub struct ResilientSynthesizer {
    inner: Arc<dyn Synthesizer>,
    max_retries: u32,
}

impl ResilientSynthesizer {
    pub fn new(inner: Arc<dyn Synthesizer>, max_retries: u32) -> Self {
        Self { inner, max_retries }
    }
}

#[async_trait::async_trait]
impl Synthesizer for ResilientSynthesizer {
    async fn synthesize(
        &self,
        query: &str,
        provider: ProviderId,
    ) -> Result<ScoutingResult, ProviderError> {
        let mut attempt: u32 = 0;

        loop {
            match self.inner.synthesize(query, provider).await {
                Ok(result) => return Ok(result),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        provider = %provider,
                        error = %err,
                        "Provider call failed, retrying"
                    );

                    SCOUTING_PROVIDER_RETRIES.add(
                        1,
                        &[
                            KeyValue::new("scouting.provider", provider.as_str()),
                            KeyValue::new("error.type", err.kind()),
                        ],
                    );

                    tokio::time::sleep(backoff_delay(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let base = BASE_BACKOFF
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_BACKOFF);
    // 25% jitter so sibling retries spread out
    let jitter_ms = fastrand::u64(0..=base.as_millis() as u64 / 4);
    base + Duration::from_millis(jitter_ms)
}
