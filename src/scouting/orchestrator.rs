use std::sync::Arc;
use std::time::{Duration, Instant};

use opentelemetry::KeyValue;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::Instrument;

use super::{
    ProviderError, ProviderFailure, ProviderId, ProviderOutcome, ScoutingMode, Synthesizer,
    filter_providers,
};
use crate::telemetry::metrics::{
    SCOUTING_PROVIDER_DURATION, SCOUTING_PROVIDER_FAILURES, SCOUTING_REQUESTS,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoutingError {
    #[error("Missing query")]
    EmptyQuery,

    #[error("No valid models provided")]
    NoValidProviders,
}

/// Aggregate of one fan-out, one outcome per requested provider in request
/// order.
#[derive(Debug, Clone)]
pub struct ScoutingRun {
    pub mode: ScoutingMode,
    pub outcomes: Vec<ProviderOutcome>,
}

pub struct Orchestrator {
    synthesizer: Arc<dyn Synthesizer>,
    provider_timeout: Duration,
}

impl Orchestrator {
    pub fn new(synthesizer: Arc<dyn Synthesizer>, provider_timeout: Duration) -> Self {
        Self {
            synthesizer,
            provider_timeout,
        }
    }

    /// Fans `query` out to every known provider in `requested`.
    ///
    /// Each provider runs in its own task under its own timeout, so one
    /// slow or failing provider only costs its own slot. Dropping the
    /// returned future aborts every provider call still in flight.
    #[tracing::instrument(
        name = "scouting.run",
        skip(self, query, requested, mode),
        fields(
            scouting.mode = ?mode,
            scouting.providers_requested = requested.len(),
            scouting.providers,
            scouting.failures,
        )
    )]
    pub async fn run<S: AsRef<str>>(
        &self,
        query: &str,
        requested: &[S],
        mode: ScoutingMode,
    ) -> Result<ScoutingRun, ScoutingError> {
        if query.is_empty() {
            return Err(ScoutingError::EmptyQuery);
        }

        let providers = filter_providers(requested);
        if providers.is_empty() {
            return Err(ScoutingError::NoValidProviders);
        }

        SCOUTING_REQUESTS.add(1, &[]);

        let query: Arc<str> = Arc::from(query);
        let mut tasks = JoinSet::new();

        for (slot, &provider) in providers.iter().enumerate() {
            let synthesizer = Arc::clone(&self.synthesizer);
            let query = Arc::clone(&query);
            let timeout = self.provider_timeout;
            let span = tracing::info_span!(
                "scouting.provider",
                scouting.provider = %provider,
                scouting.synthesizer = %synthesizer.name(),
                scouting.outcome = tracing::field::Empty,
                error.type = tracing::field::Empty,
            );

            tasks.spawn(
                async move {
                    let outcome =
                        call_provider(synthesizer.as_ref(), &query, provider, timeout).await;
                    (slot, outcome)
                }
                .instrument(span),
            );
        }

        // Completions arrive in any order; each lands in its request slot.
        let mut slots: Vec<Option<ProviderOutcome>> = vec![None; providers.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, outcome)) => slots[slot] = Some(outcome),
                Err(join_err) => {
                    tracing::error!(error = %join_err, "Provider task failed");
                }
            }
        }

        // A task that panicked never reported back; its slot gets a marker.
        let outcomes: Vec<ProviderOutcome> = slots
            .into_iter()
            .zip(providers.iter())
            .map(|(outcome, &provider)| {
                outcome.unwrap_or_else(|| {
                    let err = ProviderError::Unavailable("provider task failed".to_string());
                    record_failure(provider, &err);
                    ProviderOutcome::Failed(ProviderFailure::new(provider, &err))
                })
            })
            .collect();

        let failures = outcomes
            .iter()
            .filter(|o| matches!(o, ProviderOutcome::Failed(_)))
            .count();

        let span = tracing::Span::current();
        span.record("scouting.providers", outcomes.len());
        span.record("scouting.failures", failures);

        tracing::info!(
            providers = outcomes.len(),
            failures = failures,
            "Scouting fan-out completed"
        );

        Ok(ScoutingRun { mode, outcomes })
    }
}

async fn call_provider(
    synthesizer: &dyn Synthesizer,
    query: &str,
    provider: ProviderId,
    timeout: Duration,
) -> ProviderOutcome {
    let start = Instant::now();
    let result = match tokio::time::timeout(timeout, synthesizer.synthesize(query, provider)).await
    {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(timeout)),
    };
    let duration = start.elapsed().as_secs_f64();

    let span = tracing::Span::current();
    let provider_kv = KeyValue::new("scouting.provider", provider.as_str());

    match result {
        Ok(result) => {
            span.record("scouting.outcome", "completed");
            SCOUTING_PROVIDER_DURATION.record(
                duration,
                &[provider_kv, KeyValue::new("scouting.outcome", "completed")],
            );
            ProviderOutcome::Completed(result)
        }
        Err(err) => {
            span.record("scouting.outcome", "failed");
            span.record("error.type", err.kind());
            tracing::warn!(provider = %provider, error = %err, "Provider call failed");
            SCOUTING_PROVIDER_DURATION.record(
                duration,
                &[provider_kv, KeyValue::new("scouting.outcome", "failed")],
            );
            record_failure(provider, &err);
            ProviderOutcome::Failed(ProviderFailure::new(provider, &err))
        }
    }
}

fn record_failure(provider: ProviderId, err: &ProviderError) {
    SCOUTING_PROVIDER_FAILURES.add(
        1,
        &[
            KeyValue::new("scouting.provider", provider.as_str()),
            KeyValue::new("error.type", err.kind()),
        ],
    );
}
