pub mod config;
pub mod error;
pub mod routes;
pub mod scouting;
pub mod telemetry;

pub use config::Config;

use std::sync::Arc;

use scouting::{MockSynthesizer, Orchestrator, ResilientSynthesizer, Synthesizer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    /// Wires the mock synthesizer behind the retry decorator.
    pub fn new(config: Config) -> Self {
        let synthesizer: Arc<dyn Synthesizer> = Arc::new(ResilientSynthesizer::new(
            Arc::new(MockSynthesizer::new()),
            config.provider_max_retries,
        ));

        Self::with_synthesizer(config, synthesizer)
    }

    pub fn with_synthesizer(config: Config, synthesizer: Arc<dyn Synthesizer>) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(synthesizer, config.provider_timeout));

        Self {
            config,
            orchestrator,
        }
    }
}
