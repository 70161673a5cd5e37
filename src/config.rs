use std::env;
use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub allowed_origins: Vec<String>,
    pub provider_timeout: Duration,
    pub provider_max_retries: u32,
    pub request_timeout: Duration,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source, so tests never
    /// have to touch the process environment.
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let port: u16 = get("PORT", "8081")
            .parse()
            .context("PORT must be a number")?;
        let provider_timeout_ms: u64 = get("SCOUTING_PROVIDER_TIMEOUT_MS", "15000")
            .parse()
            .context("SCOUTING_PROVIDER_TIMEOUT_MS must be a number")?;
        let provider_max_retries: u32 = get("SCOUTING_PROVIDER_MAX_RETRIES", "2")
            .parse()
            .context("SCOUTING_PROVIDER_MAX_RETRIES must be a number")?;
        let request_timeout_secs: u64 = get("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .context("REQUEST_TIMEOUT_SECS must be a number")?;

        let provider_timeout = Duration::from_millis(provider_timeout_ms);
        let request_timeout = Duration::from_secs(request_timeout_secs);

        // The request layer must never fire before every provider slot has
        // either answered or been marked as timed out.
        if provider_timeout >= request_timeout {
            anyhow::bail!(
                "SCOUTING_PROVIDER_TIMEOUT_MS ({provider_timeout_ms}) must be below \
                 REQUEST_TIMEOUT_SECS ({request_timeout_secs}s)"
            );
        }

        Ok(Self {
            port,
            environment: get("SCOUTING_ENVIRONMENT", "development"),
            allowed_origins: parse_origins(var("ALLOWED_ORIGINS").as_deref().unwrap_or("")),
            provider_timeout,
            provider_max_retries,
            request_timeout,
            otel_service_name: get("OTEL_SERVICE_NAME", "scouting-proxy"),
            otel_exporter_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT", "http://localhost:4317"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio_test::{assert_err, assert_ok};

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = assert_ok!(config_from(&[]));
        assert_eq!(config.port, 8081);
        assert_eq!(config.environment, "development");
        assert!(config.allowed_origins.is_empty());
        assert_eq!(config.provider_timeout, Duration::from_millis(15000));
        assert_eq!(config.provider_max_retries, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.otel_service_name, "scouting-proxy");
        assert!(!config.is_production());
    }

    #[test]
    fn test_allowed_origins_are_trimmed() {
        let config = config_from(&[(
            "ALLOWED_ORIGINS",
            " https://a.example , https://b.example,, ",
        )])
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("SCOUTING_ENVIRONMENT", "production"),
            ("SCOUTING_PROVIDER_TIMEOUT_MS", "250"),
            ("SCOUTING_PROVIDER_MAX_RETRIES", "0"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.is_production());
        assert_eq!(config.provider_timeout, Duration::from_millis(250));
        assert_eq!(config.provider_max_retries, 0);
    }

    #[test]
    fn test_invalid_port_names_variable() {
        let err = assert_err!(config_from(&[("PORT", "eighty")]));
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_provider_timeout_must_undercut_request_timeout() {
        let err = assert_err!(config_from(&[
            ("SCOUTING_PROVIDER_TIMEOUT_MS", "60000"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]));
        let message = err.to_string();
        assert!(message.contains("SCOUTING_PROVIDER_TIMEOUT_MS"));
        assert!(message.contains("REQUEST_TIMEOUT_SECS"));

        // Equal budgets leave no room for the failure marker either.
        assert_err!(config_from(&[
            ("SCOUTING_PROVIDER_TIMEOUT_MS", "5000"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]));
        assert_ok!(config_from(&[
            ("SCOUTING_PROVIDER_TIMEOUT_MS", "4999"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]));
    }
}
