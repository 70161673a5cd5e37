pub mod health;
pub mod scouting;

use axum::{
    Router,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::AppState;
use crate::config::Config;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let request_timeout = state.config.request_timeout;

    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/scouting", post(scouting::run_scouting))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors)
        .with_state(state)
}

/// Any origin when no allow-list is configured, otherwise exactly the list.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, header};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::scouting::{ProviderError, ProviderId, ScoutingResult, Synthesizer};

    fn app() -> Router {
        app_with(&[])
    }

    fn app_with(vars: &[(&str, &str)]) -> Router {
        let config = Config::from_vars(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap();
        create_router(AppState::new(config))
    }

    async fn post_json(app: Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/scouting")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_scouting_echoes_mode() {
        let (status, body) = post_json(
            app(),
            json!({ "query": "solid state cells", "models": ["gemini"], "mode": "compare" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "compare");
        assert_eq!(body["results"][0]["model"], "gemini");
    }

    #[tokio::test]
    async fn test_scouting_without_json_content_type_is_missing_query() {
        for content_type in [None, Some("text/plain")] {
            let mut request = Request::post("/api/scouting");
            if let Some(content_type) = content_type {
                request = request.header(header::CONTENT_TYPE, content_type);
            }
            let response = app()
                .oneshot(
                    request
                        .body(Body::from(r#"{"query": "q", "models": ["openai"]}"#))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["error"], "Missing query", "content type: {content_type:?}");
        }
    }

    /// Never answers, so only the outer request timeout can end the call.
    struct Hangs;

    #[async_trait::async_trait]
    impl Synthesizer for Hangs {
        async fn synthesize(
            &self,
            _query: &str,
            _provider: ProviderId,
        ) -> Result<ScoutingResult, ProviderError> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "hangs"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_timeout_answers_408() {
        // Built by hand: `Config::from_vars` refuses a provider budget this large.
        let mut config = Config::from_vars(|_| None).unwrap();
        config.provider_timeout = Duration::from_secs(60);
        config.request_timeout = Duration::from_secs(1);
        let app = create_router(AppState::with_synthesizer(config, Arc::new(Hangs)));

        let response = app
            .oneshot(
                Request::post("/api/scouting")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"query": "q"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_empty_body_is_missing_query() {
        let response = app()
            .oneshot(Request::post("/api/scouting").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Missing query");
    }

    #[tokio::test]
    async fn test_health_rejects_post() {
        let response = app()
            .oneshot(Request::post("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_cors_allow_list() {
        let app = app_with(&[("ALLOWED_ORIGINS", "https://allowed.example")]);

        let allowed = app
            .clone()
            .oneshot(
                Request::get("/api/health")
                    .header(header::ORIGIN, "https://allowed.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("https://allowed.example"))
        );

        let denied = app
            .oneshot(
                Request::get("/api/health")
                    .header(header::ORIGIN, "https://other.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(
            denied
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_cors_any_origin_by_default() {
        let response = app()
            .oneshot(
                Request::get("/api/health")
                    .header(header::ORIGIN, "https://anywhere.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("*"))
        );
    }
}
