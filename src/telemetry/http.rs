//! Per-request span and metrics hooks for `tower_http::trace::TraceLayer`.

use std::time::Duration;

use axum::http::{HeaderName, Request, Response, StatusCode};
use opentelemetry::KeyValue;
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::Span;

use super::metrics::{HTTP_REQUEST_DURATION, HTTP_REQUESTS_TOTAL};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone, Copy, Debug, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        tracing::info_span!(
            "request",
            otel.name = %format!("{} {}", request.method(), request.uri().path()),
            http.request_id = %request_id,
            http.response.status_code = tracing::field::Empty,
        )
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RecordResponse;

impl<B> OnResponse<B> for RecordResponse {
    fn on_response(self, response: &Response<B>, latency: Duration, span: &Span) {
        let status = response.status();
        span.record("http.response.status_code", status.as_u16());

        let attributes = [KeyValue::new("http.status_class", status_class(status))];
        HTTP_REQUESTS_TOTAL.add(1, &attributes);
        HTTP_REQUEST_DURATION.record(latency.as_secs_f64() * 1000.0, &attributes);

        tracing::debug!(
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            "Request finished"
        );
    }
}

/// Bucket used as the metric label. Validation failures and the request
/// timeout both land in `4xx`.
fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}
