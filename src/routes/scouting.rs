use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::AppState;
use crate::error::{AppError, AppResult, INVALID_JSON, MISSING_QUERY, NO_VALID_MODELS};
use crate::scouting::{ProviderOutcome, ScoutingMode, default_providers};

#[derive(Debug, Serialize)]
pub struct ScoutingResponseBody {
    pub results: Vec<ProviderOutcome>,
    pub mode: ScoutingMode,
}

/// Request body as sent. Every field stays untyped so a wrong type can be
/// reported with the same message as an absent field.
#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    query: Option<Value>,
    models: Option<Value>,
    mode: Option<Value>,
}

/// Inbound payload after lenient field extraction.
#[derive(Debug, PartialEq)]
pub struct ScoutingPayload {
    pub query: String,
    pub models: Vec<String>,
    pub mode: ScoutingMode,
}

pub async fn run_scouting(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ScoutingResponseBody>> {
    // Bodies sent without a JSON content type are not read at all.
    let body: &[u8] = if is_json(&headers) { &body } else { &[] };
    let payload = parse_payload(body)?;

    tracing::info!(
        query_chars = payload.query.chars().count(),
        models = ?payload.models,
        mode = ?payload.mode,
        "Scouting request accepted"
    );

    let run = state
        .orchestrator
        .run(&payload.query, payload.models.as_slice(), payload.mode)
        .await?;

    Ok(Json(ScoutingResponseBody {
        results: run.outcomes,
        mode: run.mode,
    }))
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// The query is checked before the models, so a missing query always wins.
pub fn parse_payload(body: &[u8]) -> AppResult<ScoutingPayload> {
    let raw = if body.iter().all(u8::is_ascii_whitespace) {
        RawPayload::default()
    } else {
        let value: Value =
            serde_json::from_slice(body).map_err(|_| AppError::Validation(INVALID_JSON.into()))?;
        // Arrays would otherwise fill the fields by position.
        if value.is_object() {
            serde_json::from_value(value)
                .map_err(|_| AppError::Validation(INVALID_JSON.into()))?
        } else {
            RawPayload::default()
        }
    };

    let query = match raw.query {
        Some(Value::String(query)) if !query.is_empty() => query,
        _ => return Err(AppError::Validation(MISSING_QUERY.into())),
    };

    let models = match raw.models {
        None | Some(Value::Null) => default_providers()
            .iter()
            .map(|p| p.as_str().to_string())
            .collect(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(id) => Some(id),
                _ => None,
            })
            .collect(),
        Some(_) => return Err(AppError::Validation(NO_VALID_MODELS.into())),
    };

    let mode = ScoutingMode::parse_lenient(raw.mode.as_ref().and_then(Value::as_str));

    Ok(ScoutingPayload {
        query,
        models,
        mode,
    })
}
