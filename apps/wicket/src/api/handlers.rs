//! # API Endpoint Handlers
//!
//! HTTP handlers bridging axum onto the dispatch boundary.

use super::{
    AppState,
    types::{HealthResponse, ProcedureInfo, ProceduresResponse, RpcSuccess},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use wicket_core::{ErrorEnvelope, Headers, RequestMeta, ValidationDetail, WicketError};

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint. Never gated.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// PROCEDURE LISTING
// =============================================================================

/// List registered procedures and their access levels.
pub async fn procedures_handler(State(state): State<AppState>) -> impl IntoResponse {
    let procedures = state
        .registry
        .procedures()
        .map(|p| ProcedureInfo {
            name: p.name().to_string(),
            access: p.access().to_string(),
        })
        .collect();

    (StatusCode::OK, Json(ProceduresResponse { procedures }))
}

// =============================================================================
// RPC HANDLER
// =============================================================================

/// Dispatch one RPC call through the boundary pipeline.
///
/// The whole per-call pipeline — session resolution, context build,
/// dispatch — runs under the configured deadline. On expiry the
/// in-flight call is abandoned without invoking any handler and the
/// caller receives an internal-kind envelope.
pub async fn rpc_handler(
    State(state): State<AppState>,
    Path(procedure): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let input = match parse_input(&body) {
        Ok(value) => value,
        Err(envelope) => return envelope_response(&envelope),
    };

    let meta = RequestMeta::new(convert_headers(&headers));
    let pipeline = async {
        let ctx = state.context.build(meta).await;
        state.registry.dispatch(ctx, &procedure, input).await
    };

    match tokio::time::timeout(state.request_timeout, pipeline).await {
        Ok(Ok(result)) => (StatusCode::OK, Json(RpcSuccess { result })).into_response(),
        Ok(Err(error)) => envelope_response(&ErrorEnvelope::normalize(&error)),
        Err(_elapsed) => {
            tracing::warn!(
                procedure = %procedure,
                timeout_ms = state.request_timeout.as_millis() as u64,
                "Request deadline exceeded; in-flight call abandoned"
            );
            let error = WicketError::Internal("request deadline exceeded".to_string());
            envelope_response(&ErrorEnvelope::normalize(&error))
        }
    }
}

/// Parse the raw body into the procedure input.
///
/// An empty body means "no input" (`null`); anything else must be valid
/// JSON or the call fails as a validation error before reaching the
/// pipeline.
fn parse_input(body: &Bytes) -> Result<Value, ErrorEnvelope> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|_| {
        let mut detail = ValidationDetail::new();
        detail.insert("_input".to_string(), "invalid_json".to_string());
        ErrorEnvelope::normalize(&WicketError::Validation(detail))
    })
}

/// Project axum's header map onto the boundary's transport-agnostic
/// one. Values that are not valid UTF-8 are skipped; the boundary has
/// no use for them.
fn convert_headers(headers: &HeaderMap) -> Headers {
    let mut converted = Headers::new();
    for (name, value) in headers {
        if let Ok(text) = value.to_str() {
            converted.insert(name.as_str(), text);
        }
    }
    converted
}

/// Render an envelope at its conventional transport status.
fn envelope_response(envelope: &ErrorEnvelope) -> Response {
    let status = StatusCode::from_u16(envelope.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope.clone())).into_response()
}

// =============================================================================
// TESTS
// =============================================================================
