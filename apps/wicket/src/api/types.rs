//! # API Request/Response Types
//!
//! JSON structures for the HTTP surface. Error envelopes come from
//! `wicket_core::ErrorEnvelope` unchanged; only success shapes live
//! here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// RPC SUCCESS
// =============================================================================

/// Successful RPC call: the handler's value under `result`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSuccess {
    pub result: Value,
}

// =============================================================================
// PROCEDURE LISTING
// =============================================================================

/// One registered procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureInfo {
    pub name: String,
    pub access: String,
}

/// Response for `GET /procedures`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProceduresResponse {
    pub procedures: Vec<ProcedureInfo>,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn health_default_reports_crate_version() {
        let health = HealthResponse::default();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn rpc_success_wraps_result() {
        let success = RpcSuccess {
            result: serde_json::json!({"x": 1}),
        };
        let wire = serde_json::to_string(&success).unwrap();
        assert_eq!(wire, r#"{"result":{"x":1}}"#);
    }
}
