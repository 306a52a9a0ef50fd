//! # Core Type Definitions
//!
//! This module contains the shared types for the Wicket dispatch boundary:
//! - Inbound header map (`Headers`)
//! - Resolved caller identity (`Session`)
//! - Error types (`WicketError`, `IdentityError`)
//! - Field-level validation detail (`ValidationDetail`)
//!
//! ## Determinism Guarantees
//!
//! All mapping types in this module are `BTreeMap`-backed so that
//! serialized envelopes and claim sets have a stable field order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// =============================================================================
// HEADERS
// =============================================================================

/// Name of the header carrying the caller's credential.
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Case-insensitive map of inbound request headers.
///
/// Header names are lowercased on insert, matching the wire convention
/// that header names carry no case significance. Only the first value of
/// a repeated header is retained; the boundary has no use for multi-value
/// headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<String, String>,
}

impl Headers {
    /// Create an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, lowercasing the name. First value wins.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.entries
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.into());
    }

    /// Look up a header by name, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convenience constructor for a map holding a single bearer credential.
    #[must_use]
    pub fn bearer(token: &str) -> Self {
        let mut headers = Self::new();
        headers.insert(AUTHORIZATION_HEADER, format!("Bearer {token}"));
        headers
    }
}

impl FromIterator<(String, String)> for Headers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(&name, value);
        }
        headers
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Claim key under which a session's granted scopes are stored.
pub const SCOPES_CLAIM: &str = "scopes";

/// Resolved identity of the caller for one request.
///
/// Created by the session resolver per inbound call and discarded when
/// the call completes. Never persisted by the boundary. The `claims` map
/// carries provider-specific data the boundary treats as opaque, except
/// for the `scopes` claim which the authorization gate understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stable identifier of the authenticated principal.
    pub user_id: String,
    /// Display name as reported by the identity provider.
    pub name: String,
    /// Email as reported by the identity provider.
    pub email: String,
    /// Opaque provider-specific claims.
    #[serde(default)]
    pub claims: BTreeMap<String, serde_json::Value>,
}

impl Session {
    /// Create a session with empty claims.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            email: email.into(),
            claims: BTreeMap::new(),
        }
    }

    /// Attach a claim, replacing any existing value under the same key.
    #[must_use]
    pub fn with_claim(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.claims.insert(key.into(), value);
        self
    }

    /// Attach granted scopes under the `scopes` claim.
    #[must_use]
    pub fn with_scopes<I, S>(self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<serde_json::Value> = scopes
            .into_iter()
            .map(|s| serde_json::Value::String(s.into()))
            .collect();
        self.with_claim(SCOPES_CLAIM, serde_json::Value::Array(values))
    }

    /// Whether the session carries the claims authentication requires.
    ///
    /// A session missing its user identifier is treated as NOT
    /// authenticated, regardless of how it was produced. The gate checks
    /// shape, not mere presence.
    #[must_use]
    pub fn has_valid_shape(&self) -> bool {
        !self.user_id.trim().is_empty()
    }

    /// Granted scopes, read from the `scopes` claim.
    ///
    /// Non-array claims and non-string entries are ignored rather than
    /// rejected; a malformed scopes claim simply grants nothing.
    #[must_use]
    pub fn scopes(&self) -> Vec<String> {
        self.claims
            .get(SCOPES_CLAIM)
            .and_then(serde_json::Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// =============================================================================
// VALIDATION DETAIL
// =============================================================================

/// Field-level validation failure detail: field name to failure code.
///
/// BTreeMap so the serialized envelope enumerates fields in a stable
/// order.
pub type ValidationDetail = BTreeMap<String, String>;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised inside dispatch or handler execution.
///
/// - Outcomes are explicit `Result` variants; nothing in the boundary
///   uses panics for control flow
/// - Every variant crosses the process boundary only as a normalized
///   `ErrorEnvelope`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WicketError {
    /// Input failed the procedure's declared schema.
    #[error("Input validation failed")]
    Validation(ValidationDetail),

    /// No session, or a session whose shape is not authenticated.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated session lacking a scope the procedure requires.
    #[error("Forbidden")]
    Forbidden,

    /// No procedure registered under the requested name.
    #[error("Unknown procedure: {0}")]
    NotFound(String),

    /// Anything unexpected. The message is logged server-side and
    /// suppressed from the client-visible envelope.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by an identity provider while resolving a session.
///
/// Visible only to the session resolver, which recovers them locally:
/// a provider fault collapses to "no session" and never aborts context
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The provider could not be reached.
    #[error("Identity provider transport failure: {0}")]
    Transport(String),

    /// The provider responded with something unparseable.
    #[error("Malformed identity provider response: {0}")]
    Malformed(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn headers_are_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Authorization", "Bearer abc");
        assert_eq!(headers.get("authorization"), Some("Bearer abc"));
        assert_eq!(headers.get("AUTHORIZATION"), Some("Bearer abc"));
    }

    #[test]
    fn headers_first_value_wins() {
        let mut headers = Headers::new();
        headers.insert("x-request-id", "first");
        headers.insert("X-Request-Id", "second");
        assert_eq!(headers.get("x-request-id"), Some("first"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn bearer_constructor_sets_authorization() {
        let headers = Headers::bearer("tok-1");
        assert_eq!(headers.get(AUTHORIZATION_HEADER), Some("Bearer tok-1"));
    }

    #[test]
    fn session_shape_requires_user_id() {
        let valid = Session::new("u1", "Alice", "alice@example.com");
        assert!(valid.has_valid_shape());

        let missing = Session::new("", "Ghost", "ghost@example.com");
        assert!(!missing.has_valid_shape());

        let whitespace = Session::new("   ", "Ghost", "ghost@example.com");
        assert!(!whitespace.has_valid_shape());
    }

    #[test]
    fn session_scopes_read_from_claim() {
        let session = Session::new("u1", "Alice", "alice@example.com")
            .with_scopes(["user:read", "user:write"]);
        assert_eq!(session.scopes(), vec!["user:read", "user:write"]);
    }

    #[test]
    fn session_malformed_scopes_grant_nothing() {
        let session = Session::new("u1", "Alice", "alice@example.com")
            .with_claim(SCOPES_CLAIM, json!("user:read"));
        assert!(session.scopes().is_empty());

        let mixed = Session::new("u1", "Alice", "alice@example.com")
            .with_claim(SCOPES_CLAIM, json!(["user:read", 42]));
        assert_eq!(mixed.scopes(), vec!["user:read"]);
    }
}
