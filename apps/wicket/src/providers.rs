//! # Identity Providers
//!
//! Concrete `IdentityProvider` implementations for the gateway.
//!
//! Exactly one provider is active per deployment, selected by
//! `auth.provider` in the config. The boundary itself never knows which
//! one is running.

use crate::config::{AuthConfig, ProviderKind, TokenEntry};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use wicket_core::{AUTHORIZATION_HEADER, Headers, IdentityError, IdentityProvider, Session};

// =============================================================================
// TOKEN COMPARISON
// =============================================================================

/// Constant-time token comparison.
///
/// Pad both tokens to the same length so `ct_eq` always runs over the
/// same number of bytes, preventing length-leaking side channels.
fn tokens_match(expected: &str, provided: &str) -> bool {
    let expected_bytes = expected.as_bytes();
    let provided_bytes = provided.as_bytes();

    let max_len = expected_bytes.len().max(provided_bytes.len());
    let mut padded_expected = vec![0u8; max_len];
    let mut padded_provided = vec![0u8; max_len];
    padded_expected[..expected_bytes.len()].copy_from_slice(expected_bytes);
    padded_provided[..provided_bytes.len()].copy_from_slice(provided_bytes);

    let bytes_match: bool = padded_expected.ct_eq(&padded_provided).into();
    bytes_match && expected_bytes.len() == provided_bytes.len()
}

/// Strip an optional `Bearer ` prefix; raw tokens are accepted too.
fn extract_token(header_value: &str) -> &str {
    header_value.strip_prefix("Bearer ").unwrap_or(header_value)
}

// =============================================================================
// STATIC TOKEN PROVIDER
// =============================================================================

/// Bearer-token provider backed by the config's token table.
///
/// Suitable for development and small single-tenant deployments; larger
/// ones swap in a hosted identity platform behind the same trait.
pub struct StaticTokenProvider {
    entries: Vec<TokenEntry>,
}

impl StaticTokenProvider {
    /// Build a provider over the given token table.
    #[must_use]
    pub fn new(entries: Vec<TokenEntry>) -> Self {
        Self { entries }
    }

    /// Find the principal for a presented token, comparing each entry
    /// in constant time.
    fn lookup(&self, provided: &str) -> Option<&TokenEntry> {
        self.entries
            .iter()
            .find(|entry| tokens_match(&entry.token, provided))
    }
}

fn session_from(entry: &TokenEntry) -> Session {
    Session::new(&entry.user_id, &entry.name, &entry.email)
        .with_scopes(entry.scopes.iter().cloned())
        .with_claim("provider", json!("static"))
}

#[async_trait]
impl IdentityProvider for StaticTokenProvider {
    async fn resolve(&self, headers: &Headers) -> Result<Option<Session>, IdentityError> {
        let Some(header_value) = headers.get(AUTHORIZATION_HEADER) else {
            return Ok(None);
        };
        let token = extract_token(header_value);
        Ok(self.lookup(token).map(session_from))
    }
}

// =============================================================================
// DISABLED PROVIDER
// =============================================================================

/// Provider that resolves nothing: every caller is anonymous, so only
/// public procedures are reachable.
pub struct DisabledProvider;

#[async_trait]
impl IdentityProvider for DisabledProvider {
    async fn resolve(&self, _headers: &Headers) -> Result<Option<Session>, IdentityError> {
        Ok(None)
    }
}

// =============================================================================
// PROVIDER SELECTION
// =============================================================================

/// Build the deployment's single active provider from config.
#[must_use]
pub fn provider_from_config(auth: &AuthConfig) -> Arc<dyn IdentityProvider> {
    match auth.provider {
        ProviderKind::Static => {
            if auth.tokens.is_empty() {
                tracing::warn!(
                    "⚠️  Static provider configured with an EMPTY token table - \
                     every caller will be anonymous! Add [[auth.tokens]] entries."
                );
            } else {
                tracing::info!(
                    principals = auth.tokens.len(),
                    "Static token provider active"
                );
            }
            Arc::new(StaticTokenProvider::new(auth.tokens.clone()))
        }
        ProviderKind::Disabled => {
            tracing::warn!(
                "⚠️  Identity provider DISABLED - only public procedures are reachable"
            );
            Arc::new(DisabledProvider)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
