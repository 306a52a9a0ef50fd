//! # Identity Module
//!
//! The session resolver: derive an optional authenticated session from
//! inbound request headers.
//!
//! Session absence is a valid, expected outcome and is represented as
//! `None`, never as an error. Provider faults are recovered here and
//! collapsed to `None`; retry policy belongs to the caller or the
//! provider client, not this boundary.

use crate::types::{Headers, IdentityError, Session};
use async_trait::async_trait;

// =============================================================================
// IDENTITY PROVIDER CAPABILITY
// =============================================================================

/// External identity provider consumed by the boundary.
///
/// Exactly one concrete implementation is active per deployment; the
/// choice is configuration, not architecture. Implementations may block
/// or suspend without bound — callers wrap the whole per-call pipeline
/// in their own deadline.
///
/// # Extension Point
///
/// This trait is intentionally defined without in-crate implementations.
/// Concrete providers (static token tables, hosted identity platforms)
/// live in the application layer and are injected at startup.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the caller's session from inbound headers.
    ///
    /// `Ok(None)` means "no credential" or "credential not recognized";
    /// `Err` is reserved for provider faults (transport, parsing).
    async fn resolve(&self, headers: &Headers) -> Result<Option<Session>, IdentityError>;
}

// =============================================================================
// SESSION RESOLVER
// =============================================================================

/// Resolve a session, recovering provider faults locally.
///
/// Resolution failure must never abort request context construction:
/// an unexpected provider error is logged and collapsed to `None`.
/// No retries are performed here.
pub async fn resolve_session(provider: &dyn IdentityProvider, headers: &Headers) -> Option<Session> {
    match provider.resolve(headers).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(
                event = "session_resolution_failure",
                error = %e,
                "Identity provider failed; treating request as anonymous"
            );
            None
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
