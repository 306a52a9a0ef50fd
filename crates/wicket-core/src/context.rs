//! # Request Context Module
//!
//! Per-call immutable context passed to procedure handlers.
//!
//! A context is built exactly once per inbound call, owned by that
//! call's pipeline, and discarded when the call completes. Contexts are
//! never shared between calls; the only state shared across calls is
//! the read-only registry.

use crate::identity::{IdentityProvider, resolve_session};
use crate::types::{Headers, Session};
use std::sync::Arc;

// =============================================================================
// REQUEST METADATA
// =============================================================================

/// Transport-agnostic view of the originating request.
///
/// Handlers that need raw headers read them from here; the boundary
/// itself only consumes the credential header during resolution.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    /// Inbound headers, lowercased names.
    pub headers: Headers,
}

impl RequestMeta {
    /// Wrap an inbound header map.
    #[must_use]
    pub fn new(headers: Headers) -> Self {
        Self { headers }
    }
}

// =============================================================================
// REQUEST CONTEXT
// =============================================================================

/// Per-call immutable bundle of session + request data.
///
/// `session` is `None` for anonymous callers; public procedures run
/// either way, protected procedures only after the authorization gate
/// has narrowed this into an [`AuthedContext`].
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The resolved session, if any.
    pub session: Option<Session>,
    /// The originating request's metadata.
    pub meta: Arc<RequestMeta>,
}

impl RequestContext {
    /// Construct a context directly. Prefer [`ContextBuilder::build`]
    /// outside of tests.
    #[must_use]
    pub fn new(session: Option<Session>, meta: RequestMeta) -> Self {
        Self {
            session,
            meta: Arc::new(meta),
        }
    }

    /// Context with no session and empty metadata.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(None, RequestMeta::default())
    }
}

/// Context narrowed by the authorization gate: the session is present
/// and shape-valid, by construction.
///
/// Protected handlers take this type, so no code path can invoke one
/// without having passed through the gate.
#[derive(Debug, Clone)]
pub struct AuthedContext {
    /// The authenticated session. Always shape-valid.
    pub session: Session,
    /// The originating request's metadata.
    pub meta: Arc<RequestMeta>,
}

// =============================================================================
// CONTEXT BUILDER
// =============================================================================

/// Builds one [`RequestContext`] per inbound call.
///
/// Holds the deployment's identity provider as an explicit injected
/// dependency. Invokes the session resolver exactly once per build;
/// pure composition otherwise. A context is always constructible —
/// session absence is not an error at this layer.
pub struct ContextBuilder {
    provider: Arc<dyn IdentityProvider>,
}

impl ContextBuilder {
    /// Create a builder around the deployment's identity provider.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Build the per-call context, resolving the session once.
    pub async fn build(&self, meta: RequestMeta) -> RequestContext {
        let session = resolve_session(self.provider.as_ref(), &meta.headers).await;
        RequestContext {
            session,
            meta: Arc::new(meta),
        }
    }
}

impl std::fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextBuilder").finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
