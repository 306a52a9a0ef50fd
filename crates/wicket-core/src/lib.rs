//! # wicket-core
//!
//! The request-authorization boundary for Wicket - THE BOUNDARY.
//!
//! This crate implements the per-call dispatch pipeline: resolve an
//! optional session from inbound headers, build an immutable request
//! context, dispatch named procedures gated on access level, and
//! normalize every failure into a uniform error envelope.
//!
//! ## Pipeline
//!
//! ```text
//! headers ──▶ ContextBuilder ──▶ Registry::dispatch ──▶ authorize ──▶ validate ──▶ handler
//!                  │                                                                  │
//!            resolve_session                                              ErrorEnvelope::normalize
//!            (fault → None)                                                   (on failure)
//! ```
//!
//! ## Architectural Constraints
//!
//! - No transport coupling: no HTTP types, no wire formats
//! - The registry is immutable after startup and shared without locking
//! - Contexts and sessions are per-call; nothing is shared between calls
//! - Authorization is the sole enforcement point, and protected handlers
//!   take a narrowed context type only that gate can produce
//! - Explicit `Result` outcomes everywhere; no panics for control flow

// =============================================================================
// MODULES
// =============================================================================

pub mod authorize;
pub mod context;
pub mod envelope;
pub mod identity;
pub mod registry;
pub mod types;
pub mod validate;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    AUTHORIZATION_HEADER, Headers, IdentityError, SCOPES_CLAIM, Session, ValidationDetail,
    WicketError,
};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use authorize::authorize;
pub use context::{AuthedContext, ContextBuilder, RequestContext, RequestMeta};
pub use envelope::{ErrorEnvelope, ErrorKind};
pub use identity::{IdentityProvider, resolve_session};
pub use registry::{AccessLevel, HandlerResult, Procedure, Registry, RegistryBuilder, RegistryError};
pub use validate::{InputSchema, Rule};
