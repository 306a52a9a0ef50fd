//! # Procedure Registry Module
//!
//! Named operations with declared access levels, and the dispatch
//! pipeline that runs them.
//!
//! The registry is assembled by a builder at process start and is
//! immutable afterwards — no dynamic re-registration — so concurrent
//! dispatch shares it without locking. Dispatch order per call:
//! lookup → authorization (protected only) → input validation → handler.

use crate::authorize::authorize;
use crate::context::{AuthedContext, RequestContext};
use crate::types::WicketError;
use crate::validate::InputSchema;
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Instant;
use thiserror::Error;

// =============================================================================
// HANDLER TYPES
// =============================================================================

/// Outcome of a procedure handler.
pub type HandlerResult = Result<Value, WicketError>;

type PublicHandler =
    Box<dyn Fn(RequestContext, Value) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

type ProtectedHandler =
    Box<dyn Fn(AuthedContext, Value) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Declared access level of a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    /// No session required.
    Public,
    /// Requires an authenticated, shape-valid session.
    Protected,
}

impl AccessLevel {
    /// Lowercase wire name of the access level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PROCEDURE
// =============================================================================

/// Public handlers take the raw context; protected handlers take the
/// narrowed [`AuthedContext`], which only the authorization gate can
/// produce. The split makes a gate bypass unrepresentable.
enum HandlerKind {
    Public(PublicHandler),
    Protected {
        handler: ProtectedHandler,
        required_scopes: Vec<String>,
    },
}

/// A named, independently invocable operation.
pub struct Procedure {
    name: String,
    schema: Option<InputSchema>,
    kind: HandlerKind,
}

impl Procedure {
    /// Registered name of the procedure.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared access level.
    #[must_use]
    pub fn access(&self) -> AccessLevel {
        match self.kind {
            HandlerKind::Public(_) => AccessLevel::Public,
            HandlerKind::Protected { .. } => AccessLevel::Protected,
        }
    }

    /// Validate input against the declared schema, if any.
    fn check_input(&self, input: &Value) -> Result<(), WicketError> {
        match &self.schema {
            Some(schema) => schema.check(input),
            None => Ok(()),
        }
    }

    /// Run the per-procedure pipeline: authorize (protected), validate,
    /// then invoke the handler. The handler is never reached when an
    /// earlier stage fails.
    async fn run(&self, ctx: RequestContext, input: Value) -> HandlerResult {
        match &self.kind {
            HandlerKind::Public(handler) => {
                self.check_input(&input)?;
                handler(ctx, input).await
            }
            HandlerKind::Protected {
                handler,
                required_scopes,
            } => {
                let authed = authorize(&ctx, required_scopes)?;
                self.check_input(&input)?;
                handler(authed, input).await
            }
        }
    }
}

impl std::fmt::Debug for Procedure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Procedure")
            .field("name", &self.name)
            .field("access", &self.access())
            .finish()
    }
}

// =============================================================================
// REGISTRY BUILDER
// =============================================================================

/// Errors raised while assembling the registry at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two registrations under the same name.
    #[error("Duplicate procedure name: {0}")]
    Duplicate(String),
}

/// Startup-time builder for the immutable [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    procedures: Vec<Procedure>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a public procedure: runs with or without a session.
    #[must_use]
    pub fn public<F, Fut>(mut self, name: &str, schema: Option<InputSchema>, handler: F) -> Self
    where
        F: Fn(RequestContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.procedures.push(Procedure {
            name: name.to_string(),
            schema,
            kind: HandlerKind::Public(Box::new(move |ctx, input| Box::pin(handler(ctx, input)))),
        });
        self
    }

    /// Register a protected procedure with no scope requirements.
    #[must_use]
    pub fn protected<F, Fut>(self, name: &str, schema: Option<InputSchema>, handler: F) -> Self
    where
        F: Fn(AuthedContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.protected_with_scopes(name, schema, &[], handler)
    }

    /// Register a protected procedure that additionally requires every
    /// listed scope.
    #[must_use]
    pub fn protected_with_scopes<F, Fut>(
        mut self,
        name: &str,
        schema: Option<InputSchema>,
        required_scopes: &[&str],
        handler: F,
    ) -> Self
    where
        F: Fn(AuthedContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.procedures.push(Procedure {
            name: name.to_string(),
            schema,
            kind: HandlerKind::Protected {
                handler: Box::new(move |ctx, input| Box::pin(handler(ctx, input))),
                required_scopes: required_scopes.iter().map(|s| (*s).to_string()).collect(),
            },
        });
        self
    }

    /// Freeze the registrations into an immutable registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut procedures = BTreeMap::new();
        for procedure in self.procedures {
            let name = procedure.name.clone();
            if procedures.insert(name.clone(), procedure).is_some() {
                return Err(RegistryError::Duplicate(name));
            }
        }
        Ok(Registry { procedures })
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Immutable name→procedure mapping, shared read-only across calls.
#[derive(Debug)]
pub struct Registry {
    procedures: BTreeMap<String, Procedure>,
}

impl Registry {
    /// Number of registered procedures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    /// Whether the registry has no procedures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Whether a procedure is registered under the given name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.procedures.contains_key(name)
    }

    /// Registered procedures in name order.
    pub fn procedures(&self) -> impl Iterator<Item = &Procedure> {
        self.procedures.values()
    }

    /// Dispatch one call through the boundary pipeline.
    ///
    /// Unknown name → [`WicketError::NotFound`]. Otherwise the
    /// procedure's own pipeline (authorize → validate → handler) runs,
    /// with elapsed-time tracing on both outcomes.
    pub async fn dispatch(&self, ctx: RequestContext, name: &str, input: Value) -> HandlerResult {
        let Some(procedure) = self.procedures.get(name) else {
            tracing::debug!(procedure = name, "dispatch to unknown procedure");
            return Err(WicketError::NotFound(name.to_string()));
        };

        let started = Instant::now();
        tracing::debug!(procedure = name, access = %procedure.access(), "dispatch start");

        let result = procedure.run(ctx, input).await;
        let elapsed_us = started.elapsed().as_micros() as u64;

        match &result {
            Ok(_) => {
                tracing::info!(procedure = name, elapsed_us, "dispatch succeeded");
            }
            Err(e) => {
                tracing::warn!(procedure = name, elapsed_us, error = %e, "dispatch failed");
            }
        }

        result
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::validate::Rule;
    use serde_json::json;

    #[test]
    fn build_rejects_duplicate_names() {
        let result = RegistryBuilder::new()
            .public("echo", None, |_, input| async move { Ok(input) })
            .public("echo", None, |_, input| async move { Ok(input) })
            .build();
        assert_eq!(
            result.err(),
            Some(RegistryError::Duplicate("echo".to_string()))
        );
    }

    #[test]
    fn empty_registry_is_empty() {
        let registry = RegistryBuilder::new().build().unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn procedures_listed_in_name_order() {
        let registry = RegistryBuilder::new()
            .public("zeta", None, |_, input| async move { Ok(input) })
            .public("alpha", None, |_, input| async move { Ok(input) })
            .protected("mid", None, |_, input| async move { Ok(input) })
            .build()
            .unwrap();
        let names: Vec<&str> = registry.procedures().map(Procedure::name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        assert!(registry.contains("mid"));
        assert_eq!(registry.len(), 3);
    }

    #[tokio::test]
    async fn public_dispatch_reaches_handler() {
        let registry = RegistryBuilder::new()
            .public("echo", None, |_, input| async move { Ok(input) })
            .build()
            .unwrap();

        let result = registry
            .dispatch(RequestContext::anonymous(), "echo", json!({"x": 1}))
            .await;
        assert_eq!(result, Ok(json!({"x": 1})));
    }

    #[tokio::test]
    async fn unknown_name_is_not_found() {
        let registry = RegistryBuilder::new().build().unwrap();
        let result = registry
            .dispatch(RequestContext::anonymous(), "nope", json!(null))
            .await;
        assert_eq!(result, Err(WicketError::NotFound("nope".to_string())));
    }

    #[tokio::test]
    async fn validator_failure_never_reaches_handler() {
        let schema = InputSchema::new().required("name", [Rule::NonEmpty]);
        let registry = RegistryBuilder::new()
            .public("create", Some(schema), |_, _| async move { Ok(json!("reached")) })
            .build()
            .unwrap();

        let result = registry
            .dispatch(RequestContext::anonymous(), "create", json!({"name": ""}))
            .await;
        match result {
            Err(WicketError::Validation(detail)) => {
                assert_eq!(detail.get("name").map(String::as_str), Some("too_short"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }
}
