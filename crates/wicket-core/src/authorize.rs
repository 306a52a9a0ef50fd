//! # Authorization Module
//!
//! The single policy-enforcement point for protected procedures.
//!
//! Every protected handler routes through [`authorize`]; there is no
//! secondary path that skips the check. The gate validates session
//! *shape*, not merely presence: a session without a user identifier is
//! not authenticated. On success the context is narrowed to
//! [`AuthedContext`], whose session field is non-optional.

use crate::context::{AuthedContext, RequestContext};
use crate::types::WicketError;

// =============================================================================
// AUTHORIZATION GATE
// =============================================================================

/// Check the context for an authenticated session and narrow it.
///
/// Failure modes, in order:
/// - no session, or session with invalid shape → [`WicketError::Unauthorized`]
/// - shape-valid session missing a required scope → [`WicketError::Forbidden`]
///
/// No handler invocation and no side effects occur on failure.
pub fn authorize(
    ctx: &RequestContext,
    required_scopes: &[String],
) -> Result<AuthedContext, WicketError> {
    let Some(session) = ctx.session.as_ref() else {
        return Err(WicketError::Unauthorized);
    };

    if !session.has_valid_shape() {
        tracing::warn!(
            event = "authorization_failure",
            reason = "invalid_session_shape",
            "Session present but missing required claims"
        );
        return Err(WicketError::Unauthorized);
    }

    if !required_scopes.is_empty() {
        let granted = session.scopes();
        if let Some(missing) = required_scopes.iter().find(|s| !scope_granted(&granted, s)) {
            tracing::warn!(
                event = "authorization_failure",
                reason = "missing_scope",
                user_id = %session.user_id,
                scope = %missing,
                "Authenticated session lacks required scope"
            );
            return Err(WicketError::Forbidden);
        }
    }

    Ok(AuthedContext {
        session: session.clone(),
        meta: ctx.meta.clone(),
    })
}

// =============================================================================
// SCOPE MATCHING
// =============================================================================

/// Whether the granted scope set satisfies one required scope.
///
/// A grant satisfies a requirement by exact match, by the global
/// wildcard `*`, or by a category wildcard: `user:*` grants every scope
/// in the `user:` category.
fn scope_granted(granted: &[String], required: &str) -> bool {
    if granted.iter().any(|g| g == required || g == "*") {
        return true;
    }
    let category = required.split(':').next().unwrap_or(required);
    let category_wildcard = format!("{category}:*");
    granted.iter().any(|g| *g == category_wildcard)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestMeta;
    use crate::types::Session;

    fn ctx_with(session: Option<Session>) -> RequestContext {
        RequestContext::new(session, RequestMeta::default())
    }

    #[test]
    fn missing_session_is_unauthorized() {
        let result = authorize(&ctx_with(None), &[]);
        assert_eq!(result.err(), Some(WicketError::Unauthorized));
    }

    #[test]
    fn session_without_user_id_is_unauthorized() {
        let session = Session::new("", "Ghost", "ghost@example.com");
        let result = authorize(&ctx_with(Some(session)), &[]);
        assert_eq!(result.err(), Some(WicketError::Unauthorized));
    }

    #[test]
    fn valid_session_is_narrowed() {
        let session = Session::new("u1", "Alice", "alice@example.com");
        let authed = authorize(&ctx_with(Some(session.clone())), &[]);
        assert_eq!(authed.map(|a| a.session), Ok(session));
    }

    #[test]
    fn missing_scope_is_forbidden() {
        let session = Session::new("u1", "Alice", "alice@example.com").with_scopes(["user:read"]);
        let required = vec!["user:write".to_string()];
        let result = authorize(&ctx_with(Some(session)), &required);
        assert_eq!(result.err(), Some(WicketError::Forbidden));
    }

    #[test]
    fn exact_scope_grants() {
        let session = Session::new("u1", "Alice", "alice@example.com").with_scopes(["user:write"]);
        let required = vec!["user:write".to_string()];
        assert!(authorize(&ctx_with(Some(session)), &required).is_ok());
    }

    #[test]
    fn global_wildcard_grants_everything() {
        let session = Session::new("admin", "Root", "root@example.com").with_scopes(["*"]);
        let required = vec!["user:write".to_string(), "billing:read".to_string()];
        assert!(authorize(&ctx_with(Some(session)), &required).is_ok());
    }

    #[test]
    fn category_wildcard_grants_category_only() {
        let session = Session::new("u1", "Alice", "alice@example.com").with_scopes(["user:*"]);

        let in_category = vec!["user:write".to_string()];
        assert!(authorize(&ctx_with(Some(session.clone())), &in_category).is_ok());

        let out_of_category = vec!["billing:read".to_string()];
        assert_eq!(
            authorize(&ctx_with(Some(session)), &out_of_category).err(),
            Some(WicketError::Forbidden)
        );
    }

    #[test]
    fn unscoped_session_fails_any_requirement() {
        let session = Session::new("u1", "Alice", "alice@example.com");
        let required = vec!["user:read".to_string()];
        assert_eq!(
            authorize(&ctx_with(Some(session)), &required).err(),
            Some(WicketError::Forbidden)
        );
    }
}
