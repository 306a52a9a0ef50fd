//! # Domain Procedures
//!
//! The user-profile CRUD exposed through the dispatch boundary.
//!
//! ## Registered procedures
//!
//! | name                 | access    | input schema           |
//! |----------------------|-----------|------------------------|
//! | `health.ping`        | public    | none                   |
//! | `auth.getSession`    | public    | none                   |
//! | `user.getProfile`    | protected | none                   |
//! | `user.getById`       | protected | none                   |
//! | `user.updateProfile` | protected | name?, email?          |
//!
//! The profile store is injected at registration; handlers never reach
//! for globals.

use crate::store::{ProfileStore, StoreError, UserProfile, now_ms};
use serde_json::{Value, json};
use std::sync::Arc;
use wicket_core::{
    InputSchema, Registry, RegistryBuilder, RegistryError, Rule, Session, WicketError,
};

/// Upper bound on profile display names.
const MAX_NAME_LENGTH: usize = 256;

// =============================================================================
// HELPERS
// =============================================================================

fn internal(e: StoreError) -> WicketError {
    WicketError::Internal(e.to_string())
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, WicketError> {
    serde_json::to_value(value).map_err(|e| WicketError::Internal(e.to_string()))
}

/// Profile projected from the session when the store has no record yet.
fn profile_from_session(session: &Session) -> UserProfile {
    UserProfile {
        user_id: session.user_id.clone(),
        name: session.name.clone(),
        email: session.email.clone(),
        updated_at_ms: 0,
    }
}

/// Schema for `user.updateProfile`: both fields optional, but present
/// fields must hold.
fn update_profile_schema() -> InputSchema {
    InputSchema::new()
        .optional("name", [Rule::NonEmpty, Rule::MaxLen(MAX_NAME_LENGTH)])
        .optional("email", [Rule::Email])
        .deny_unknown()
}

// =============================================================================
// REGISTRY WIRING
// =============================================================================

/// Register all gateway procedures over the injected profile store.
pub fn build_registry(store: Arc<dyn ProfileStore>) -> Result<Registry, RegistryError> {
    let get_profile_store = store.clone();
    let get_by_id_store = store.clone();
    let update_store = store;

    RegistryBuilder::new()
        // Liveness probe over the RPC surface itself.
        .public("health.ping", None, |_, _| async move {
            Ok(json!({"status": "ok"}))
        })
        // Echo the resolved session, or null for anonymous callers.
        .public("auth.getSession", None, |ctx, _| async move {
            match &ctx.session {
                Some(session) => to_value(session),
                None => Ok(Value::Null),
            }
        })
        // Stored record for the calling principal; falls back to the
        // session's own claims when no record exists yet.
        .protected("user.getProfile", None, move |ctx, _| {
            let store = get_profile_store.clone();
            async move {
                let stored = store.get(&ctx.session.user_id).await.map_err(internal)?;
                let profile = stored.unwrap_or_else(|| profile_from_session(&ctx.session));
                to_value(&profile)
            }
        })
        // Stored record or null, no fallback.
        .protected("user.getById", None, move |ctx, _| {
            let store = get_by_id_store.clone();
            async move {
                match store.get(&ctx.session.user_id).await.map_err(internal)? {
                    Some(profile) => to_value(&profile),
                    None => Ok(Value::Null),
                }
            }
        })
        // Partial update; validation has already run, so present fields
        // are known-good strings.
        .protected(
            "user.updateProfile",
            Some(update_profile_schema()),
            move |ctx, input| {
                let store = update_store.clone();
                async move {
                    let mut profile = store
                        .get(&ctx.session.user_id)
                        .await
                        .map_err(internal)?
                        .unwrap_or_else(|| profile_from_session(&ctx.session));

                    if let Some(name) = input.get("name").and_then(Value::as_str) {
                        profile.name = name.to_string();
                    }
                    if let Some(email) = input.get("email").and_then(Value::as_str) {
                        profile.email = email.to_string();
                    }
                    profile.updated_at_ms = now_ms();

                    store.upsert(profile).await.map_err(internal)?;
                    Ok(json!({"success": true}))
                }
            },
        )
        .build()
}

/// Seed profiles for the static token table, so every configured
/// principal has a record before its first update.
#[must_use]
pub fn seed_profiles(tokens: &[crate::config::TokenEntry]) -> Vec<UserProfile> {
    tokens
        .iter()
        .map(|entry| UserProfile {
            user_id: entry.user_id.clone(),
            name: entry.name.clone(),
            email: entry.email.clone(),
            updated_at_ms: now_ms(),
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::store::MemoryProfileStore;
    use wicket_core::{RequestContext, RequestMeta};

    fn session_for(user_id: &str) -> Session {
        Session::new(user_id, "Alice", "alice@example.com")
    }

    fn authed_ctx(user_id: &str) -> RequestContext {
        RequestContext::new(Some(session_for(user_id)), RequestMeta::default())
    }

    fn seeded_registry() -> (Registry, Arc<MemoryProfileStore>) {
        let store = Arc::new(MemoryProfileStore::seeded(vec![UserProfile {
            user_id: "u1".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            updated_at_ms: 1,
        }]));
        let registry = build_registry(store.clone()).unwrap();
        (registry, store)
    }

    #[tokio::test]
    async fn get_profile_returns_stored_record() {
        let (registry, _store) = seeded_registry();
        let result = registry
            .dispatch(authed_ctx("u1"), "user.getProfile", Value::Null)
            .await
            .unwrap();
        assert_eq!(result["user_id"], "u1");
        assert_eq!(result["name"], "Alice");
    }

    #[tokio::test]
    async fn get_profile_falls_back_to_session() {
        let registry = build_registry(Arc::new(MemoryProfileStore::new())).unwrap();
        let result = registry
            .dispatch(authed_ctx("u9"), "user.getProfile", Value::Null)
            .await
            .unwrap();
        assert_eq!(result["user_id"], "u9");
        assert_eq!(result["updated_at_ms"], 0);
    }

    #[tokio::test]
    async fn get_by_id_returns_null_when_absent() {
        let registry = build_registry(Arc::new(MemoryProfileStore::new())).unwrap();
        let result = registry
            .dispatch(authed_ctx("u9"), "user.getById", Value::Null)
            .await
            .unwrap();
        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn update_profile_writes_through() {
        let (registry, store) = seeded_registry();
        let result = registry
            .dispatch(
                authed_ctx("u1"),
                "user.updateProfile",
                json!({"name": "Alicia"}),
            )
            .await
            .unwrap();
        assert_eq!(result, json!({"success": true}));

        let stored = store.get("u1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Alicia");
        // Untouched field survives a partial update.
        assert_eq!(stored.email, "alice@example.com");
    }

    #[tokio::test]
    async fn update_profile_rejects_empty_name_without_writing() {
        let (registry, store) = seeded_registry();
        let result = registry
            .dispatch(authed_ctx("u1"), "user.updateProfile", json!({"name": ""}))
            .await;

        match result {
            Err(WicketError::Validation(detail)) => {
                assert_eq!(detail.get("name").map(String::as_str), Some("too_short"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }

        // No persistence write occurred.
        let stored = store.get("u1").await.unwrap().unwrap();
        assert_eq!(stored.name, "Alice");
        assert_eq!(stored.updated_at_ms, 1);
    }

    #[tokio::test]
    async fn update_profile_rejects_unknown_fields() {
        let (registry, _store) = seeded_registry();
        let result = registry
            .dispatch(
                authed_ctx("u1"),
                "user.updateProfile",
                json!({"name": "Ok", "role": "admin"}),
            )
            .await;

        match result {
            Err(WicketError::Validation(detail)) => {
                assert_eq!(detail.get("role").map(String::as_str), Some("unknown_field"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn get_session_echoes_or_nulls() {
        let (registry, _store) = seeded_registry();

        let authed = registry
            .dispatch(authed_ctx("u1"), "auth.getSession", Value::Null)
            .await
            .unwrap();
        assert_eq!(authed["user_id"], "u1");

        let anonymous = registry
            .dispatch(RequestContext::anonymous(), "auth.getSession", Value::Null)
            .await
            .unwrap();
        assert_eq!(anonymous, Value::Null);
    }
}
