//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::AppError;
use crate::api::{AppState, run_server};
use crate::config::AppConfig;
use crate::procedures::{build_registry, seed_profiles};
use crate::providers::provider_from_config;
use crate::store::MemoryProfileStore;
use std::path::Path;
use std::sync::Arc;
use wicket_core::{Headers, Registry, resolve_session};

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server: load config, wire the provider, store, and
/// registry, then serve until shutdown.
pub async fn cmd_server(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), AppError> {
    let mut config = AppConfig::resolve(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let provider = provider_from_config(&config.auth);
    let store = Arc::new(MemoryProfileStore::seeded(seed_profiles(
        &config.auth.tokens,
    )));
    let registry = registry_or_config_error(store)?;

    tracing::info!(procedures = registry.len(), "Procedure registry assembled");

    let state = AppState::new(Arc::new(registry), provider, &config);
    run_server(&config, state).await
}

// =============================================================================
// PROCEDURES COMMAND
// =============================================================================

/// List the registered procedures and their access levels.
pub fn cmd_procedures(config_path: Option<&Path>, json_mode: bool) -> Result<(), AppError> {
    // Listing only needs the registry shape, not live collaborators.
    let _config = AppConfig::resolve(config_path)?;
    let registry = registry_or_config_error(Arc::new(MemoryProfileStore::new()))?;

    if json_mode {
        let listing: Vec<serde_json::Value> = registry
            .procedures()
            .map(|p| serde_json::json!({"name": p.name(), "access": p.access().as_str()}))
            .collect();
        println!("{}", serde_json::Value::Array(listing));
    } else {
        println!("Registered procedures:");
        for procedure in registry.procedures() {
            println!("  {:<24} {}", procedure.name(), procedure.access());
        }
    }
    Ok(())
}

// =============================================================================
// RESOLVE COMMAND
// =============================================================================

/// Debug-resolve a bearer token against the configured provider and
/// print the outcome.
pub async fn cmd_resolve(
    config_path: Option<&Path>,
    token: &str,
    json_mode: bool,
) -> Result<(), AppError> {
    let config = AppConfig::resolve(config_path)?;
    let provider = provider_from_config(&config.auth);
    let headers = Headers::bearer(token);

    match resolve_session(provider.as_ref(), &headers).await {
        Some(session) => {
            if json_mode {
                let rendered = serde_json::to_string(&session)
                    .map_err(|e| AppError::Io(e.to_string()))?;
                println!("{rendered}");
            } else {
                println!("Resolved session:");
                println!("  user_id: {}", session.user_id);
                println!("  name:    {}", session.name);
                println!("  email:   {}", session.email);
                println!("  scopes:  {:?}", session.scopes());
            }
        }
        None => {
            if json_mode {
                println!("null");
            } else {
                println!("No session: token not recognized by the configured provider");
            }
        }
    }
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn registry_or_config_error(store: Arc<MemoryProfileStore>) -> Result<Registry, AppError> {
    build_registry(store).map_err(|e| AppError::Config(e.to_string()))
}
