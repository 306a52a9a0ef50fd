//! Integration tests for configuration loading and provider selection.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use std::io::Write;
use wicket::config::{AppConfig, ProviderKind};
use wicket::providers::provider_from_config;
use wicket_core::{Headers, resolve_session};

// =============================================================================
// FILE LOADING
// =============================================================================

#[test]
fn load_reads_a_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[server]
host = "0.0.0.0"
port = 4000

[auth]
provider = "static"

[[auth.tokens]]
token = "tok-carol"
user_id = "u3"
name = "Carol"
email = "carol@example.com"
scopes = ["billing:read"]
"#
    )
    .unwrap();

    let config = AppConfig::load(file.path()).unwrap();
    assert_eq!(config.bind_addr(), "0.0.0.0:4000");
    assert_eq!(config.auth.tokens.len(), 1);
    assert_eq!(config.auth.tokens[0].scopes, vec!["billing:read"]);
}

#[test]
fn load_rejects_missing_file() {
    let result = AppConfig::load(std::path::Path::new("/nonexistent/wicket.toml"));
    assert!(result.is_err());
}

#[test]
fn load_rejects_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[server\nhost = ").unwrap();

    let result = AppConfig::load(file.path());
    assert!(result.is_err());
}

#[test]
fn resolve_with_explicit_path_wins() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[server]\nport = 4321\n").unwrap();

    let config = AppConfig::resolve(Some(file.path())).unwrap();
    assert_eq!(config.server.port, 4321);
}

// =============================================================================
// PROVIDER SELECTION END-TO-END
// =============================================================================

#[tokio::test]
async fn configured_static_provider_resolves_its_tokens() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[[auth.tokens]]
token = "tok-carol"
user_id = "u3"
name = "Carol"
email = "carol@example.com"
"#
    )
    .unwrap();

    let config = AppConfig::load(file.path()).unwrap();
    let provider = provider_from_config(&config.auth);

    let session = resolve_session(provider.as_ref(), &Headers::bearer("tok-carol")).await;
    assert_eq!(session.map(|s| s.user_id), Some("u3".to_string()));

    let miss = resolve_session(provider.as_ref(), &Headers::bearer("tok-unknown")).await;
    assert!(miss.is_none());
}

#[tokio::test]
async fn disabled_provider_resolves_nothing() {
    let config: AppConfig = toml::from_str("[auth]\nprovider = \"disabled\"\n").unwrap();
    assert_eq!(config.auth.provider, ProviderKind::Disabled);

    let provider = provider_from_config(&config.auth);
    let session = resolve_session(provider.as_ref(), &Headers::bearer("anything")).await;
    assert!(session.is_none());
}
