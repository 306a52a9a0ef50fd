//! # Configuration Module
//!
//! TOML configuration for the Wicket gateway.
//!
//! Configuration is loaded once in `main` and passed down explicitly:
//! the router, providers, and middleware never read the environment
//! themselves. The environment only selects the config file path
//! (`WICKET_CONFIG`) and the log format (`WICKET_LOG_FORMAT`).
//!
//! ## Example
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [auth]
//! provider = "static"
//!
//! [[auth.tokens]]
//! token = "dev-token-u1"
//! user_id = "u1"
//! name = "Alice"
//! email = "alice@example.com"
//! scopes = ["user:*"]
//!
//! [limits]
//! rate_per_second = 100
//! request_timeout_ms = 10000
//!
//! [http]
//! cors_origins = ["https://app.example.com"]
//! ```

use crate::AppError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file to load.
pub const CONFIG_ENV: &str = "WICKET_CONFIG";

// =============================================================================
// SECTIONS
// =============================================================================

/// Bind address for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Which identity provider this deployment runs.
///
/// Exactly one provider is active; the choice is configuration, not
/// parallel wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Bearer tokens from the `[[auth.tokens]]` table.
    #[default]
    Static,
    /// Resolve nothing; every caller is anonymous.
    Disabled,
}

/// One principal in the static token table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenEntry {
    /// The bearer token itself.
    pub token: String,
    /// Principal the token authenticates as.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Granted scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// Identity provider selection and its static token table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Active provider for this deployment.
    pub provider: ProviderKind,
    /// Token table for the `static` provider.
    pub tokens: Vec<TokenEntry>,
}

/// Request-level protection limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Global requests per second; 0 disables rate limiting.
    pub rate_per_second: u32,
    /// Deadline for the whole per-call pipeline, in milliseconds.
    pub request_timeout_ms: u64,
    /// Maximum accepted request body size, in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            rate_per_second: 100,
            request_timeout_ms: 10_000,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// HTTP surface options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Allowed CORS origins. Empty list → localhost only; `["*"]` →
    /// permissive (development only).
    pub cors_origins: Vec<String>,
}

// =============================================================================
// APP CONFIG
// =============================================================================

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub limits: LimitsConfig,
    pub http: HttpConfig,
}

impl AppConfig {
    /// Parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read config file '{}': {e}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|e| {
            AppError::Config(format!("Invalid config file '{}': {e}", path.display()))
        })
    }

    /// Resolve the effective config: explicit path, then `WICKET_CONFIG`,
    /// then built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, AppError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            return Self::load(&PathBuf::from(env_path));
        }
        tracing::info!("No config file given; using built-in defaults");
        Ok(Self::default())
    }

    /// Socket address string the server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================
