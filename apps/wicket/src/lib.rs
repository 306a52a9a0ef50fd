//! # Wicket - RPC Gateway
//!
//! Library crate backing THE BINARY. Exposes the HTTP surface, CLI,
//! configuration, and the concrete collaborators (identity providers,
//! profile store) wired around the `wicket-core` dispatch boundary.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                  apps/wicket (THE BINARY)                 │
//! │                                                           │
//! │  ┌──────────┐   ┌───────────┐   ┌─────────────────────┐  │
//! │  │   CLI    │   │ HTTP API  │   │ Providers / Store   │  │
//! │  │  (clap)  │   │  (axum)   │   │ (token table, mem)  │  │
//! │  └────┬─────┘   └─────┬─────┘   └──────────┬──────────┘  │
//! │       │               │                    │             │
//! │       └───────────────┼────────────────────┘             │
//! │                       ▼                                  │
//! │               ┌───────────────┐                          │
//! │               │  wicket-core  │                          │
//! │               │ (THE BOUNDARY)│                          │
//! │               └───────────────┘                          │
//! └───────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// MODULES
// =============================================================================

pub mod api;
pub mod cli;
pub mod config;
pub mod procedures;
pub mod providers;
pub mod store;

// =============================================================================
// APPLICATION ERRORS
// =============================================================================

/// Errors raised by the application shell (config, startup, serving).
///
/// Distinct from `wicket_core::WicketError`, which is the per-call
/// taxonomy crossing the dispatch boundary; these never reach a caller.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup or serving I/O failure.
    #[error("I/O error: {0}")]
    Io(String),
}
