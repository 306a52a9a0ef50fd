//! # Wicket CLI Module
//!
//! This module implements the CLI interface for Wicket.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `procedures` - List registered procedures and access levels
//! - `resolve` - Debug-resolve a bearer token against the configured provider

mod commands;

use crate::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Wicket - Session-Gated RPC Gateway
///
/// Dispatches named procedures behind a single authorization boundary:
/// resolve, authorize, validate, handle, normalize.
#[derive(Parser, Debug)]
#[command(name = "wicket")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML config file (falls back to WICKET_CONFIG)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides config)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List registered procedures
    Procedures,

    /// Resolve a bearer token against the configured identity provider
    Resolve {
        /// The token to resolve
        #[arg(short, long)]
        token: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let config_path = cli.config.as_deref();
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(config_path, host, port).await,
        Some(Commands::Resolve { token }) => cmd_resolve(config_path, &token, json_mode).await,
        Some(Commands::Procedures) | None => {
            // No subcommand - list procedures by default
            cmd_procedures(config_path, json_mode)
        }
    }
}
