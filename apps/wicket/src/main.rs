//! # Wicket - Session-Gated RPC Gateway
//!
//! The main binary for the Wicket dispatch boundary.
//!
//! This application provides:
//! - HTTP RPC surface (axum-based)
//! - CLI interface for inspection and debugging
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! wicket server --host 0.0.0.0 --port 8080 --config wicket.toml
//!
//! # CLI operations
//! wicket procedures
//! wicket resolve --token dev-token-u1
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wicket::cli;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — WICKET_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("WICKET_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "wicket=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Wicket startup banner.
fn print_banner() {
    println!(
        r#"
  ██╗    ██╗██╗ ██████╗██╗  ██╗███████╗████████╗
  ██║    ██║██║██╔════╝██║ ██╔╝██╔════╝╚══██╔══╝
  ██║ █╗ ██║██║██║     █████╔╝ █████╗     ██║
  ██║███╗██║██║██║     ██╔═██╗ ██╔══╝     ██║
  ╚███╔███╔╝██║╚██████╗██║  ██╗███████╗   ██║
   ╚══╝╚══╝ ╚═╝ ╚═════╝╚═╝  ╚═╝╚══════╝   ╚═╝

  Session-Gated RPC Gateway v{}

  Resolve • Authorize • Validate • Dispatch
"#,
        env!("CARGO_PKG_VERSION")
    );
}
