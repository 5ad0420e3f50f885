//! # Cohort - Learning Platform Server
//!
//! The main binary for the Cohort learning core.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                apps/cohort (THE BINARY)               │
//! │                                                       │
//! │   ┌─────────────┐    ┌─────────────┐    ┌──────────┐  │
//! │   │    CLI      │    │  HTTP API   │    │  Config  │  │
//! │   │   (clap)    │    │   (axum)    │    │  (toml)  │  │
//! │   └──────┬──────┘    └──────┬──────┘    └────┬─────┘  │
//! │          └──────────────────┼────────────────┘        │
//! │                             ▼                         │
//! │                    ┌─────────────────┐                │
//! │                    │   cohort-core   │                │
//! │                    │   (THE LOGIC)   │                │
//! │                    └─────────────────┘                │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! cohort init --admin "Site Admin"
//! cohort server --host 0.0.0.0 --port 8080
//! cohort capabilities 1
//! cohort promote --as 1 --user 2 --role content-creator
//! cohort progress --as 2 --course 1
//! ```

use clap::Parser;
use cohort::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // COHORT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("COHORT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let cli = cli::Cli::parse();

    let default_filter = if cli.verbose {
        "cohort=debug,cohort_core=debug,tower_http=debug"
    } else {
        "cohort=info,cohort_core=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

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

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Cohort startup banner.
fn print_banner() {
    println!(
        r#"
   ___      _                _
  / __|___ | |_   ___  _ _  | |_
 | (__/ _ \| ' \ / _ \| '_| |  _|
  \___\___/|_||_|\___/|_|    \__|

  Learning Platform Core v{}

  Role-gated • Deterministic
"#,
        env!("CARGO_PKG_VERSION")
    );
}
