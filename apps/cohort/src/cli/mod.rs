//! # Cohort CLI Module
//!
//! This module implements the CLI interface for Cohort.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a new database, optionally with an administrator
//! - `status` - Show store row counts
//! - `capabilities` - Show the capability set of a user
//! - `progress` - Show an enrollment's progress
//! - `promote` - Change a user's role
//!
//! Commands that act on data take `--as <user id>`; the same capability
//! gates apply as over HTTP.

mod commands;

use clap::{Parser, Subcommand};
use cohort_core::CohortError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Cohort - role-gated learning platform server
#[derive(Parser, Debug)]
#[command(name = "cohort")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to cohort.toml (default: ./cohort.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the database (overrides the config file)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "redb" (ACID database) or "memory" (volatile)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

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
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize a new database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,

        /// Create an administrator profile with this display name
        #[arg(long)]
        admin: Option<String>,
    },

    /// Show store status
    Status,

    /// Show the capability set of a user
    Capabilities {
        /// User id
        user: u64,
    },

    /// Show enrollment progress
    Progress {
        /// Acting user id
        #[arg(long = "as")]
        actor: u64,

        /// Course id
        #[arg(long)]
        course: u64,

        /// Learner id (default: the acting user)
        #[arg(long)]
        learner: Option<u64>,
    },

    /// Change a user's role
    Promote {
        /// Acting user id (must be an administrator)
        #[arg(long = "as")]
        actor: u64,

        /// Target user id
        #[arg(long)]
        user: u64,

        /// New role: base-member, content-creator, community-moderator, administrator
        #[arg(long)]
        role: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CohortError> {
    let mut config = crate::config::Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    let ctx = Context {
        database: config.database.clone(),
        backend: cli.backend,
        json_mode: cli.json_mode,
    };

    match cli.command {
        Some(Commands::Server { host, port }) => {
            let mut server = config.server;
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }
            cmd_server(&ctx, server).await
        }
        Some(Commands::Init { force, admin }) => cmd_init(&ctx, force, admin.as_deref()),
        Some(Commands::Status) => cmd_status(&ctx),
        Some(Commands::Capabilities { user }) => cmd_capabilities(&ctx, user),
        Some(Commands::Progress {
            actor,
            course,
            learner,
        }) => cmd_progress(&ctx, actor, course, learner.unwrap_or(actor)),
        Some(Commands::Promote { actor, user, role }) => cmd_promote(&ctx, actor, user, &role),
        // No subcommand - show status by default
        None => cmd_status(&ctx),
    }
}
