//! CLI command definitions and subcommands

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ProgressTracker - log in and track tool completion
#[derive(Parser, Debug)]
#[command(name = "pt")]
#[command(author, version, about = "Session-scoped login and tool progress tracker", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve {
        /// Override the configured bind address (e.g. 127.0.0.1:8080)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Print a bcrypt hash for use in the `auth.users` config section
    HashPassword {
        /// Plaintext password to hash
        #[arg(required = true)]
        password: String,

        /// bcrypt cost (default: configured auth.bcrypt-cost)
        #[arg(long)]
        cost: Option<u32>,
    },

    /// Validate the configuration and print the effective values
    CheckConfig {
        /// Output format
        #[arg(short, long, default_value = "yaml")]
        format: OutputFormat,
    },
}

/// Output format for `check-config`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}
