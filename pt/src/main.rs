//! ProgressTracker - login and tool progress web app
//!
//! CLI entry point for serving HTTP and maintaining configuration.

use std::fs;
use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use progresstracker::cli::{Cli, Command, OutputFormat};
use progresstracker::config::Config;
use progresstracker::{hash_password, server};

fn parse_level(level_str: Option<&str>) -> tracing::Level {
    match level_str.map(|s| s.to_uppercase()) {
        None => tracing::Level::INFO,
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, log_file: Option<&Path>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = parse_level(cli_log_level.or(config_log_level));
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context("Failed to create log directory")?;
            }
            let file = fs::File::create(path).context("Failed to create log file")?;
            tracing_subscriber::fmt()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
    }

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging settings come from the config file before the full load
    let (config_log_level, log_file) = Config::load_log_settings(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref(), log_file.as_deref())
        .context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => cmd_serve(config).await,
        Some(Command::Serve { bind }) => {
            if let Some(bind) = bind {
                debug!(%bind, "main: overriding bind address");
                config.server.bind = bind;
            }
            cmd_serve(config).await
        }
        Some(Command::HashPassword { password, cost }) => cmd_hash_password(&config, &password, cost),
        Some(Command::CheckConfig { format }) => cmd_check_config(&config, format),
    }
}

/// Run the HTTP server
async fn cmd_serve(config: Config) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let listener = server::bind(&config).await?;
    let addr = listener.local_addr().context("Failed to read listener address")?;
    println!("{} Progress tracker listening on {}", "✓".green(), format!("http://{}", addr).cyan());

    server::serve(&config, listener).await
}

/// Print a bcrypt hash for a password
fn cmd_hash_password(config: &Config, password: &str, cost: Option<u32>) -> Result<()> {
    let cost = cost.unwrap_or(config.auth.bcrypt_cost);
    debug!(cost, "cmd_hash_password: called");
    let hash = hash_password(password, cost).context("Failed to hash password")?;
    println!("{}", hash);
    Ok(())
}

/// Validate configuration and print it with secrets redacted
fn cmd_check_config(config: &Config, format: OutputFormat) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let mut shown = config.clone();
    if shown.session.secret_key.is_some() {
        shown.session.secret_key = Some("<redacted>".to_string());
    }

    let rendered = match format {
        OutputFormat::Yaml => serde_yaml::to_string(&shown).context("Failed to serialize config")?,
        OutputFormat::Json => serde_json::to_string_pretty(&shown).context("Failed to serialize config")?,
    };
    eprintln!("{} Configuration is valid", "✓".green());
    println!("{}", rendered.trim_end());
    Ok(())
}
