//! gitmon - automatic commit-and-push monitor
//!
//! CLI entry point: `gitmon [REPO]...`

use std::fs;
use std::path::Path;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use eyre::{Context, Result};
use tracing::{debug, error, info};

use gitmon::cli::Cli;
use gitmon::config::Config;
use gitmon::error::OrchestratorError;
use gitmon::git::GitCli;
use gitmon::lock::{FileLock, LOCK_FILE_NAME};
use gitmon::orchestrator::Orchestrator;
use gitmon::shutdown::ShutdownSignal;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, log_file: Option<&Path>) -> Result<()> {
    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
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
        None => tracing::Level::INFO,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create log directory")?;
            }
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .context("Failed to open log file")?;
            tracing_subscriber::fmt()
                .with_writer(file)
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(
        cli.log_level.as_deref(),
        config.log_level.as_deref(),
        config.log_file.as_deref(),
    )
    .context("Failed to setup logging")?;

    info!(version = env!("GIT_DESCRIBE"), "gitmon starting");

    let vcs = Arc::new(GitCli::new(config.git_binary.clone()));
    let lock = FileLock::new(config.lock_dir(), LOCK_FILE_NAME);
    let orchestrator = Orchestrator::new(lock, vcs);

    match orchestrator.run(cli.repos, ShutdownSignal::new()).await {
        Ok(summary) => {
            debug!(?summary, "main: orchestrator finished");
            Ok(())
        }
        Err(OrchestratorError::NoRepositories) => {
            eprintln!("{}", Cli::command().render_usage());
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "Startup failed");
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
