//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

/// gitmon - commit and push changes in git working directories automatically
#[derive(Debug, Parser)]
#[command(
    name = "gitmon",
    about = "Watches git working directories and commits and pushes their changes",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)")]
    pub log_level: Option<String>,

    /// Working directories to monitor
    #[arg(value_name = "REPO")]
    pub repos: Vec<PathBuf>,
}
