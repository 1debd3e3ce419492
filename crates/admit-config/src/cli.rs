//! Command-line interface definitions

use clap::Parser;
use std::path::PathBuf;

/// ADMIT application-intake server CLI
#[derive(Parser, Debug)]
#[command(name = "admit-server")]
#[command(about = "ADMIT application submission server")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (falls back to well-known paths, then
    /// environment variables)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Bind address override
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Generate a default configuration file and exit
    #[arg(long, value_name = "PATH")]
    pub generate_config: Option<PathBuf>,
}
