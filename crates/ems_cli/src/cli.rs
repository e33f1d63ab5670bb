use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Employee management toolkit
#[derive(Parser, Debug)]
#[command(name = "ems")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "ems.toml")]
    pub config: PathBuf,

    /// Overrides `database_path` from the config
    #[arg(long)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print core health and version
    Ping,

    /// Print every employee ordered by name, then joining date, as JSON
    Sorted,

    /// Generate the aggregate salary report
    Report {
        /// Run once and exit instead of repeating on the configured rate
        #[arg(long)]
        once: bool,
    },
}
