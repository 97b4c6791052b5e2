//! Command line definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// genforge pipeline tools
#[derive(Debug, Parser)]
#[command(name = "genforge", version, about = "Validate generated code and inspect generation plans")]
pub struct Cli {
    /// Pipeline configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the validation gate over files or directories and print the report
    Validate {
        /// Files or directories to validate
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the ordered stages a request would run
    Plan {
        /// Generation request (JSON)
        #[arg(long, value_name = "FILE")]
        request: PathBuf,
    },
    /// Print the cache key of a request
    CacheKey {
        /// Generation request (JSON)
        #[arg(long, value_name = "FILE")]
        request: PathBuf,
    },
}
