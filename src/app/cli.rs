//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pattern Trainer - inspect and maintain learned automation patterns
#[derive(Parser, Debug)]
#[command(name = "pattern-trainer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Pattern library file (overrides the configured path)
    #[arg(short, long, global = true)]
    pub library: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List patterns in the library
    List {
        /// Show statistics and reliability per pattern
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show a single pattern in full
    Show {
        /// Pattern id
        id: uuid::Uuid,
    },

    /// Check a library file for invariant violations and report
    /// reliability levels
    Validate {
        /// Path to a library JSON file
        path: PathBuf,
    },

    /// Dry-run the matcher: score library patterns against a request
    Match {
        /// Path to a JSON file holding a match request
        #[arg(short, long)]
        request: PathBuf,
    },

    /// Delete a pattern from the library
    Delete {
        /// Pattern id to delete
        id: uuid::Uuid,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Initialize configuration and library directory
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g. "validation.max_age_days")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. "matching.payload_weight")
        key: String,

        /// Value to set
        value: String,
    },

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Directory holding libraries and config by default
    pub fn data_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".pattern_trainer"))
            .unwrap_or_else(|| PathBuf::from(".pattern_trainer"))
    }
}
