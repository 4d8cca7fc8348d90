//! Command-line interface definitions using clap
//!
//! Running the binary without a subcommand starts the HTTP server.

use clap::{Parser, Subcommand};

/// snappylink - A small URL shortener service
#[derive(Parser, Debug)]
#[command(name = "snappylink")]
#[command(version)]
#[command(about = "A small URL shortener service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default when no command is given)
    Serve,

    /// List short links
    List {
        /// Only show links owned by this email
        #[arg(long)]
        user: Option<String>,
    },

    /// Remove a short link by its code
    Remove {
        /// Short code to remove
        short_code: String,
    },

    /// Show global statistics
    Stats,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}
