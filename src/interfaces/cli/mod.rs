//! CLI interface module
//!
//! Management commands that run directly against the database.

pub mod commands;

use std::fmt;
use std::sync::Arc;

use crate::cli::{Commands, ConfigCommands};
use crate::services::{AuthService, UrlService};
use crate::storage::StorageFactory;
use commands::{config_generate, list_links, remove_link, show_stats};

#[derive(Debug)]
pub enum CliError {
    StorageError(String),
    ParseError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StorageError(msg) => format!("Storage error: {}", msg),
            CliError::ParseError(msg) => format!("Parse error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StorageError(msg) => {
                format!("{} {}", "Storage error:".red().bold(), msg.white())
            }
            CliError::ParseError(msg) => {
                format!("{} {}", "Parse error:".yellow().bold(), msg.white())
            }
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<crate::errors::SnappyError> for CliError {
    fn from(err: crate::errors::SnappyError) -> Self {
        CliError::StorageError(err.to_string())
    }
}

/// Run a CLI command from clap-parsed input
///
/// `Serve` is handled by the caller before reaching here.
pub async fn run_cli_command(cmd: Commands) -> Result<(), CliError> {
    // generate 不需要数据库连接
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return config_generate(output_path, force).await;
    }

    let storage = StorageFactory::create()
        .await
        .map_err(|e| CliError::StorageError(e.to_string()))?;
    let url_service = Arc::new(UrlService::new(storage.clone()));
    let auth_service = Arc::new(AuthService::new(storage));

    match cmd {
        Commands::List { user } => list_links(&url_service, &auth_service, user).await,
        Commands::Remove { short_code } => remove_link(&url_service, short_code).await,
        Commands::Stats => show_stats(&url_service).await,
        Commands::Serve => Err(CliError::CommandError(
            "serve must be dispatched by the runtime".to_string(),
        )),
        Commands::Config { .. } => unreachable!("handled above"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_simple() {
        let err = CliError::CommandError("boom".to_string());
        assert_eq!(err.format_simple(), "Command error: boom");
        assert_eq!(err.to_string(), "Command error: boom");
    }

    #[test]
    fn test_from_snappy_error() {
        let err: CliError = crate::errors::SnappyError::not_found("missing").into();
        assert!(matches!(err, CliError::StorageError(_)));
        assert!(err.to_string().contains("missing"));
    }
}
