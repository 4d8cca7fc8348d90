//! Mode routing
//!
//! - Server mode (HTTP server, also `serve`)
//! - CLI mode (management commands)

pub mod server;

#[cfg(feature = "cli")]
pub mod cli;

pub use server::run_server;

#[cfg(feature = "cli")]
pub use cli::run_cli;

use crate::cli::Commands;

/// Mode detection result
#[derive(Debug, PartialEq)]
pub enum Mode {
    Server,
    #[cfg(feature = "cli")]
    Cli(Commands),
}

/// Decide which mode to run from the parsed command
///
/// No command and `serve` both start the server; any other command runs
/// in CLI mode.
pub fn detect_mode(command: Option<Commands>) -> Mode {
    match command {
        None | Some(Commands::Serve) => Mode::Server,
        #[cfg(feature = "cli")]
        Some(cmd) => Mode::Cli(cmd),
        #[cfg(not(feature = "cli"))]
        Some(_) => Mode::Server,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_mode_defaults_to_server() {
        assert_eq!(detect_mode(None), Mode::Server);
        assert_eq!(detect_mode(Some(Commands::Serve)), Mode::Server);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_detect_mode_cli() {
        assert_eq!(
            detect_mode(Some(Commands::Stats)),
            Mode::Cli(Commands::Stats)
        );
    }
}
