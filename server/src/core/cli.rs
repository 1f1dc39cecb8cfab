use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{ENV_CONFIG, ENV_HOST, ENV_PORT, ENV_SESSION_SECRET};

#[derive(Parser)]
#[command(name = "racetime")]
#[command(version, about = "Race timing system backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Secret used to sign session tokens (at least 32 bytes)
    #[arg(long, global = true, env = ENV_SESSION_SECRET, hide_env_values = true)]
    pub session_secret: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete local data directory (database). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub config: Option<PathBuf>,
    pub session_secret: Option<String>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        config: cli.config,
        session_secret: cli.session_secret,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_system_prune() {
        let cli = Cli::try_parse_from(["racetime", "system", "prune", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::System {
                command: SystemCommands::Prune { yes: true }
            })
        ));
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["racetime", "start", "--port", "8080", "-H", "0.0.0.0"])
            .unwrap();
        assert!(matches!(cli.command, Some(Commands::Start)));
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
    }
}
