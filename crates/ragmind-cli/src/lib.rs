//! ragmind command-line interface.

pub mod bootstrap;
pub mod commands;
pub mod render;
pub mod repl;
pub mod session;

use clap::{Parser, Subcommand};
use ragmind_core::config::LogLevel;
use ragmind_core::Config;
use std::path::Path;

/// ragmind - a chat assistant with long-term memory
#[derive(Parser)]
#[command(name = "ragmind")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "RAGMIND_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Log in and start an interactive chat
    Chat(commands::chat::ChatArgs),

    /// Inspect or delete a user profile
    Profile(commands::profile::ProfileArgs),

    /// Search or clear stored memories
    Memory(commands::memory::MemoryArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Load the configuration from an explicit path, or the default location.
///
/// A missing default file yields defaults; a missing explicit file is an error.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    Ok(config)
}

/// The `EnvFilter` directive for a `-v` count, falling back to the configured level.
pub fn log_directive(verbose: u8, configured: LogLevel) -> &'static str {
    match verbose {
        0 => configured.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config;
    match cli.command {
        Commands::Chat(args) => commands::chat::run(args, config_path.as_deref()).await,
        Commands::Profile(args) => commands::profile::run(args, config_path.as_deref()).await,
        Commands::Memory(args) => commands::memory::run(args, config_path.as_deref()).await,
        Commands::Config(args) => commands::config::run(args, config_path.as_deref()).await,
        Commands::Version => {
            println!("ragmind {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_version() {
        let cli = Cli::try_parse_from(["ragmind", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_parse_chat_new_user() {
        let cli = Cli::try_parse_from(["ragmind", "chat", "--user", "alice_01", "--new"]).unwrap();
        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.user, "alice_01");
                assert!(args.new);
            }
            _ => panic!("Expected Chat command"),
        }
    }

    #[test]
    fn test_parse_chat_requires_user() {
        assert!(Cli::try_parse_from(["ragmind", "chat"]).is_err());
    }

    #[test]
    fn test_parse_profile_delete() {
        let cli = Cli::try_parse_from(["ragmind", "profile", "delete", "--user", "bob"]).unwrap();
        match cli.command {
            Commands::Profile(args) => match args.command {
                commands::profile::ProfileCommand::Delete { user, yes } => {
                    assert_eq!(user, "bob");
                    assert!(!yes);
                }
                _ => panic!("Expected Profile Delete command"),
            },
            _ => panic!("Expected Profile command"),
        }
    }

    #[test]
    fn test_parse_memory_search() {
        let cli = Cli::try_parse_from([
            "ragmind",
            "memory",
            "search",
            "--user",
            "alice_01",
            "--query",
            "answer style",
            "--type",
            "fact",
            "--limit",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Memory(args) => match args.command {
                commands::memory::MemoryCommand::Search {
                    user,
                    query,
                    memory_type,
                    limit,
                    threshold,
                } => {
                    assert_eq!(user, "alice_01");
                    assert_eq!(query, "answer style");
                    assert_eq!(memory_type, Some(ragmind_core::MemoryType::Fact));
                    assert_eq!(limit, Some(3));
                    assert!(threshold.is_none());
                }
                _ => panic!("Expected Memory Search command"),
            },
            _ => panic!("Expected Memory command"),
        }
    }

    #[test]
    fn test_parse_memory_search_rejects_unknown_type() {
        let result = Cli::try_parse_from([
            "ragmind", "memory", "search", "--user", "a", "--query", "q", "--type", "gossip",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_config_init_force() {
        let cli = Cli::try_parse_from(["ragmind", "config", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Config(args) => {
                assert!(matches!(
                    args.command,
                    commands::config::ConfigCommand::Init { force: true }
                ));
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_parse_global_config_path() {
        let cli = Cli::try_parse_from(["ragmind", "-vv", "--config", "/tmp/r.json5", "version"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some(Path::new("/tmp/r.json5")));
    }

    #[test]
    fn test_log_directive() {
        assert_eq!(log_directive(0, LogLevel::Warn), "warn");
        assert_eq!(log_directive(0, LogLevel::Error), "error");
        assert_eq!(log_directive(1, LogLevel::Error), "info");
        assert_eq!(log_directive(5, LogLevel::Warn), "trace");
    }

    #[test]
    fn test_load_config_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.json5"))).is_err());
    }
}
