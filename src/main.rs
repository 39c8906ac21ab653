mod commands;
mod config;
mod error;
mod events;
mod gate;
mod llm;
mod relay;
mod session;
#[cfg(test)]
mod testing;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "groq-chat")]
#[command(version)]
#[command(about = "Chat with Groq-hosted models from your terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file to use instead of ~/.groq-chat/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the chat model
    #[arg(long, global = true)]
    model: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat UI (default)
    Chat,
    /// Validate the API key from the environment and exit
    Validate,
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Daily log file under the config home
fn log_appender(config: &Config) -> Result<RollingFileAppender> {
    let dir = config.logs_dir();
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("groq-chat.log")
        .build(&dir)
        .with_context(|| format!("Failed to open log directory {}", dir.display()))
}

/// Log to a daily file so output never lands on the TUI
fn init_logging(config: &Config, verbose: u8) -> Result<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let (writer, guard) = tracing_appender::non_blocking(log_appender(config)?);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the key can still be typed in
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(model) = cli.model {
        config.provider.chat_model = model;
    }

    let _guard = init_logging(&config, cli.verbose)?;
    tracing::info!("Starting groq-chat");

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::start_chat(config).await,
        Commands::Validate => commands::validate_key(config).await,
        Commands::Init { force } => commands::init_config(config, force),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_chat() {
        let cli = Cli::try_parse_from(["groq-chat"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn cli_parses_validate_with_global_flags() {
        let cli = Cli::try_parse_from(["groq-chat", "validate", "-vv", "--model", "llama3-8b-8192"])
            .unwrap();
        assert!(matches!(cli.command, Some(Commands::Validate)));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.model.as_deref(), Some("llama3-8b-8192"));
    }

    #[test]
    fn cli_parses_init_force() {
        let cli = Cli::try_parse_from(["groq-chat", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init { force: true })));
    }

    #[test]
    fn unusable_log_directory_is_an_error() {
        let blocker = std::env::temp_dir().join(format!("groq-chat-log-{}", uuid::Uuid::new_v4()));
        std::fs::write(&blocker, "not a directory").unwrap();
        let mut config = Config::default();
        config.home = blocker.clone();

        let err = log_appender(&config).unwrap_err();
        assert!(err.to_string().contains("Failed to open log directory"));
        let _ = std::fs::remove_file(blocker);
    }

    #[test]
    fn log_directory_is_created_on_demand() {
        let home = std::env::temp_dir().join(format!("groq-chat-log-{}", uuid::Uuid::new_v4()));
        let mut config = Config::default();
        config.home = home.clone();

        log_appender(&config).unwrap();
        assert!(config.logs_dir().is_dir());
        let _ = std::fs::remove_dir_all(home);
    }

    #[test]
    fn cli_structure_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
