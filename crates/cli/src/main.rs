//! Oak CLI - inventory management against the Oak System backend

mod commands;
mod config;
mod logging;
mod terminal;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::{Commands, Context};
use std::time::Duration;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "oak")]
#[command(about = "Inventory management for the Oak System")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory for the session token, configuration and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Configuration file (defaults to <data-dir>/oak.toml when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "0")]
    timeout: u64,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = config::data_dir(cli.data_dir);
    logging::init_logging(cli.log_level.into(), &data_dir, cli.no_file_log)?;

    info!("Starting Oak CLI");

    let ctx = Context {
        data_dir,
        config_file: cli.config,
        json: cli.json,
    };

    // Execute command with optional timeout
    let outcome = if cli.timeout == 0 {
        cli.command.execute(&ctx).await
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        if let Ok(result) = tokio::time::timeout(timeout_duration, cli.command.execute(&ctx)).await {
            result
        } else {
            error!("Command timed out after {} seconds", cli.timeout);
            std::process::exit(1);
        }
    };

    match outcome {
        Ok(()) => {
            info!("Command completed successfully");
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "oak",
            "--json",
            "products",
            "add",
            "Feijão",
            "--price",
            "8.5",
            "--category",
            "2",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Products { .. }));

        let cli = Cli::try_parse_from(["oak", "reports", "below-minimum"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Reports {
                report: commands::ReportKind::BelowMinimum
            }
        ));
    }

    #[test]
    fn login_requires_password() {
        let result = Cli::try_parse_from(["oak", "login", "ana@oak.dev"]);
        if std::env::var_os("OAK_PASSWORD").is_none() {
            assert!(result.is_err());
        }
    }
}
