//! Movie Checker CLI - track the movies you watch

mod commands;
mod config;
mod listener;
mod logging;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::Commands;
use listener::CliListener;
use movie_checker_core::FileTokenStorage;
use movie_checker_http::MovieClient;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, debug, error};

#[derive(Parser)]
#[command(name = "movie-checker")]
#[command(about = "Browse the movie catalog and keep track of what you watch")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// Data directory for the session token and logs
    #[arg(short = 'd', long, global = true)]
    data_dir: Option<PathBuf>,

    /// Configuration file (TOML or YAML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (0 = no timeout), overrides the configuration
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = config::Settings::load(cli.config.as_deref())?;
    if let Some(timeout) = cli.timeout {
        settings.timeout_secs = timeout;
    }
    let data_dir = config::resolve_data_dir(cli.data_dir, &settings);

    logging::init_logging(cli.log_level.into(), &data_dir, cli.no_file_log)?;
    debug!(backend = %settings.backend_url, data_dir = %data_dir.display(), "Starting Movie Checker CLI");

    let listener = Arc::new(CliListener::default());
    let client = build_client(&settings, &data_dir, listener.clone())?;

    if let Err(e) = cli.command.execute(&client, &listener).await {
        error!("Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn build_client(
    settings: &config::Settings,
    data_dir: &std::path::Path,
    listener: Arc<CliListener>,
) -> Result<MovieClient> {
    let mut builder = MovieClient::builder()
        .base_url(&settings.backend_url)
        .expiry_buffer(settings.expiry_buffer())
        .storage(Arc::new(FileTokenStorage::in_dir(data_dir)))
        .listener(listener);

    if let Some(timeout) = settings.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(agent) = &settings.user_agent {
        builder = builder.user_agent(agent);
    }

    Ok(builder.build()?)
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
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "movie-checker",
            "collection",
            "list",
            "--filter",
            "favorites",
            "--timeout",
            "0",
            "--no-file-log",
        ])
        .unwrap();
        assert_eq!(cli.timeout, Some(0));
        assert!(cli.no_file_log);
        assert!(matches!(cli.command, Commands::Collection { .. }));
    }

    #[test]
    fn test_client_uses_settings() {
        let dir = tempfile::tempdir().unwrap();
        let settings = config::Settings {
            backend_url: "http://localhost:9000/".into(),
            ..config::Settings::default()
        };
        let client = build_client(&settings, dir.path(), Arc::new(CliListener::default())).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000");
    }
}
