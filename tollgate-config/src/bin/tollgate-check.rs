//! Load, validate and print the Tollgate configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use tollgate_config::{
    ConfigLoader, ConfigLoaderOptions, init_tracing,
    models::sources::{FileConfig, FileLoggingConfig, FileSessionsConfig},
    models::DEFAULT_LOG_FILTER,
    util::format_duration,
};
use tollgate_core::SessionPolicy;

#[derive(Parser, Debug)]
#[command(name = "tollgate-check", about = "Validate and print Tollgate configuration")]
struct Cli {
    /// Configuration file (defaults to tollgate.toml or config/tollgate.toml)
    #[arg(long, global = true, env = "TOLLGATE_CONFIG")]
    config: Option<PathBuf>,
    /// Env file to load before reading TOLLGATE_* variables
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, validate and print the resolved configuration (default)
    Check {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Print a tollgate.toml populated with the built-in defaults
    Sample,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Check {
        format: OutputFormat::Text,
    }) {
        Command::Check { format } => check(cli.config, cli.env_file, format),
        Command::Sample => sample(),
    }
}

fn check(
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let load = ConfigLoader::with_options(ConfigLoaderOptions {
        config_path,
        env_file,
    })
    .load()
    .context("failed to load configuration")?;

    init_tracing(&load.config.logging)?;

    if load.config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    for warning in &load.warnings.items {
        match &warning.hint {
            Some(hint) => warn!(hint = %hint, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }

    let summary = load.config.summary();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!("refresh_token_ttl = {}", summary.refresh_token_ttl);
            println!("access_token_ttl  = {}", summary.access_token_ttl);
            println!("sweep_batch_size  = {}", summary.sweep_batch_size);
            println!("log_filter        = {}", summary.log_filter);
            match &summary.config_path {
                Some(path) => println!("config_path       = {}", path.display()),
                None => println!("config_path       = (none)"),
            }
        }
    }

    Ok(())
}

fn sample() -> Result<()> {
    let policy = SessionPolicy::default();
    let render = |d: tollgate_core::chrono::Duration| {
        format_duration(d.to_std().unwrap_or_default())
    };

    let file = FileConfig {
        sessions: FileSessionsConfig {
            refresh_token_ttl: Some(render(policy.refresh_token_ttl())),
            access_token_ttl: Some(render(policy.access_token_ttl())),
            sweep_batch_size: Some(policy.sweep_batch_size()),
        },
        logging: FileLoggingConfig {
            filter: Some(DEFAULT_LOG_FILTER.to_string()),
            ansi: Some(true),
        },
    };

    print!("{}", toml::to_string(&file)?);
    Ok(())
}
