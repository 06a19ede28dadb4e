//! # Pre-Processing Configuration Validator
//!
//! Command-line tool for checking a pre-processing configuration before deploying
//! it. Loads the same layers the service does (defaults, TOML file, environment).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use preprocessor_core::config::{ConfigLoader, PipelineConfig};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate pre-processing configuration")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (default: config/preprocessor.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Prefix for environment overrides
    #[arg(long, default_value = "PREPROCESSOR")]
    env_prefix: String,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate the configuration (default)
    Validate,

    /// Print the effective configuration as JSON
    Show,

    /// List the listener tags the configuration declares
    Listeners,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: tracing subscriber already installed");
    }

    if let Err(e) = run(&cli) {
        error!("{e:#}");
        eprintln!("❌ {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load(cli)?;

    match cli.command.as_ref().unwrap_or(&Commands::Validate) {
        Commands::Validate => {
            info!(environment = %config.environment, "Configuration is valid");
            println!(
                "✅ Configuration valid ({} listener(s), environment '{}')",
                config.listeners.len(),
                config.environment
            );
        }
        Commands::Show => {
            let rendered = serde_json::to_string_pretty(&config)
                .context("failed to render configuration")?;
            println!("{rendered}");
        }
        Commands::Listeners => {
            for listener in &config.listeners {
                println!("{} (capacity {})", listener.tag(), listener.channel_capacity);
            }
        }
    }

    Ok(())
}

fn load(cli: &Cli) -> Result<PipelineConfig> {
    let mut loader = ConfigLoader::new().with_env_prefix(cli.env_prefix.clone());
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    loader.load().context("configuration did not load")
}
