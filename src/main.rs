// ABOUTME: Entry point for the sandbox-deployer CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use sandbox_deployer::config::{self, Config};
use sandbox_deployer::error::Result;
use sandbox_deployer::output::{Output, OutputMode};
use sandbox_deployer::types::CallId;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    if let Err(e) = run(cli.command, Output::new(mode)).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands, output: Output) -> Result<()> {
    let cwd = env::current_dir()?;
    match command {
        Commands::Init {
            operator_api,
            force,
        } => {
            config::init_config(&cwd, operator_api.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Status { call_id } => {
            let config = Config::discover(&cwd)?;
            commands::status(config, CallId::new(call_id), output).await
        }
        Commands::Watch { call_id } => {
            let config = Config::discover(&cwd)?;
            commands::watch(config, CallId::new(call_id), output).await
        }
    }
}
