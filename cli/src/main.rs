//! # lmprobe CLI
//!
//! Command-line interface for lmprobe.
//!
//! ## Usage
//!
//! - `lmprobe` - Check the model server, then run the prompts through an agent
//! - `lmprobe check` - Only check the model server
//! - `lmprobe agents` - Show available agents
//!
//! Exit status is 0 on success, 1 for configuration problems, 2 when the
//! model server cannot be used, 3 for an unknown agent and 4 when a prompt
//! fails.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod config;
mod output;

use commands::{agents_command, check_command, run_command};
use config::{load_dotenv_files, CliConfigLoader};

/// lmprobe - check a local OpenAI-compatible model server and smoke-test an agent
#[derive(Parser)]
#[command(name = "lmprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check a local model server and smoke-test an agent against it")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API base of the model server, e.g. http://localhost:1234/v1
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Model name override
    #[arg(long, global = true)]
    model: Option<String>,

    /// API key override
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Agent to exercise
    #[arg(long, global = true)]
    agent: Option<String>,

    /// Prompt to send (repeatable; replaces the default prompts)
    #[arg(long = "prompt", global = true)]
    prompts: Vec<String>,

    /// Connectivity check timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Maximum LLM round-trips per prompt
    #[arg(long, global = true)]
    max_turns: Option<usize>,

    /// Enable verbose logging and show tool calls
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the server, then run the prompts (default)
    Run,

    /// Only check the model server
    Check,

    /// Show available agents
    Agents,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new().with_prompts_override(cli.prompts.clone());

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(api_base) = &cli.api_base {
        loader = loader.with_api_base_override(api_base.clone());
    }

    if let Some(model) = &cli.model {
        loader = loader.with_model_override(model.clone());
    }

    if let Some(api_key) = &cli.api_key {
        loader = loader.with_api_key_override(api_key.clone());
    }

    if let Some(agent) = &cli.agent {
        loader = loader.with_agent_override(agent.clone());
    }

    if let Some(timeout) = cli.timeout {
        loader = loader.with_timeout_override(timeout);
    }

    if let Some(max_turns) = cli.max_turns {
        loader = loader.with_max_turns_override(max_turns);
    }

    loader
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // .env may carry RUST_LOG, so load it before tracing starts
    let dotenv = load_dotenv_files();
    lmprobe_core::init_tracing(cli.verbose);
    dotenv.log();

    let config_loader = build_config_loader(&cli);

    let result = match cli.command {
        None | Some(Commands::Run) => run_command(config_loader, cli.verbose).await,
        Some(Commands::Check) => check_command(config_loader, cli.verbose).await,
        Some(Commands::Agents) => agents_command().await,
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("{} {:#}", "Error:".red(), e);
            1
        }
    };

    std::process::exit(code);
}
