//! Probe commands: the full flow and the connectivity check

use crate::config::{CliConfigLoader, LoadedConfig};
use crate::output::cli_handler::{
    render_header, render_missing_base_warning, ConsoleOutput, ConsoleOutputConfig,
};
use anyhow::Result;
use lmprobe_core::{
    AgentConfig, BuiltinAgentRegistry, LocalAgentRunner, LocalModelProbe, ProbeOutput,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Check the server, resolve the agent and run every prompt
pub async fn run_command(config_loader: CliConfigLoader, verbose: bool) -> Result<i32> {
    let loaded = config_loader.load().await?;
    print_preamble(&loaded);

    let probe = build_probe(&loaded, verbose)?;
    info!(
        "Running {} prompt(s) with agent '{}'",
        loaded.config.prompts.value.len(),
        loaded.config.agent_name.value
    );

    Ok(match probe.run().await {
        Ok(report) => {
            debug!("Completed {} prompt(s)", report.runs.len());
            0
        }
        Err(e) => e.exit_code(),
    })
}

/// Only check the model server
pub async fn check_command(config_loader: CliConfigLoader, verbose: bool) -> Result<i32> {
    let loaded = config_loader.load().await?;
    print_preamble(&loaded);

    let probe = build_probe(&loaded, verbose)?;
    Ok(match probe.check().await {
        Ok(report) => {
            debug!("Server listed {} model(s)", report.models.len());
            0
        }
        Err(e) => e.exit_code(),
    })
}

fn print_preamble(loaded: &LoadedConfig) {
    if loaded.api_base_unconfigured() {
        for line in render_missing_base_warning() {
            println!("{}", line);
        }
    }
    for line in render_header(loaded) {
        println!("{}", line);
    }
}

fn build_probe(loaded: &LoadedConfig, verbose: bool) -> Result<LocalModelProbe> {
    let config = &loaded.config;
    let output: Arc<dyn ProbeOutput> = Arc::new(ConsoleOutput::new(ConsoleOutputConfig {
        show_tools: verbose,
    }));

    let agent_config = AgentConfig::default().with_max_turns(config.max_turns.value);
    let runner = LocalAgentRunner::new(&config.llm_config(), agent_config)?
        .with_output(Arc::clone(&output));

    Ok(LocalModelProbe::new(
        config.clone(),
        Arc::new(BuiltinAgentRegistry::new()),
        Arc::new(runner),
    )
    .with_output(output))
}
