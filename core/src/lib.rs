//! # lmprobe Core
//!
//! Core library for lmprobe, a connectivity probe for locally hosted
//! OpenAI-compatible model servers.
//!
//! The probe checks the server's model listing, resolves a named agent and
//! runs prompts through it. Agent lookup, agent execution and reporting are
//! traits so callers can substitute their own.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod probe;
pub mod tools;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use agent::{
    AgentConfig, AgentHandle, AgentRegistry, AgentRunner, BuiltinAgentRegistry, LocalAgentRunner,
    RunResult,
};
pub use config::{ProbeConfig, ResolvedLlmConfig, Setting, SettingSource};
pub use error::{ConfigError, Error, ProbeError, Result};
pub use output::{NullOutput, ProbeEvent, ProbeOutput};
pub use probe::{LocalModelProbe, ModelDescriptor, ProbeReport};

/// Current version of the lmprobe-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing; `RUST_LOG` wins over the `verbose` default
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
