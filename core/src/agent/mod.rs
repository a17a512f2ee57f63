//! Agent interfaces and the built-in agent runtime

pub mod base;
pub mod config;
pub mod core;
pub mod execution;
pub mod prompt;
pub mod registry;

pub use base::{AgentHandle, AgentRegistry, AgentRunner};
pub use config::AgentConfig;
pub use core::{AgentCore, LocalAgentRunner};
pub use execution::RunResult;
pub use registry::BuiltinAgentRegistry;
