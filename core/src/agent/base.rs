//! Base agent traits and structures

use super::execution::RunResult;
use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A resolved agent, handed back by a registry and never mutated afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentHandle {
    name: String,
    description: String,
    instructions: String,
    tools: Vec<String>,
}

impl AgentHandle {
    pub fn new<S: Into<String>>(name: S, description: S, instructions: S) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
        }
    }

    /// Set the tool names this agent may call
    pub fn with_tools(mut self, tools: Vec<String>) -> Self {
        self.tools = tools;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }
}

/// Lookup of agents by name
pub trait AgentRegistry: Send + Sync {
    /// Resolve an agent, failing with [`ProbeError::AgentNotFound`] for unknown names
    fn resolve(&self, name: &str) -> std::result::Result<AgentHandle, ProbeError>;

    /// Every agent this registry can resolve
    fn list(&self) -> Vec<AgentHandle>;
}

/// Runs one prompt against a resolved agent
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, agent: &AgentHandle, prompt: &str) -> Result<RunResult>;
}
