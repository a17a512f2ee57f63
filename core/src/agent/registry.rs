//! Built-in agent registry

use super::base::{AgentHandle, AgentRegistry};
use super::prompt::{BASIC_AGENT_INSTRUCTIONS, ONE_TOOL_AGENT_INSTRUCTIONS};
use crate::error::ProbeError;

/// Registry of the agents shipped with lmprobe
pub struct BuiltinAgentRegistry {
    agents: Vec<AgentHandle>,
}

impl BuiltinAgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: vec![
                AgentHandle::new(
                    "one_tool_agent",
                    "Agent with a single tool that runs Linux commands",
                    ONE_TOOL_AGENT_INSTRUCTIONS,
                )
                .with_tools(vec!["generic_linux_command".to_string()]),
                AgentHandle::new(
                    "basic_agent",
                    "Plain chat agent without tools",
                    BASIC_AGENT_INSTRUCTIONS,
                ),
            ],
        }
    }
}

impl Default for BuiltinAgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRegistry for BuiltinAgentRegistry {
    fn resolve(&self, name: &str) -> Result<AgentHandle, ProbeError> {
        self.agents
            .iter()
            .find(|agent| agent.name() == name)
            .cloned()
            .ok_or_else(|| ProbeError::AgentNotFound {
                name: name.to_string(),
            })
    }

    fn list(&self) -> Vec<AgentHandle> {
        self.agents.clone()
    }
}
